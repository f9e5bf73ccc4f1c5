//! # vitrin-client
//!
//! The listing session facade: one object per listing-creation flow that
//! wires the taxonomy resolver, the per-category schema, the form state
//! and the media staging manager together, and drives the final
//! submission. A host UI talks to [`ListingSession`] and nothing else.

pub mod session;

use tracing_subscriber::{fmt, EnvFilter};

pub use session::{ListingSession, SessionError};

/// Install a default tracing subscriber for binaries and examples that
/// embed the engine. Respects `RUST_LOG`; safe to call once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vitrin_client=debug,vitrin_net=debug,warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
