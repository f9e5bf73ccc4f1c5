//! # vitrin-media
//!
//! Client-local staging area for listing media. Selected files live here
//! between the file picker and the final multipart submission: the
//! [`StagingManager`] enforces per-kind count and size limits, designates
//! the single showcase asset, and owns the lifecycle of every preview
//! handle it creates: each handle is revoked exactly once, either when
//! its asset is removed or at session teardown.

pub mod asset;
pub mod error;
pub mod preview;
pub mod staging;

pub use asset::{AssetId, AssetSummary, MediaAsset, MediaFile, MediaKind, MediaRole};
pub use error::MediaError;
pub use preview::{InMemoryPreviews, PreviewFactory, PreviewHandle};
pub use staging::StagingManager;
