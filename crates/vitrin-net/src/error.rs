use thiserror::Error;

use vitrin_shared::types::TaxonLevel;

/// Errors produced by the transport layer.
#[derive(Error, Debug)]
pub enum NetError {
    /// No bearer credential was supplied; nothing was sent.
    #[error("Not authenticated")]
    Unauthenticated,

    /// The backend does not know the requested resource.
    #[error("Resource not found")]
    NotFound,

    /// The multipart body exceeded the backend's limit (HTTP 413).
    #[error("Submission payload too large")]
    PayloadTooLarge,

    /// The backend failed (HTTP 5xx); worth retrying later.
    #[error("Server error (HTTP {status})")]
    Server { status: u16 },

    /// The backend rejected the request for another reason; the input
    /// likely needs correcting.
    #[error("Request rejected (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    /// Invalid base URL or path.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Connection-level failure (DNS, TLS, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Failure to resolve the navigation slug chain.
///
/// Fatal for the listing session: the form must not render against a
/// partially-resolved path.
#[derive(Error, Debug)]
pub enum TaxonomyError {
    /// The named level's slug does not exist under its parent.
    #[error("No {level} found for slug '{slug}'")]
    NotFound { level: TaxonLevel, slug: String },

    /// Transport failure before the level could be resolved.
    #[error("Taxonomy lookup failed: {0}")]
    Net(#[from] NetError),
}
