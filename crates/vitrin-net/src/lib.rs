// HTTP transport layer: the classifieds backend reached over REST.

pub mod api;
pub mod config;
pub mod error;
pub mod taxonomy;

pub use api::{ApiClient, ListingApi, PostedAd, SubmitResponse};
pub use config::ClientConfig;
pub use error::{NetError, TaxonomyError};
pub use taxonomy::resolve_path;
