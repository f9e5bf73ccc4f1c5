//! # vitrin-shared
//!
//! Domain types shared by every Vitrin crate: the resolved taxonomy chain,
//! geographic lookups (city / district), the wire-level submission payload,
//! wire-format constants, and the locale-numeric helpers used for currency
//! and mileage fields.
//!
//! This crate is a leaf: it depends on nothing else in the workspace.

pub mod constants;
pub mod numeric;
pub mod types;

pub use types::{
    CategoryPath, City, District, FilePart, SlugPath, SubmissionPayload, TaxonLevel, TaxonNode,
};
