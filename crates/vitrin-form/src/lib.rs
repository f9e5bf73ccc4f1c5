//! # vitrin-form
//!
//! The per-listing form engine. One generic state machine, parametrized
//! by declarative per-category schema data: which fields to collect, which
//! are required, how they are renamed on the wire, and which feature
//! checkboxes exist. Category peculiarities are rows in [`schema`], never
//! new code paths.

pub mod schema;
pub mod state;
pub mod validate;

pub use schema::{schema_for, FieldSchema, FieldSpec, SemanticType};
pub use state::{FieldValue, FormError, FormPhase, FormState};
pub use validate::{ValidationFailure, ValidationResult};
