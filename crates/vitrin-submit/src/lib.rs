//! # vitrin-submit
//!
//! Turns a validated form, its staged media and the resolved taxonomy
//! path into the wire-level multipart payload. The assembler is the only
//! place that knows the backend's key-naming contract; everything
//! category-specific it needs arrives as schema data.

pub mod assembler;

pub use assembler::assemble;
