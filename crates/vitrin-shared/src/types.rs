//! Core domain types handed between the Vitrin crates.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to a UI layer or logged as structured data.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Taxonomy
// ---------------------------------------------------------------------------

/// One level of the category → brand → model → variant chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonLevel {
    Category,
    Brand,
    Model,
    Variant,
}

impl TaxonLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxonLevel::Category => "category",
            TaxonLevel::Brand => "brand",
            TaxonLevel::Model => "model",
            TaxonLevel::Variant => "variant",
        }
    }
}

impl std::fmt::Display for TaxonLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single resolved node of the taxonomy: canonical id, slug and name as
/// returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonNode {
    pub id: u64,
    pub slug: String,
    pub name: String,
}

/// Raw slug chain as it appears in the navigation path, before resolution.
///
/// Later segments are meaningless without the earlier ones: a `brand_slug`
/// with no `category_slug` cannot be looked up at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlugPath {
    pub category_slug: String,
    pub brand_slug: Option<String>,
    pub model_slug: Option<String>,
    pub variant_slug: Option<String>,
}

impl SlugPath {
    pub fn category(slug: impl Into<String>) -> Self {
        Self {
            category_slug: slug.into(),
            ..Default::default()
        }
    }
}

/// The fully resolved taxonomy chain for one listing session.
///
/// Immutable once resolved; a node is only present when all of its
/// ancestors resolved first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPath {
    pub category: TaxonNode,
    pub brand: Option<TaxonNode>,
    pub model: Option<TaxonNode>,
    pub variant: Option<TaxonNode>,
}

impl CategoryPath {
    /// The most specific resolved node.
    pub fn deepest(&self) -> &TaxonNode {
        self.variant
            .as_ref()
            .or(self.model.as_ref())
            .or(self.brand.as_ref())
            .unwrap_or(&self.category)
    }
}

// ---------------------------------------------------------------------------
// Geography
// ---------------------------------------------------------------------------

/// A selectable city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: u32,
    pub name: String,
    /// License-plate code (1..81 in Turkey), used for display ordering.
    pub plate_code: u8,
}

/// A district belonging to exactly one city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct District {
    pub id: u32,
    pub name: String,
    pub city_id: u32,
}

// ---------------------------------------------------------------------------
// Submission payload
// ---------------------------------------------------------------------------

/// One binary part of the multipart submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Multipart field name (`showcasePhoto`, `photo_0`, `video_1`, ...).
    pub key: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// The flattened multipart submission, built once per submit action.
///
/// Field and part order is significant: assembling the same inputs twice
/// must yield an identical payload so that a user-initiated retry after a
/// transport failure re-sends exactly the same request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmissionPayload {
    /// Backend path segment the payload is POSTed to (`/ads/{endpoint}`).
    pub endpoint: String,
    /// Scalar fields in emission order, already renamed to backend keys.
    pub fields: Vec<(String, String)>,
    /// Binary parts in emission order: showcase, then photos, then videos.
    pub files: Vec<FilePart>,
}

impl SubmissionPayload {
    /// Look up a scalar field by key (first match).
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Total size of all binary parts in bytes.
    pub fn binary_len(&self) -> usize {
        self.files.iter().map(|p| p.bytes.len()).sum()
    }
}
