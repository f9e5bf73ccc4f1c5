//! Staged media assets and their identities.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::preview::PreviewHandle;

/// Stable identity of a staged asset.
///
/// Preview generation is asynchronous and the staged set can shrink or
/// reorder while a preview is still in flight, so completions are always
/// addressed by this id, never by a position captured at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetId(pub Uuid);

impl AssetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AssetId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Broad kind of a media file, derived from its content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user-selected file as handed over by the picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    /// Original file name (for multipart part naming and error messages).
    pub name: String,
    /// MIME content type reported by the picker.
    pub content_type: String,
    /// Raw file content.
    pub bytes: Bytes,
}

impl MediaFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Kind check on the reported content type; unknown types are neither.
    pub fn kind(&self) -> Option<MediaKind> {
        if self.content_type.starts_with("image/") {
            Some(MediaKind::Photo)
        } else if self.content_type.starts_with("video/") {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}

/// Role of an asset within the staged set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaRole {
    /// The single cover image of the listing.
    Showcase,
    /// An ordered gallery photo or video.
    Gallery,
}

/// One staged asset: the file, its role, its gallery position and the
/// transient preview handle once generation has completed.
#[derive(Debug, Clone)]
pub struct MediaAsset {
    pub id: AssetId,
    pub file: MediaFile,
    pub role: MediaRole,
    /// Ordering key within its kind; positions are assigned monotonically
    /// and never reused, so removal leaves gaps rather than reshuffling.
    pub position: u32,
    pub preview: Option<PreviewHandle>,
    pub selected_at: DateTime<Utc>,
}

/// Serializable snapshot of an asset for the UI layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetSummary {
    pub id: AssetId,
    pub file_name: String,
    pub kind: Option<MediaKind>,
    pub role: MediaRole,
    pub position: u32,
    pub size_bytes: usize,
    /// Dereferenceable preview URI, present once generation completed.
    pub preview_uri: Option<String>,
}

impl From<&MediaAsset> for AssetSummary {
    fn from(asset: &MediaAsset) -> Self {
        Self {
            id: asset.id,
            file_name: asset.file.name.clone(),
            kind: asset.file.kind(),
            role: asset.role,
            position: asset.position,
            size_bytes: asset.file.len(),
            preview_uri: asset.preview.as_ref().map(|p| p.uri.clone()),
        }
    }
}
