/// Default cap on gallery photos per listing.
pub const MAX_GALLERY_PHOTOS: usize = 15;

/// Maximum number of videos per listing.
pub const MAX_VIDEOS: usize = 3;

/// Maximum size of a single video file in bytes (50 MiB).
pub const MAX_VIDEO_BYTES: usize = 50 * 1024 * 1024;

/// Multipart field name for the showcase (cover) photo.
pub const SHOWCASE_FIELD: &str = "showcasePhoto";

/// Multipart field name prefix for gallery photos (`photo_0`, `photo_1`, ...).
pub const PHOTO_FIELD_PREFIX: &str = "photo_";

/// Multipart field name prefix for videos (`video_0`, ...).
pub const VIDEO_FIELD_PREFIX: &str = "video_";

/// Multipart field name for the JSON-encoded feature/checkbox group.
pub const FEATURES_FIELD: &str = "features";

/// Thousands separator used when displaying numeric fields (Turkish locale).
pub const THOUSANDS_SEPARATOR: char = '.';
