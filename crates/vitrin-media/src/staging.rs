//! The staging manager: lifecycle owner of all pre-submission media.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use vitrin_shared::constants::{MAX_GALLERY_PHOTOS, MAX_VIDEOS, MAX_VIDEO_BYTES};

use crate::asset::{AssetId, AssetSummary, MediaAsset, MediaFile, MediaKind, MediaRole};
use crate::error::MediaError;
use crate::preview::{PreviewFactory, PreviewHandle};

/// Client-local holding area for the media of one listing session.
///
/// The manager is the sole owner and sole revoker of every preview handle
/// attached to its assets. Handles are revoked synchronously on
/// [`remove`](Self::remove) and wholesale on [`teardown`](Self::teardown);
/// dropping the manager runs the same release as a backstop, so a
/// discarded session cannot leak handles across listing sessions.
pub struct StagingManager {
    previews: Arc<dyn PreviewFactory>,
    showcase: Option<MediaAsset>,
    gallery: Vec<MediaAsset>,
    videos: Vec<MediaAsset>,
    next_photo_position: u32,
    next_video_position: u32,
    max_gallery: usize,
}

impl StagingManager {
    pub fn new(previews: Arc<dyn PreviewFactory>) -> Self {
        Self::with_max_gallery(previews, MAX_GALLERY_PHOTOS)
    }

    /// Category-configured gallery cap (most categories use the default).
    pub fn with_max_gallery(previews: Arc<dyn PreviewFactory>, max_gallery: usize) -> Self {
        Self {
            previews,
            showcase: None,
            gallery: Vec::new(),
            videos: Vec::new(),
            next_photo_position: 0,
            next_video_position: 0,
            max_gallery,
        }
    }

    /// The factory previews are generated with; async preview tasks use
    /// this to create the handle they later hand to
    /// [`apply_preview`](Self::apply_preview).
    pub fn preview_factory(&self) -> Arc<dyn PreviewFactory> {
        Arc::clone(&self.previews)
    }

    // -- additions ----------------------------------------------------------

    /// Stage a batch of gallery photos.
    ///
    /// All-or-nothing: if any file fails the kind check or the batch would
    /// push the gallery over its cap, nothing is staged.
    pub fn add_gallery(&mut self, files: Vec<MediaFile>) -> Result<Vec<AssetId>, MediaError> {
        for file in &files {
            if file.is_empty() || file.kind() != Some(MediaKind::Photo) {
                return Err(MediaError::InvalidKind {
                    file: file.name.clone(),
                });
            }
        }
        if self.gallery.len() + files.len() > self.max_gallery {
            return Err(MediaError::TooMany {
                kind: MediaKind::Photo,
                limit: self.max_gallery,
            });
        }

        let ids = files
            .into_iter()
            .map(|file| self.push_asset(file, MediaRole::Gallery, MediaKind::Photo))
            .collect();
        Ok(ids)
    }

    /// Stage a batch of videos.
    ///
    /// All-or-nothing, with the same shape of checks as the gallery plus a
    /// per-file size cap. The error names the offending file.
    pub fn add_videos(&mut self, files: Vec<MediaFile>) -> Result<Vec<AssetId>, MediaError> {
        for file in &files {
            if file.is_empty() || file.kind() != Some(MediaKind::Video) {
                return Err(MediaError::InvalidKind {
                    file: file.name.clone(),
                });
            }
            if file.len() > MAX_VIDEO_BYTES {
                return Err(MediaError::TooLarge {
                    file: file.name.clone(),
                    max_bytes: MAX_VIDEO_BYTES,
                });
            }
        }
        if self.videos.len() + files.len() > MAX_VIDEOS {
            return Err(MediaError::TooMany {
                kind: MediaKind::Video,
                limit: MAX_VIDEOS,
            });
        }

        let ids = files
            .into_iter()
            .map(|file| self.push_asset(file, MediaRole::Gallery, MediaKind::Video))
            .collect();
        Ok(ids)
    }

    /// Designate a new showcase asset.
    ///
    /// The previous holder loses the showcase role but keeps its preview
    /// handle: it is demoted into the gallery when the cap allows,
    /// otherwise removed outright (which is the one path where replacement
    /// does revoke, as an explicit removal).
    pub fn set_showcase(&mut self, file: MediaFile) -> Result<AssetId, MediaError> {
        if file.is_empty() || file.kind() != Some(MediaKind::Photo) {
            return Err(MediaError::InvalidKind { file: file.name });
        }

        if let Some(mut old) = self.showcase.take() {
            if self.gallery.len() < self.max_gallery {
                old.role = MediaRole::Gallery;
                old.position = self.next_photo_position;
                self.next_photo_position += 1;
                debug!(id = %old.id, position = old.position, "showcase demoted to gallery");
                self.gallery.push(old);
            } else {
                debug!(id = %old.id, "gallery full, demoted showcase removed");
                self.release(old);
            }
        }

        let asset = MediaAsset {
            id: AssetId::new(),
            file,
            role: MediaRole::Showcase,
            position: 0,
            preview: None,
            selected_at: Utc::now(),
        };
        let id = asset.id;
        debug!(id = %id, file = %asset.file.name, "showcase staged");
        self.showcase = Some(asset);
        Ok(id)
    }

    fn push_asset(&mut self, file: MediaFile, role: MediaRole, kind: MediaKind) -> AssetId {
        let position = match kind {
            MediaKind::Photo => {
                let p = self.next_photo_position;
                self.next_photo_position += 1;
                p
            }
            MediaKind::Video => {
                let p = self.next_video_position;
                self.next_video_position += 1;
                p
            }
        };

        let asset = MediaAsset {
            id: AssetId::new(),
            file,
            role,
            position,
            preview: None,
            selected_at: Utc::now(),
        };
        let id = asset.id;
        debug!(id = %id, kind = %kind, position, file = %asset.file.name, "asset staged");
        match kind {
            MediaKind::Photo => self.gallery.push(asset),
            MediaKind::Video => self.videos.push(asset),
        }
        id
    }

    // -- preview lifecycle --------------------------------------------------

    /// Attach an asynchronously generated preview to the asset it was
    /// generated for.
    ///
    /// Completion is addressed by asset identity: if the asset was removed
    /// (or the whole session torn down) while generation was in flight, or
    /// it somehow already carries a preview, the handle is revoked on the
    /// spot so it cannot leak. Returns whether the handle was attached.
    pub fn apply_preview(&mut self, id: AssetId, handle: PreviewHandle) -> bool {
        let duplicate = match self.find_mut(id) {
            Some(asset) if asset.preview.is_none() => {
                asset.preview = Some(handle);
                return true;
            }
            Some(_) => true,
            None => false,
        };

        if duplicate {
            warn!(id = %id, "duplicate preview for asset, revoking");
        } else {
            debug!(id = %id, "preview arrived for a removed asset, revoking");
        }
        self.previews.revoke(&handle);
        false
    }

    /// Assets that still lack a preview, as `(id, file)` pairs for the
    /// generation tasks. File bytes are reference-counted, so the clones
    /// are cheap.
    pub fn awaiting_preview(&self) -> Vec<(AssetId, MediaFile)> {
        self.iter()
            .filter(|a| a.preview.is_none())
            .map(|a| (a.id, a.file.clone()))
            .collect()
    }

    // -- removal ------------------------------------------------------------

    /// Remove one asset, revoking its preview handle immediately.
    pub fn remove(&mut self, id: AssetId) -> bool {
        if self.showcase.as_ref().is_some_and(|a| a.id == id) {
            if let Some(asset) = self.showcase.take() {
                self.release(asset);
            }
            return true;
        }
        if let Some(idx) = self.gallery.iter().position(|a| a.id == id) {
            let asset = self.gallery.remove(idx);
            self.release(asset);
            return true;
        }
        if let Some(idx) = self.videos.iter().position(|a| a.id == id) {
            let asset = self.videos.remove(idx);
            self.release(asset);
            return true;
        }
        false
    }

    /// Release every staged asset and revoke all outstanding handles.
    ///
    /// Must run when the form is discarded; also runs from `Drop`.
    pub fn teardown(&mut self) {
        let count = self.asset_count();
        if let Some(asset) = self.showcase.take() {
            self.release(asset);
        }
        for asset in std::mem::take(&mut self.gallery) {
            self.release(asset);
        }
        for asset in std::mem::take(&mut self.videos) {
            self.release(asset);
        }
        if count > 0 {
            info!(assets = count, "staging torn down");
        }
    }

    fn release(&self, mut asset: MediaAsset) {
        if let Some(handle) = asset.preview.take() {
            self.previews.revoke(&handle);
        }
        debug!(id = %asset.id, file = %asset.file.name, "asset released");
    }

    // -- accessors ----------------------------------------------------------

    pub fn showcase(&self) -> Option<&MediaAsset> {
        self.showcase.as_ref()
    }

    /// Gallery photos in position order.
    pub fn gallery_in_order(&self) -> Vec<&MediaAsset> {
        let mut assets: Vec<&MediaAsset> = self.gallery.iter().collect();
        assets.sort_by_key(|a| a.position);
        assets
    }

    /// Videos in position order.
    pub fn videos_in_order(&self) -> Vec<&MediaAsset> {
        let mut assets: Vec<&MediaAsset> = self.videos.iter().collect();
        assets.sort_by_key(|a| a.position);
        assets
    }

    pub fn gallery_count(&self) -> usize {
        self.gallery.len()
    }

    pub fn video_count(&self) -> usize {
        self.videos.len()
    }

    pub fn asset_count(&self) -> usize {
        self.gallery.len() + self.videos.len() + usize::from(self.showcase.is_some())
    }

    /// Whether the listing has any usable media (showcase or gallery).
    pub fn has_any_media(&self) -> bool {
        self.showcase.is_some() || !self.gallery.is_empty()
    }

    /// UI snapshot of the whole staged set.
    pub fn summaries(&self) -> Vec<AssetSummary> {
        self.iter().map(AssetSummary::from).collect()
    }

    fn iter(&self) -> impl Iterator<Item = &MediaAsset> {
        self.showcase
            .iter()
            .chain(self.gallery.iter())
            .chain(self.videos.iter())
    }

    fn find_mut(&mut self, id: AssetId) -> Option<&mut MediaAsset> {
        self.showcase
            .iter_mut()
            .chain(self.gallery.iter_mut())
            .chain(self.videos.iter_mut())
            .find(|a| a.id == id)
    }
}

impl Drop for StagingManager {
    fn drop(&mut self) {
        // Backstop for sessions that never called teardown explicitly.
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::preview::InMemoryPreviews;

    fn photo(name: &str) -> MediaFile {
        MediaFile::new(name, "image/jpeg", vec![0xFFu8; 64])
    }

    fn video(name: &str) -> MediaFile {
        MediaFile::new(name, "video/mp4", vec![0x00u8; 128])
    }

    fn manager() -> (StagingManager, Arc<InMemoryPreviews>) {
        let factory = Arc::new(InMemoryPreviews::new());
        let manager = StagingManager::new(factory.clone() as Arc<dyn PreviewFactory>);
        (manager, factory)
    }

    /// Generate and attach previews for everything currently pending.
    fn resolve_previews(manager: &mut StagingManager) {
        let factory = manager.preview_factory();
        for (id, file) in manager.awaiting_preview() {
            let handle = factory.create(&file);
            assert!(manager.apply_preview(id, handle));
        }
    }

    #[test]
    fn test_gallery_add_within_cap() {
        let (mut manager, _) = manager();
        let files: Vec<_> = (0..15).map(|i| photo(&format!("p{i}.jpg"))).collect();
        let ids = manager.add_gallery(files).unwrap();
        assert_eq!(ids.len(), 15);
        assert_eq!(manager.gallery_count(), 15);
    }

    #[test]
    fn test_gallery_cap_is_atomic() {
        let (mut manager, _) = manager();
        manager
            .add_gallery((0..14).map(|i| photo(&format!("p{i}.jpg"))).collect())
            .unwrap();

        // A batch of two would land at 16: rejected without partial add.
        let err = manager
            .add_gallery(vec![photo("x.jpg"), photo("y.jpg")])
            .unwrap_err();
        assert_eq!(
            err,
            MediaError::TooMany {
                kind: MediaKind::Photo,
                limit: 15
            }
        );
        assert_eq!(manager.gallery_count(), 14);
    }

    #[test]
    fn test_gallery_rejects_non_image_batch() {
        let (mut manager, _) = manager();
        let err = manager
            .add_gallery(vec![photo("ok.jpg"), video("bad.mp4")])
            .unwrap_err();
        assert_eq!(
            err,
            MediaError::InvalidKind {
                file: "bad.mp4".into()
            }
        );
        assert_eq!(manager.gallery_count(), 0);
    }

    #[test]
    fn test_video_limits() {
        let (mut manager, _) = manager();
        manager
            .add_videos(vec![video("a.mp4"), video("b.mp4"), video("c.mp4")])
            .unwrap();

        let err = manager.add_videos(vec![video("d.mp4")]).unwrap_err();
        assert_eq!(
            err,
            MediaError::TooMany {
                kind: MediaKind::Video,
                limit: 3
            }
        );
        assert_eq!(manager.video_count(), 3);
    }

    #[test]
    fn test_video_size_cap_names_file() {
        let (mut manager, _) = manager();
        let oversized = MediaFile::new(
            "huge.mp4",
            "video/mp4",
            vec![0u8; MAX_VIDEO_BYTES + 1],
        );
        let err = manager.add_videos(vec![oversized]).unwrap_err();
        assert_eq!(
            err,
            MediaError::TooLarge {
                file: "huge.mp4".into(),
                max_bytes: MAX_VIDEO_BYTES
            }
        );
        assert_eq!(manager.video_count(), 0);
    }

    #[test]
    fn test_showcase_singularity_across_replacements() {
        let (mut manager, _) = manager();
        manager.set_showcase(photo("one.jpg")).unwrap();
        manager.set_showcase(photo("two.jpg")).unwrap();
        let third = manager.set_showcase(photo("three.jpg")).unwrap();

        let showcases: Vec<_> = manager
            .summaries()
            .into_iter()
            .filter(|s| s.role == MediaRole::Showcase)
            .collect();
        assert_eq!(showcases.len(), 1);
        assert_eq!(showcases[0].id, third);
        // The two demoted assets joined the gallery.
        assert_eq!(manager.gallery_count(), 2);
    }

    #[test]
    fn test_showcase_replacement_keeps_old_handle_alive() {
        let (mut manager, factory) = manager();
        manager.set_showcase(photo("one.jpg")).unwrap();
        resolve_previews(&mut manager);
        assert_eq!(factory.outstanding(), 1);

        manager.set_showcase(photo("two.jpg")).unwrap();
        // Demotion is not removal: the first handle is still live.
        assert_eq!(factory.outstanding(), 1);
        assert_eq!(factory.double_revokes(), 0);
    }

    #[test]
    fn test_showcase_demotion_with_full_gallery_revokes() {
        let factory = Arc::new(InMemoryPreviews::new());
        let mut manager =
            StagingManager::with_max_gallery(factory.clone() as Arc<dyn PreviewFactory>, 1);
        manager.add_gallery(vec![photo("g.jpg")]).unwrap();
        manager.set_showcase(photo("one.jpg")).unwrap();
        resolve_previews(&mut manager);
        assert_eq!(factory.outstanding(), 2);

        // No gallery room for the demoted asset: removed and revoked.
        manager.set_showcase(photo("two.jpg")).unwrap();
        assert_eq!(factory.outstanding(), 1);
        assert_eq!(factory.double_revokes(), 0);
        assert_eq!(manager.gallery_count(), 1);
    }

    #[test]
    fn test_remove_revokes_immediately() {
        let (mut manager, factory) = manager();
        let ids = manager
            .add_gallery(vec![photo("a.jpg"), photo("b.jpg")])
            .unwrap();
        resolve_previews(&mut manager);
        assert_eq!(factory.outstanding(), 2);

        assert!(manager.remove(ids[0]));
        assert_eq!(factory.outstanding(), 1);
        assert_eq!(manager.gallery_count(), 1);
        assert!(!manager.remove(ids[0]));
    }

    #[test]
    fn test_preview_for_removed_asset_is_revoked_not_leaked() {
        let (mut manager, factory) = manager();
        let ids = manager.add_gallery(vec![photo("a.jpg")]).unwrap();

        // Preview generation still in flight when the user removes the
        // asset; the late completion must not attach anywhere.
        let handle = factory.create(&photo("a.jpg"));
        manager.remove(ids[0]);
        assert!(!manager.apply_preview(ids[0], handle));

        assert_eq!(factory.created(), 1);
        assert_eq!(factory.revoked(), 1);
        assert_eq!(factory.outstanding(), 0);
        assert_eq!(factory.double_revokes(), 0);
    }

    #[test]
    fn test_preview_addressed_by_identity_not_index() {
        let (mut manager, factory) = manager();
        let ids = manager
            .add_gallery(vec![photo("a.jpg"), photo("b.jpg"), photo("c.jpg")])
            .unwrap();

        // Removing the first asset shifts the array; the pending previews
        // must still land on the assets they were generated for.
        let pending = manager.awaiting_preview();
        manager.remove(ids[0]);

        for (id, file) in pending {
            let handle = factory.create(&file);
            let attached = manager.apply_preview(id, handle);
            assert_eq!(attached, id != ids[0]);
        }

        let summaries = manager.summaries();
        assert_eq!(summaries.len(), 2);
        for summary in summaries {
            assert!(summary.preview_uri.is_some());
        }
        assert_eq!(factory.outstanding(), 2);
    }

    #[test]
    fn test_teardown_revokes_everything_exactly_once() {
        let (mut manager, factory) = manager();
        manager.set_showcase(photo("s.jpg")).unwrap();
        manager
            .add_gallery(vec![photo("a.jpg"), photo("b.jpg")])
            .unwrap();
        manager.add_videos(vec![video("v.mp4")]).unwrap();
        resolve_previews(&mut manager);
        assert_eq!(factory.outstanding(), 4);

        manager.teardown();
        assert_eq!(factory.outstanding(), 0);
        assert_eq!(factory.created(), factory.revoked());
        assert_eq!(factory.double_revokes(), 0);

        // Teardown is idempotent; drop must not double-revoke either.
        manager.teardown();
        drop(manager);
        assert_eq!(factory.double_revokes(), 0);
    }

    #[test]
    fn test_drop_releases_without_explicit_teardown() {
        let factory = Arc::new(InMemoryPreviews::new());
        {
            let mut manager = StagingManager::new(factory.clone() as Arc<dyn PreviewFactory>);
            manager.add_gallery(vec![photo("a.jpg")]).unwrap();
            resolve_previews(&mut manager);
            assert_eq!(factory.outstanding(), 1);
        }
        assert_eq!(factory.outstanding(), 0);
        assert_eq!(factory.double_revokes(), 0);
    }

    #[test]
    fn test_positions_preserved_for_ordering() {
        let (mut manager, _) = manager();
        let ids = manager
            .add_gallery(vec![photo("a.jpg"), photo("b.jpg"), photo("c.jpg")])
            .unwrap();
        manager.remove(ids[1]);
        manager.add_gallery(vec![photo("d.jpg")]).unwrap();

        let order: Vec<_> = manager
            .gallery_in_order()
            .iter()
            .map(|a| a.file.name.clone())
            .collect();
        assert_eq!(order, ["a.jpg", "c.jpg", "d.jpg"]);
    }
}
