//! One listing-creation session from navigation to submission.

use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use vitrin_form::{schema_for, FieldValue, FormError, FormPhase, FormState, ValidationResult};
use vitrin_media::{
    AssetId, AssetSummary, InMemoryPreviews, MediaError, MediaFile, PreviewFactory, StagingManager,
};
use vitrin_net::{ListingApi, NetError, PostedAd, TaxonomyError};
use vitrin_shared::types::{CategoryPath, City, District, SlugPath};
use vitrin_submit::assemble;

/// Errors surfaced to the session's caller.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The navigation path does not resolve; the form must not render.
    #[error("Taxonomy resolution failed: {0}")]
    Taxonomy(#[from] TaxonomyError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error("Media staging rejected the batch: {0}")]
    Media(#[from] MediaError),

    #[error("Transport failed: {0}")]
    Net(#[from] NetError),

    #[error("Media staging lock poisoned")]
    Poisoned,
}

/// One active listing-creation flow.
///
/// The session owns the form state exclusively; the staging manager sits
/// behind a mutex only so that asynchronous preview-generation tasks can
/// deliver their handles. There is no concurrent-writer scenario beyond
/// that delivery.
pub struct ListingSession<A: ListingApi> {
    api: A,
    path: CategoryPath,
    form: FormState,
    media: Arc<Mutex<StagingManager>>,
    previews: Arc<dyn PreviewFactory>,
    preview_tasks: Vec<JoinHandle<()>>,
}

impl<A: ListingApi> std::fmt::Debug for ListingSession<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingSession")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl<A: ListingApi> ListingSession<A> {
    /// Resolve the navigation path and open a session for it.
    ///
    /// Resolution failure is fatal here: no session (and so no form) is
    /// created against a partially-resolved path.
    pub async fn begin(api: A, slugs: &SlugPath) -> Result<Self, SessionError> {
        let previews: Arc<dyn PreviewFactory> = Arc::new(InMemoryPreviews::new());
        Self::begin_with_previews(api, slugs, previews).await
    }

    /// Like [`begin`](Self::begin) with a caller-provided preview factory
    /// (a host UI backs this with real object URLs; tests instrument it).
    pub async fn begin_with_previews(
        api: A,
        slugs: &SlugPath,
        previews: Arc<dyn PreviewFactory>,
    ) -> Result<Self, SessionError> {
        let path = vitrin_net::resolve_path(&api, slugs).await?;
        let schema = schema_for(&path.category.slug);
        let media = StagingManager::with_max_gallery(Arc::clone(&previews), schema.max_gallery);

        info!(
            category = %path.category.slug,
            deepest = %path.deepest().slug,
            schema = schema.category,
            "listing session opened"
        );

        Ok(Self {
            api,
            path,
            form: FormState::new(schema),
            media: Arc::new(Mutex::new(media)),
            previews,
            preview_tasks: Vec::new(),
        })
    }

    pub fn path(&self) -> &CategoryPath {
        &self.path
    }

    pub fn phase(&self) -> FormPhase {
        self.form.phase()
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    // -- field input --------------------------------------------------------

    pub fn set_field(&mut self, key: &str, value: FieldValue) {
        self.form.set_field(key, value);
    }

    pub fn toggle_feature(&mut self, name: &str, on: bool) -> bool {
        self.form.toggle_feature(name, on)
    }

    pub fn advance_step(&mut self) -> Result<u8, SessionError> {
        Ok(self.form.advance_step()?)
    }

    pub fn back_step(&mut self) -> Result<u8, SessionError> {
        Ok(self.form.back_step()?)
    }

    pub fn validate(&self) -> Result<ValidationResult, SessionError> {
        let media = self.media.lock().map_err(|_| SessionError::Poisoned)?;
        Ok(self.form.validate(&media))
    }

    // -- location -----------------------------------------------------------

    pub async fn cities(&self) -> Result<Vec<City>, SessionError> {
        Ok(self.api.cities().await?)
    }

    /// Select a city and fetch its district list.
    ///
    /// The district reset happens synchronously inside
    /// [`FormState::set_city`], before the fetch; a list that comes back
    /// for a city the user has meanwhile left is discarded by the tag
    /// check in [`FormState::apply_districts`].
    pub async fn select_city(&mut self, city_id: u32) -> Result<usize, SessionError> {
        self.form.set_city(city_id);
        let districts = self.api.districts(city_id).await?;
        if !self.form.apply_districts(city_id, districts) {
            debug!(city_id, "district list arrived for an abandoned city");
            return Ok(0);
        }
        Ok(self.form.district_options().len())
    }

    /// Commit an externally-fetched district list (for hosts that drive
    /// their own fetches). Stale lists are discarded.
    pub fn apply_districts(&mut self, city_id: u32, districts: Vec<District>) -> bool {
        self.form.apply_districts(city_id, districts)
    }

    pub fn set_city(&mut self, city_id: u32) {
        self.form.set_city(city_id);
    }

    pub fn set_district(&mut self, district_id: u32) -> Result<(), SessionError> {
        Ok(self.form.set_district(district_id)?)
    }

    // -- media --------------------------------------------------------------

    pub fn add_gallery(&mut self, files: Vec<MediaFile>) -> Result<Vec<AssetId>, SessionError> {
        let (ids, pending) = {
            let mut media = self.media.lock().map_err(|_| SessionError::Poisoned)?;
            let ids = media.add_gallery(files)?;
            let pending = media
                .awaiting_preview()
                .into_iter()
                .filter(|(id, _)| ids.contains(id))
                .collect::<Vec<_>>();
            (ids, pending)
        };
        self.spawn_previews(&pending);
        Ok(ids)
    }

    pub fn add_videos(&mut self, files: Vec<MediaFile>) -> Result<Vec<AssetId>, SessionError> {
        let (ids, pending) = {
            let mut media = self.media.lock().map_err(|_| SessionError::Poisoned)?;
            let ids = media.add_videos(files)?;
            let pending = media
                .awaiting_preview()
                .into_iter()
                .filter(|(id, _)| ids.contains(id))
                .collect::<Vec<_>>();
            (ids, pending)
        };
        self.spawn_previews(&pending);
        Ok(ids)
    }

    pub fn set_showcase(&mut self, file: MediaFile) -> Result<AssetId, SessionError> {
        let (id, pending) = {
            let mut media = self.media.lock().map_err(|_| SessionError::Poisoned)?;
            let id = media.set_showcase(file)?;
            let pending = media
                .awaiting_preview()
                .into_iter()
                .filter(|(p, _)| *p == id)
                .collect::<Vec<_>>();
            (id, pending)
        };
        self.spawn_previews(&pending);
        Ok(id)
    }

    pub fn remove_media(&mut self, id: AssetId) -> Result<bool, SessionError> {
        let mut media = self.media.lock().map_err(|_| SessionError::Poisoned)?;
        Ok(media.remove(id))
    }

    pub fn media_summaries(&self) -> Result<Vec<AssetSummary>, SessionError> {
        let media = self.media.lock().map_err(|_| SessionError::Poisoned)?;
        Ok(media.summaries())
    }

    fn spawn_previews(&mut self, pending: &[(AssetId, MediaFile)]) {
        for (id, file) in pending {
            let id = *id;
            let file = file.clone();
            let media = Arc::clone(&self.media);
            let previews = Arc::clone(&self.previews);

            self.preview_tasks.push(tokio::spawn(async move {
                let handle = previews.create(&file);
                // FileReader-style completion: land on a later tick, after
                // the caller has long returned.
                tokio::task::yield_now().await;
                match media.lock() {
                    Ok(mut manager) => {
                        manager.apply_preview(id, handle);
                    }
                    // A poisoned manager can no longer own the handle;
                    // revoke here rather than leak.
                    Err(_) => previews.revoke(&handle),
                }
            }));
        }
    }

    /// Wait for every in-flight preview task (test and shutdown hook).
    pub async fn flush_previews(&mut self) {
        for task in self.preview_tasks.drain(..) {
            let _ = task.await;
        }
    }

    // -- submission ---------------------------------------------------------

    /// Validate, assemble and send the listing.
    ///
    /// A missing token short-circuits before any assembly or network
    /// traffic. On transport failure every bit of field and media state
    /// survives, and a retry re-assembles an identical payload.
    pub async fn submit(&mut self, token: Option<&str>) -> Result<PostedAd, SessionError> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            warn!("submission attempted without a bearer token");
            return Err(SessionError::Net(NetError::Unauthenticated));
        };

        let payload = {
            let media = self.media.lock().map_err(|_| SessionError::Poisoned)?;
            self.form.begin_submit(&media)?;
            assemble(&self.form, &media, &self.path)
        };

        match self.api.submit(&payload, token).await {
            Ok(ad) => {
                self.form.submit_succeeded()?;
                if let Ok(mut media) = self.media.lock() {
                    media.teardown();
                }
                info!(ad_id = ad.id, title = %ad.title, "listing published");
                Ok(ad)
            }
            Err(e) => {
                self.form.submit_failed(e.to_string())?;
                Err(SessionError::Net(e))
            }
        }
    }

    /// Acknowledge a failed submission and return to editing.
    pub fn resume_editing(&mut self) -> Result<u8, SessionError> {
        Ok(self.form.resume_editing()?)
    }

    /// Abandon the session, releasing every staged preview handle.
    pub fn cancel(self) {
        if let Ok(mut media) = self.media.lock() {
            media.teardown();
        }
        info!("listing session cancelled");
    }
}
