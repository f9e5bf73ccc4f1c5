//! The backend API surface and its reqwest implementation.
//!
//! [`ListingApi`] is the seam between the engine and the wire: the
//! taxonomy resolver and the listing session are generic over it, so tests
//! drive them with an in-memory directory while production uses
//! [`ApiClient`].

use reqwest::multipart::{Form, Part};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use vitrin_shared::types::{City, District, SubmissionPayload, TaxonNode};

use crate::config::ClientConfig;
use crate::error::NetError;

/// Successful submission receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedAd {
    pub id: u64,
    pub title: String,
}

/// Wire shape of the submission response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub ad: Option<PostedAd>,
}

/// Everything the engine needs from the backend.
#[allow(async_fn_in_trait)]
pub trait ListingApi: Send + Sync {
    async fn category(&self, slug: &str) -> Result<TaxonNode, NetError>;

    async fn brand(&self, category_slug: &str, slug: &str) -> Result<TaxonNode, NetError>;

    async fn model(
        &self,
        category_slug: &str,
        brand_slug: &str,
        slug: &str,
    ) -> Result<TaxonNode, NetError>;

    async fn variant(
        &self,
        category_slug: &str,
        brand_slug: &str,
        model_slug: &str,
        slug: &str,
    ) -> Result<TaxonNode, NetError>;

    async fn cities(&self) -> Result<Vec<City>, NetError>;

    async fn districts(&self, city_id: u32) -> Result<Vec<District>, NetError>;

    /// POST the assembled multipart payload. `bearer` is the caller's
    /// authentication token; an empty token fails before any I/O.
    async fn submit(
        &self,
        payload: &SubmissionPayload,
        bearer: &str,
    ) -> Result<PostedAd, NetError>;
}

/// Reqwest-backed [`ListingApi`] implementation.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, NetError> {
        let base_url =
            Url::parse(&config.base_url).map_err(|e| NetError::InvalidUrl(e.to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { http, base_url })
    }

    fn url(&self, path: &str) -> Result<Url, NetError> {
        self.base_url
            .join(path)
            .map_err(|e| NetError::InvalidUrl(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, NetError> {
        let url = self.url(path)?;
        debug!(url = %url, "GET");
        let response = self.http.get(url).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }
}

/// Map non-2xx statuses onto the transport error taxonomy.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, NetError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(NetError::NotFound);
    }
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        return Err(NetError::PayloadTooLarge);
    }
    if status.is_server_error() {
        return Err(NetError::Server {
            status: status.as_u16(),
        });
    }
    let body = response.text().await.unwrap_or_default();
    Err(NetError::Rejected {
        status: status.as_u16(),
        body,
    })
}

impl ListingApi for ApiClient {
    async fn category(&self, slug: &str) -> Result<TaxonNode, NetError> {
        self.get_json(&format!("/categories/{slug}")).await
    }

    async fn brand(&self, category_slug: &str, slug: &str) -> Result<TaxonNode, NetError> {
        self.get_json(&format!("/categories/{category_slug}/brands/{slug}"))
            .await
    }

    async fn model(
        &self,
        category_slug: &str,
        brand_slug: &str,
        slug: &str,
    ) -> Result<TaxonNode, NetError> {
        self.get_json(&format!(
            "/categories/{category_slug}/brands/{brand_slug}/models/{slug}"
        ))
        .await
    }

    async fn variant(
        &self,
        category_slug: &str,
        brand_slug: &str,
        model_slug: &str,
        slug: &str,
    ) -> Result<TaxonNode, NetError> {
        self.get_json(&format!(
            "/categories/{category_slug}/brands/{brand_slug}/models/{model_slug}/variants/{slug}"
        ))
        .await
    }

    async fn cities(&self) -> Result<Vec<City>, NetError> {
        self.get_json("/cities").await
    }

    async fn districts(&self, city_id: u32) -> Result<Vec<District>, NetError> {
        self.get_json(&format!("/cities/{city_id}/districts")).await
    }

    async fn submit(
        &self,
        payload: &SubmissionPayload,
        bearer: &str,
    ) -> Result<PostedAd, NetError> {
        if bearer.is_empty() {
            return Err(NetError::Unauthenticated);
        }

        let url = self.url(&format!("/ads/{}", payload.endpoint))?;

        let mut form = Form::new();
        for (key, value) in &payload.fields {
            form = form.text(key.clone(), value.clone());
        }
        for part in &payload.files {
            let file = Part::bytes(part.bytes.to_vec())
                .file_name(part.file_name.clone())
                .mime_str(&part.content_type)?;
            form = form.part(part.key.clone(), file);
        }

        info!(
            endpoint = %payload.endpoint,
            fields = payload.fields.len(),
            files = payload.files.len(),
            binary_bytes = payload.binary_len(),
            "submitting listing"
        );

        let response = self
            .http
            .post(url)
            .bearer_auth(bearer)
            .multipart(form)
            .send()
            .await?;
        let response = check_status(response).await?;

        let body: SubmitResponse = response.json().await?;
        match body.ad {
            Some(ad) if body.success => {
                info!(ad_id = ad.id, title = %ad.title, "listing accepted");
                Ok(ad)
            }
            _ => Err(NetError::Rejected {
                status: 200,
                body: "backend reported failure without an ad".to_string(),
            }),
        }
    }
}
