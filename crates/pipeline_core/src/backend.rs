use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use shared::{
    domain::{ArtworkId, ArtworkRecord, PipelineStatus, ProfileSummary, UserId},
    error::{ApiError, ApiException},
    protocol::{
        ArtworkFields, ArtworkFilter, ArtworkList, ArtworkPatch, CreateArtworkRequest,
        CreateProfileRequest, ListArtworksQuery, UpdateStatusRequest,
    },
};
use url::Url;

/// Remote store the pipeline persists to. Calls either resolve or reject;
/// there is no partial success.
#[async_trait]
pub trait ArtworkBackend: Send + Sync {
    async fn load_profile(&self, user_id: UserId) -> Result<Option<ProfileSummary>>;
    async fn list(
        &self,
        user_id: UserId,
        filter: &ArtworkFilter,
        limit: u32,
    ) -> Result<ArtworkList>;
    async fn create(&self, user_id: UserId, fields: &ArtworkFields) -> Result<ArtworkRecord>;
    async fn update(&self, artwork_id: ArtworkId, patch: &ArtworkPatch) -> Result<ArtworkRecord>;
    async fn update_status(&self, artwork_id: ArtworkId, status: PipelineStatus) -> Result<()>;
    async fn delete(&self, artwork_id: ArtworkId) -> Result<()>;
}

pub struct MissingArtworkBackend;

#[async_trait]
impl ArtworkBackend for MissingArtworkBackend {
    async fn load_profile(&self, user_id: UserId) -> Result<Option<ProfileSummary>> {
        Err(anyhow!("artwork backend unavailable for user {}", user_id.0))
    }

    async fn list(
        &self,
        user_id: UserId,
        _filter: &ArtworkFilter,
        _limit: u32,
    ) -> Result<ArtworkList> {
        Err(anyhow!("artwork backend unavailable for user {}", user_id.0))
    }

    async fn create(&self, user_id: UserId, _fields: &ArtworkFields) -> Result<ArtworkRecord> {
        Err(anyhow!("artwork backend unavailable for user {}", user_id.0))
    }

    async fn update(&self, artwork_id: ArtworkId, _patch: &ArtworkPatch) -> Result<ArtworkRecord> {
        Err(anyhow!(
            "artwork backend unavailable for artwork {}",
            artwork_id.0
        ))
    }

    async fn update_status(&self, artwork_id: ArtworkId, _status: PipelineStatus) -> Result<()> {
        Err(anyhow!(
            "artwork backend unavailable for artwork {}",
            artwork_id.0
        ))
    }

    async fn delete(&self, artwork_id: ArtworkId) -> Result<()> {
        Err(anyhow!(
            "artwork backend unavailable for artwork {}",
            artwork_id.0
        ))
    }
}

/// JSON-over-HTTP client for the artwork server.
pub struct HttpArtworkBackend {
    http: Client,
    base_url: Url,
}

impl HttpArtworkBackend {
    pub fn new(server_url: &str) -> Result<Self> {
        Self::with_client(Client::new(), server_url)
    }

    /// Like `new`, but every request gives up after `timeout`.
    pub fn with_timeout(server_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        Self::with_client(http, server_url)
    }

    pub fn with_client(http: Client, server_url: &str) -> Result<Self> {
        let mut base_url =
            Url::parse(server_url).with_context(|| format!("invalid server url '{server_url}'"))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn create_profile(&self, display_name: &str) -> Result<ProfileSummary> {
        let response = self
            .http
            .post(self.endpoint("profiles")?)
            .json(&CreateProfileRequest {
                display_name: display_name.to_string(),
            })
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("invalid endpoint path '{path}'"))
    }
}

#[async_trait]
impl ArtworkBackend for HttpArtworkBackend {
    async fn load_profile(&self, user_id: UserId) -> Result<Option<ProfileSummary>> {
        let response = self
            .http
            .get(self.endpoint(&format!("profiles/{}", user_id.0))?)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(check(response).await?.json().await?))
    }

    async fn list(
        &self,
        user_id: UserId,
        filter: &ArtworkFilter,
        limit: u32,
    ) -> Result<ArtworkList> {
        let response = self
            .http
            .get(self.endpoint("artworks")?)
            .query(&ListArtworksQuery {
                user_id,
                status: filter.status,
                limit: Some(limit),
            })
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn create(&self, user_id: UserId, fields: &ArtworkFields) -> Result<ArtworkRecord> {
        let response = self
            .http
            .post(self.endpoint("artworks")?)
            .json(&CreateArtworkRequest {
                user_id,
                fields: fields.clone(),
            })
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn update(&self, artwork_id: ArtworkId, patch: &ArtworkPatch) -> Result<ArtworkRecord> {
        let response = self
            .http
            .patch(self.endpoint(&format!("artworks/{}", artwork_id.0))?)
            .json(patch)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn update_status(&self, artwork_id: ArtworkId, status: PipelineStatus) -> Result<()> {
        let response = self
            .http
            .put(self.endpoint(&format!("artworks/{}/status", artwork_id.0))?)
            .json(&UpdateStatusRequest { status })
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn delete(&self, artwork_id: ArtworkId) -> Result<()> {
        let response = self
            .http
            .delete(self.endpoint(&format!("artworks/{}", artwork_id.0))?)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

/// Turns a non-2xx response into an error, keeping the server's `ApiError`
/// when the body carries one.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match response.json::<ApiError>().await {
        Ok(api_error) => Err(anyhow::Error::new(ApiException::from(api_error))
            .context(format!("artwork backend returned {status}"))),
        Err(_) => Err(anyhow!("artwork backend returned {status}")),
    }
}

#[cfg(test)]
#[path = "tests/backend_tests.rs"]
mod tests;
