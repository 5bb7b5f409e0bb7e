// Async HTTP client for the deviation REST API.
//
// Endpoints: /deviations, /deviations/{id}, /deviations/stats
// Bodies: JSON, camelCase

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::endpoints::Endpoint;
use crate::transport::TransportConfig;
use crate::types::{CreateDeviation, Deviation, DeviationStats, ListParams, Page, UpdateDeviation};
use crate::Error;

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the deviation backend.
///
/// Single-shot calls: no retry, no caching. Failures are returned to the
/// caller unchanged.
#[derive(Debug, Clone)]
pub struct DeviationClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DeviationClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL (e.g. `http://localhost:3000/api`) and
    /// transport settings.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, base_url)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::UnsupportedBaseUrl(base_url.into()));
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append the endpoint's segments to the base path. Works with or
    /// without a trailing slash on the base.
    fn url(&self, endpoint: Endpoint<'_>) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::UnsupportedBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(endpoint.segments());
        Ok(url)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, endpoint: Endpoint<'_>) -> Result<T, Error> {
        let url = self.url(endpoint)?;
        debug!(endpoint = endpoint.template(), "GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    async fn get_with_params<T: DeserializeOwned, Q: Serialize + std::fmt::Debug + Sync>(
        &self,
        endpoint: Endpoint<'_>,
        params: &Q,
    ) -> Result<T, Error> {
        let url = self.url(endpoint)?;
        debug!(endpoint = endpoint.template(), "GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        endpoint: Endpoint<'_>,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(endpoint)?;
        debug!(endpoint = endpoint.template(), "POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        endpoint: Endpoint<'_>,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(endpoint)?;
        debug!(endpoint = endpoint.template(), "PATCH {url}");

        let resp = self.http.patch(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    async fn delete(&self, endpoint: Endpoint<'_>) -> Result<(), Error> {
        let url = self.url(endpoint)?;
        debug!(endpoint = endpoint.template(), "DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        self.handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();

        let message = serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(|err| err.message)
            .filter(|m| !m.trim().is_empty());

        debug!(status = status.as_u16(), ?message, "request failed");
        Error::Api {
            status: status.as_u16(),
            message,
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// `GET /deviations` with optional filters and pagination.
    pub async fn list(&self, params: Option<&ListParams>) -> Result<Page<Deviation>, Error> {
        match params {
            Some(params) => self.get_with_params(Endpoint::Collection, params).await,
            None => self.get(Endpoint::Collection).await,
        }
    }

    pub async fn get_deviation(&self, id: &str) -> Result<Deviation, Error> {
        self.get(Endpoint::Item(id)).await
    }

    pub async fn create(&self, payload: &CreateDeviation) -> Result<Deviation, Error> {
        self.post(Endpoint::Collection, payload).await
    }

    pub async fn update(&self, id: &str, payload: &UpdateDeviation) -> Result<Deviation, Error> {
        self.patch(Endpoint::Item(id), payload).await
    }

    /// `DELETE /deviations/{id}`. Any 2xx counts as success; the body is ignored.
    pub async fn delete_deviation(&self, id: &str) -> Result<(), Error> {
        self.delete(Endpoint::Item(id)).await
    }

    pub async fn stats(&self) -> Result<DeviationStats, Error> {
        self.get(Endpoint::Stats).await
    }
}
