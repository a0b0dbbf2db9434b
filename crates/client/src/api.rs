//! REST client for the clinic backend.
//!
//! Wraps the backend HTTP API (paginated list endpoints, divergence audit,
//! carteirinha migration) using [`reqwest`]. Every response is a
//! [`StandardResult`] envelope, except list endpoints that may also answer
//! with a bare [`PaginatedResult`]; both are unwrapped here so callers only
//! ever see the payload or a [`ClientError`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use clinica_core::envelope::StandardResult;
use clinica_core::pagination::PaginatedResult;
use clinica_core::query::{request_params, Filter, ListQuery};
use clinica_core::resources::Resource;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::source::{
    AuditRequest, AuditSummary, ListSource, MigrationRequest, MigrationSummary, Mutations,
};

/// HTTP client for the clinic backend.
#[derive(Debug, Clone)]
pub struct BackendApi {
    client: reqwest::Client,
    api_url: String,
}

impl BackendApi {
    /// Create a client for `api_url` (e.g. `http://host:3000/api`).
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self { client, api_url }
    }

    /// Build a client with the configured base URL and timeout.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self::with_client(client, config.api_url.clone()))
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Fetch one list page: `GET {api_url}/{resource}?page=..&limit=..`.
    pub async fn list(
        &self,
        resource: Resource,
        query: &ListQuery,
        filters: &[Filter],
    ) -> ClientResult<PaginatedResult<serde_json::Value>> {
        let response = self
            .client
            .get(format!("{}/{}", self.api_url, resource))
            .query(&request_params(query, filters))
            .send()
            .await?;

        let body: serde_json::Value = Self::parse_response(response).await?;
        decode_list_body(body)
    }

    /// `POST {api_url}/divergencias/auditoria`.
    pub async fn run_divergence_audit(&self, request: &AuditRequest) -> ClientResult<AuditSummary> {
        request.validate()?;
        self.post_envelope("divergencias/auditoria", request).await
    }

    /// `POST {api_url}/carteirinhas/migracao`.
    pub async fn migrate_carteirinhas(
        &self,
        request: &MigrationRequest,
    ) -> ClientResult<MigrationSummary> {
        self.post_envelope("carteirinhas/migracao", request).await
    }

    // ---- private helpers ----

    async fn post_envelope<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}/{}", self.api_url, path))
            .json(body)
            .send()
            .await?;

        let envelope: StandardResult<T> = Self::parse_response(response).await?;
        unwrap_envelope(envelope)
    }

    /// Ensure the response has a success status code.
    ///
    /// A non-2xx response whose body is a failure envelope becomes
    /// [`ClientError::Backend`] so the backend's message reaches the user;
    /// anything else becomes [`ClientError::Api`] with the raw body.
    async fn ensure_success(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());

        if let Ok(envelope) = serde_json::from_str::<StandardResult<serde_json::Value>>(&body) {
            if let Err(failure) = envelope.into_result() {
                tracing::warn!(status = status.as_u16(), error = %failure, "Backend rejected request");
                return Err(ClientError::Backend(failure));
            }
        }

        tracing::warn!(status = status.as_u16(), "Backend returned error status");
        Err(ClientError::Api {
            status: status.as_u16(),
            body,
        })
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Unwrap a [`StandardResult`], requiring a payload on success.
pub fn unwrap_envelope<T>(envelope: StandardResult<T>) -> ClientResult<T> {
    envelope.into_result()?.ok_or(ClientError::MissingData)
}

/// Decode a list endpoint body, accepting either an envelope around a page
/// or a bare page.
pub fn decode_list_body(
    body: serde_json::Value,
) -> ClientResult<PaginatedResult<serde_json::Value>> {
    if body.get("success").is_some() {
        let envelope: StandardResult<PaginatedResult<serde_json::Value>> =
            serde_json::from_value(body)?;
        unwrap_envelope(envelope)
    } else {
        Ok(serde_json::from_value(body)?)
    }
}

#[async_trait]
impl ListSource for BackendApi {
    async fn fetch_page(
        &self,
        resource: Resource,
        query: &ListQuery,
        filters: &[Filter],
    ) -> ClientResult<PaginatedResult<serde_json::Value>> {
        self.list(resource, query, filters).await
    }
}

#[async_trait]
impl Mutations for BackendApi {
    async fn run_divergence_audit(&self, request: &AuditRequest) -> ClientResult<AuditSummary> {
        BackendApi::run_divergence_audit(self, request).await
    }

    async fn migrate_carteirinhas(
        &self,
        request: &MigrationRequest,
    ) -> ClientResult<MigrationSummary> {
        BackendApi::migrate_carteirinhas(self, request).await
    }
}
