//! Authenticated API client
//!
//! Every resource module goes through `ApiClient`, which attaches the bearer
//! token, turns non-2xx responses into classified `AppError`s and performs
//! the one side effect the API contract asks for: on 401 the session is
//! cleared and the user is sent to login. Nothing here retries.

use super::session::{LoginRedirect, SessionGuard};
use super::{HttpRequest, HttpResponse, Method, Transport};
use crate::config;
use crate::error::{AppError, Result};
use crate::models::HealthStatus;
use crate::services::credentials::TokenStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

struct Inner {
    transport: Arc<dyn Transport>,
    session: SessionGuard,
    prefix: String,
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        tokens: Arc<dyn TokenStore>,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                session: SessionGuard::new(tokens, redirect),
                prefix: config::API_V1_PREFIX.to_string(),
            }),
        }
    }

    pub fn session(&self) -> &SessionGuard {
        &self.inner.session
    }

    /// Perform a request and decode the JSON response body.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T> {
        let response = self.send(method, path, body).await?;
        serde_json::from_str(&response.body).map_err(|e| {
            tracing::warn!("Failed to decode response of {} {}: {}", method, path, e);
            AppError::Serialization(e)
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::Get, path, None).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.request(Method::Post, path, Some(serde_json::to_value(body)?))
            .await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.request(Method::Put, path, Some(serde_json::to_value(body)?))
            .await
    }

    /// PUT without a request body (e.g. publish).
    pub async fn put_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::Put, path, None).await
    }

    /// DELETE; whatever the server answers on success is discarded.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(Method::Delete, path, None).await.map(|_| ())
    }

    /// Unauthenticated liveness probe. Any failure means "unhealthy".
    pub async fn check_health(&self) -> bool {
        let request = HttpRequest {
            method: Method::Get,
            path: config::HEALTH_PATH.to_string(),
            bearer_token: None,
            body: None,
        };

        match self.inner.transport.send(request).await {
            Ok(response) if response.is_success() => {
                match serde_json::from_str::<HealthStatus>(&response.body) {
                    Ok(health) => health.status == "healthy",
                    Err(e) => {
                        tracing::debug!("Health response not understood: {}", e);
                        false
                    }
                }
            }
            Ok(response) => {
                tracing::debug!("Health check returned status {}", response.status);
                false
            }
            Err(e) => {
                tracing::debug!("Health check failed: {}", e);
                false
            }
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<HttpResponse> {
        let request = HttpRequest {
            method,
            path: format!("{}{}", self.inner.prefix, path),
            bearer_token: self.inner.session.token(),
            body,
        };

        tracing::debug!("{} {}", method, request.path);

        let response = self.inner.transport.send(request).await.map_err(|e| {
            tracing::warn!("{} {} got no response: {}", method, path, e);
            e
        })?;

        if response.is_success() {
            return Ok(response);
        }

        let error = AppError::from_status(response.status, extract_detail(&response));
        if matches!(error, AppError::Unauthorized(_)) {
            self.inner.session.handle_unauthorized();
        } else {
            tracing::warn!("{} {} failed: {}", method, path, error);
        }
        Err(error)
    }
}

/// Pull the human-readable `detail` out of an error body.
///
/// The API answers `{"detail": "..."}` for domain errors and
/// `{"detail": [{"msg": "..."}, ...]}` for request validation failures.
fn extract_detail(response: &HttpResponse) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(&response.body).ok();

    match parsed.as_ref().and_then(|v| v.get("detail")) {
        Some(serde_json::Value::String(detail)) => detail.clone(),
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
            .collect::<Vec<_>>()
            .join("; "),
        _ if !response.body.trim().is_empty() => response.body.trim().to_string(),
        _ => format!("HTTP {}", response.status),
    }
}
