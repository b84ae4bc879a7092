//! Transport layer
//!
//! `ApiClient` performs authenticated requests against one base URL and
//! classifies failures. The HTTP engine itself sits behind the `Transport`
//! trait so it can be swapped for an in-memory backend.

pub mod client;
pub mod reqwest_transport;
pub mod session;

pub use client::ApiClient;
pub use reqwest_transport::ReqwestTransport;
pub use session::{LogRedirect, LoginRedirect, SessionGuard};

use crate::error::Result;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// A request as handed to the transport. `path` is relative to the base URL
/// and already carries the API prefix.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub bearer_token: Option<String>,
    pub body: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Moves one request over the wire.
///
/// Implementations return `Err` only when no response was received; every
/// HTTP status, including errors, comes back as an `HttpResponse`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}
