//! `/auth`: login, first-admin registration and the current user.

use crate::error::Result;
use crate::models::{LoginRequest, TokenResponse, User, UserCreate};
use crate::transport::ApiClient;

#[derive(Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Log in and keep the returned token for subsequent requests.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: TokenResponse = self.client.post("/auth/login", &request).await?;

        let session = self.client.session();
        session.tokens().set(&response.access_token)?;
        session.reset();
        tracing::info!("Logged in as {}", response.user.email);

        Ok(response)
    }

    /// Only succeeds while no users exist yet.
    pub async fn register_first_admin(&self, data: &UserCreate) -> Result<User> {
        self.client.post("/auth/register-first", data).await
    }

    pub async fn current_user(&self) -> Result<User> {
        self.client.get("/auth/me").await
    }

    /// Forget the stored token. Purely local.
    pub fn logout(&self) -> Result<()> {
        self.client.session().tokens().clear()
    }
}
