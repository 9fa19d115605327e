use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::NormalizedVector,
    protocol::{AuthReply, LoginRequest, PredictRequest, ScorerReply, SignupRequest},
};
use thiserror::Error;
use tracing::debug;

pub mod auth;
pub mod form;
pub mod guard;
pub mod presenter;
pub mod session;
pub mod settings;
pub mod submission;

pub use auth::{login, logout, signup, AuthFlowError};
pub use form::{parse_number, FormModel};
pub use guard::AuthGuard;
pub use presenter::{present, trigger, Presentation, Trigger};
pub use session::{
    FileSessionStore, MemorySessionStore, SessionContext, SessionStore, SessionStoreError,
};
pub use settings::{load_settings, ClientSettings};
pub use submission::{SubmissionController, SubmissionState};

/// The remote call failed before a usable response body was received.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// For scorers and auth services that are not backed by reqwest.
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait RiskScorer: Send + Sync {
    async fn score(&self, input: &NormalizedVector) -> Result<ScorerReply, TransportError>;
}

/// Decoded answer from the login or signup endpoint.
#[derive(Debug, Clone)]
pub struct AuthResponse {
    /// The endpoint answered with a 2xx status.
    pub accepted: bool,
    pub reply: AuthReply,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, TransportError>;
    async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, TransportError>;
}

pub struct HttpApi {
    http: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }

    async fn post_auth<T: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<AuthResponse, TransportError> {
        let res = self.http.post(self.endpoint(path)).json(body).send().await?;
        let status = res.status();
        let reply: AuthReply = res.json().await?;
        debug!(%status, endpoint = path, "auth endpoint responded");
        Ok(AuthResponse {
            accepted: status.is_success(),
            reply,
        })
    }
}

#[async_trait]
impl RiskScorer for HttpApi {
    async fn score(&self, input: &NormalizedVector) -> Result<ScorerReply, TransportError> {
        // Error payloads arrive with 4xx/5xx statuses, so the body is decoded regardless.
        let res = self
            .http
            .post(self.endpoint("predict"))
            .json(&PredictRequest { input: *input })
            .send()
            .await?;
        let status = res.status();
        let reply: ScorerReply = res.json().await?;
        debug!(%status, ?reply, "scorer responded");
        Ok(reply)
    }
}

#[async_trait]
impl AuthService for HttpApi {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, TransportError> {
        self.post_auth("login", request).await
    }

    async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, TransportError> {
        self.post_auth("signup", request).await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
