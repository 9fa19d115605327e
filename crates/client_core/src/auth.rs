//! Login, signup and logout. Credentials are checked by the remote auth service; the only
//! local effect is the session flag.

use shared::{
    domain::Route,
    error::SERVER_ERROR_MESSAGE,
    protocol::{LoginRequest, SignupRequest},
};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    session::{SessionContext, SessionStoreError},
    AuthService, TransportError,
};

pub const LOGIN_FAILED_MESSAGE: &str = "Login failed";
pub const LOGIN_UNREACHABLE_MESSAGE: &str = "Something went wrong";
pub const SIGNUP_FAILED_MESSAGE: &str = "Signup failed";
pub const SIGNUP_SUCCEEDED_MESSAGE: &str = "Account created successfully! Please login.";

#[derive(Debug, Error)]
pub enum AuthFlowError {
    /// The service answered with a non-success status; the text comes from its body.
    #[error("{0}")]
    Rejected(String),
    #[error("{message}")]
    Unreachable {
        message: &'static str,
        #[source]
        source: TransportError,
    },
    #[error("failed to update session: {0}")]
    Session(#[from] SessionStoreError),
}

/// On success the session flag is set and the caller should navigate to the returned route.
pub async fn login(
    service: &dyn AuthService,
    session: &SessionContext,
    email: &str,
    password: &str,
) -> Result<Route, AuthFlowError> {
    let request = LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    };
    let response = service
        .login(&request)
        .await
        .map_err(|source| service_unreachable(LOGIN_UNREACHABLE_MESSAGE, source))?;

    if !response.accepted {
        let message = response.reply.failure_text(LOGIN_FAILED_MESSAGE);
        info!(%message, "login rejected");
        return Err(AuthFlowError::Rejected(message));
    }

    session.mark_authenticated()?;
    info!("login accepted");
    Ok(Route::Predict)
}

/// Returns the confirmation text. Signup never touches the session flag.
pub async fn signup(
    service: &dyn AuthService,
    name: &str,
    email: &str,
    password: &str,
) -> Result<String, AuthFlowError> {
    let request = SignupRequest {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    };
    let response = service
        .signup(&request)
        .await
        .map_err(|source| service_unreachable(SERVER_ERROR_MESSAGE, source))?;

    if !response.accepted {
        let message = response.reply.failure_text(SIGNUP_FAILED_MESSAGE);
        info!(%message, "signup rejected");
        return Err(AuthFlowError::Rejected(message));
    }
    Ok(SIGNUP_SUCCEEDED_MESSAGE.to_string())
}

pub fn logout(session: &SessionContext) -> Result<Route, AuthFlowError> {
    session.clear()?;
    Ok(Route::Login)
}

fn service_unreachable(message: &'static str, source: TransportError) -> AuthFlowError {
    warn!(error = %source, "auth service unreachable");
    AuthFlowError::Unreachable { message, source }
}

#[cfg(test)]
#[path = "tests/auth_tests.rs"]
mod tests;
