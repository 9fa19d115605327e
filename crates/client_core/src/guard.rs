use shared::{domain::Route, error::AuthRequired};
use tracing::info;

use crate::session::SessionContext;

/// Entry check for the prediction view.
#[derive(Debug, Clone)]
pub struct AuthGuard {
    session: SessionContext,
}

impl AuthGuard {
    pub fn new(session: SessionContext) -> Self {
        Self { session }
    }

    pub fn enter(&self) -> Result<(), AuthRequired> {
        if self.session.is_authenticated() {
            return Ok(());
        }
        info!(redirect = %Route::Login, "protected view requested without a session");
        Err(AuthRequired {
            redirect: Route::Login,
        })
    }

    /// Runs `render` only when the session flag is set; otherwise nothing is rendered.
    pub fn protect<T>(&self, render: impl FnOnce() -> T) -> Result<T, AuthRequired> {
        self.enter()?;
        Ok(render())
    }
}
