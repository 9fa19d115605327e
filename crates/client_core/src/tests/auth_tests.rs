use super::*;
use async_trait::async_trait;
use shared::protocol::AuthReply;
use std::sync::Mutex;

use crate::AuthResponse;

enum Scripted {
    Answer { accepted: bool, reply: AuthReply },
    Down,
}

struct ScriptedAuthService {
    script: Scripted,
    logins: Mutex<Vec<LoginRequest>>,
    signups: Mutex<Vec<SignupRequest>>,
}

impl ScriptedAuthService {
    fn answering(accepted: bool, error: Option<&str>, message: Option<&str>) -> Self {
        Self::new(Scripted::Answer {
            accepted,
            reply: AuthReply {
                error: error.map(str::to_string),
                message: message.map(str::to_string),
            },
        })
    }

    fn down() -> Self {
        Self::new(Scripted::Down)
    }

    fn new(script: Scripted) -> Self {
        Self {
            script,
            logins: Mutex::new(Vec::new()),
            signups: Mutex::new(Vec::new()),
        }
    }

    fn respond(&self) -> Result<AuthResponse, TransportError> {
        match &self.script {
            Scripted::Answer { accepted, reply } => Ok(AuthResponse {
                accepted: *accepted,
                reply: reply.clone(),
            }),
            Scripted::Down => Err(TransportError::Unavailable("connection refused".to_string())),
        }
    }
}

#[async_trait]
impl AuthService for ScriptedAuthService {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, TransportError> {
        self.logins.lock().expect("logins").push(request.clone());
        self.respond()
    }

    async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, TransportError> {
        self.signups.lock().expect("signups").push(request.clone());
        self.respond()
    }
}

#[tokio::test]
async fn accepted_login_sets_flag_and_routes_to_predict() {
    let service = ScriptedAuthService::answering(true, None, Some("Login successful."));
    let session = SessionContext::in_memory();

    let route = login(&service, &session, "ana@example.com", "pw")
        .await
        .expect("login");

    assert_eq!(route, Route::Predict);
    assert!(session.is_authenticated());
    let logins = service.logins.lock().expect("logins");
    assert_eq!(logins[0].email, "ana@example.com");
    assert_eq!(logins[0].password, "pw");
}

#[tokio::test]
async fn rejected_login_surfaces_server_text_and_leaves_flag_unset() {
    let service = ScriptedAuthService::answering(false, Some("Invalid email or password."), None);
    let session = SessionContext::in_memory();

    let err = login(&service, &session, "ana@example.com", "wrong")
        .await
        .expect_err("rejected");

    assert_eq!(err.to_string(), "Invalid email or password.");
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn rejected_login_without_text_uses_fallback() {
    let service = ScriptedAuthService::answering(false, None, None);
    let err = login(&service, &SessionContext::in_memory(), "a", "b")
        .await
        .expect_err("rejected");
    assert_eq!(err.to_string(), LOGIN_FAILED_MESSAGE);
}

#[tokio::test]
async fn unreachable_login_uses_generic_text() {
    let session = SessionContext::in_memory();
    let err = login(&ScriptedAuthService::down(), &session, "a", "b")
        .await
        .expect_err("down");

    assert!(matches!(err, AuthFlowError::Unreachable { .. }));
    assert_eq!(err.to_string(), LOGIN_UNREACHABLE_MESSAGE);
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn signup_reports_outcome_without_touching_session() {
    let service = ScriptedAuthService::answering(true, None, Some("User created successfully."));
    let message = signup(&service, "Ana", "ana@example.com", "pw")
        .await
        .expect("signup");
    assert_eq!(message, SIGNUP_SUCCEEDED_MESSAGE);
    assert_eq!(service.signups.lock().expect("signups")[0].name, "Ana");

    let rejected = ScriptedAuthService::answering(false, Some("User already exists."), None);
    let err = signup(&rejected, "Ana", "ana@example.com", "pw")
        .await
        .expect_err("duplicate");
    assert_eq!(err.to_string(), "User already exists.");

    let err = signup(&ScriptedAuthService::down(), "Ana", "ana@example.com", "pw")
        .await
        .expect_err("down");
    assert_eq!(err.to_string(), SERVER_ERROR_MESSAGE);
}

#[tokio::test]
async fn logout_clears_flag_and_routes_to_login() {
    let session = SessionContext::in_memory();
    login(
        &ScriptedAuthService::answering(true, None, None),
        &session,
        "a",
        "b",
    )
    .await
    .expect("login");

    assert_eq!(logout(&session).expect("logout"), Route::Login);
    assert!(!session.is_authenticated());
}
