use std::sync::Arc;

use http::StatusCode;

use crate::{
    error::{AppError, DEFAULT_HTTP_ERROR, error_message},
    navigation::Navigator,
    notify::Toasts,
    repositories::session::SessionStore,
};

/// Shown on any 5xx response.
pub const SERVER_ERROR_TOAST: &str = "Server error. Please try again.";

/// Global side effects layered around every API response.
///
/// The error handed back to the caller is the same one it would get without
/// the interceptor; only session, navigation and notifications change.
#[derive(Clone)]
pub struct ResponseInterceptor {
    session: Arc<SessionStore>,
    navigator: Arc<Navigator>,
    toasts: Arc<Toasts>,
}

impl ResponseInterceptor {
    pub fn new(session: Arc<SessionStore>, navigator: Arc<Navigator>, toasts: Arc<Toasts>) -> Self {
        Self {
            session,
            navigator,
            toasts,
        }
    }

    /// Maps a non-success response to an error, running the matching side effect.
    pub fn on_error_status(&self, status: StatusCode, body: &[u8]) -> AppError {
        let message = error_message(body);

        if status == StatusCode::UNAUTHORIZED {
            self.on_unauthorized();
            return AppError::Unauthorized(
                message.unwrap_or_else(|| "Session expired".to_string()),
            );
        }

        let message = message.unwrap_or_else(|| DEFAULT_HTTP_ERROR.to_string());
        if status.is_server_error() {
            tracing::error!("❌ Server responded {}: {}", status, message);
            self.toasts.error(SERVER_ERROR_TOAST);
            return AppError::Server { status, message };
        }

        tracing::debug!("Request rejected with {}: {}", status, message);
        AppError::Http { status, message }
    }

    /// Handles a request that produced no response at all.
    pub fn on_transport_error(&self, err: reqwest::Error) -> AppError {
        if err.is_builder() {
            return AppError::Internal(format!("Invalid request: {}", err));
        }
        tracing::warn!("⚠️ Backend unreachable: {}", err);
        AppError::Network(err.to_string())
    }

    fn on_unauthorized(&self) {
        if !self.navigator.claim_login_redirect() {
            tracing::debug!("🔐 401 while already at login, not redirecting");
            return;
        }
        tracing::warn!("🔐 Session rejected by backend, returning to login");
        self.session.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        notify::ToastLevel,
        repositories::token::{MemoryTokenStore, TokenStore},
        routes::table::{LOGIN_PATH, View},
    };

    fn fixture() -> (ResponseInterceptor, Arc<MemoryTokenStore>, Arc<Navigator>, Arc<Toasts>) {
        let tokens = Arc::new(MemoryTokenStore::with_token("stale"));
        let session = Arc::new(SessionStore::new(tokens.clone()));
        session.attach(zeroize::Zeroizing::new("stale".to_string()));
        let navigator = Arc::new(Navigator::new("/teacher/grades"));
        let toasts = Arc::new(Toasts::new());
        let interceptor = ResponseInterceptor::new(session, navigator.clone(), toasts.clone());
        (interceptor, tokens, navigator, toasts)
    }

    #[test]
    fn unauthorized_clears_and_redirects_once() {
        let (interceptor, tokens, navigator, _) = fixture();

        let err = interceptor.on_error_status(StatusCode::UNAUTHORIZED, br#"{"error":"Token expirado"}"#);
        assert!(matches!(err, AppError::Unauthorized(ref msg) if msg == "Token expirado"));
        assert_eq!(navigator.location(), LOGIN_PATH);
        assert!(tokens.load().unwrap().is_none());

        tokens.persist("fresh").unwrap();
        let err = interceptor.on_error_status(StatusCode::UNAUTHORIZED, b"");
        assert!(matches!(err, AppError::Unauthorized(_)));
        assert!(tokens.load().unwrap().is_some(), "second 401 must not touch the session");
    }

    #[test]
    fn unauthorized_at_login_does_nothing() {
        let (interceptor, tokens, navigator, _) = fixture();
        navigator.commit(LOGIN_PATH, View::Login);

        interceptor.on_error_status(StatusCode::UNAUTHORIZED, b"");
        assert!(tokens.load().unwrap().is_some());
    }

    #[test]
    fn server_errors_raise_a_toast() {
        let (interceptor, _, navigator, toasts) = fixture();
        let err = interceptor.on_error_status(StatusCode::BAD_GATEWAY, b"");
        assert!(matches!(err, AppError::Server { status, .. } if status == StatusCode::BAD_GATEWAY));
        let drained = toasts.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].level, ToastLevel::Error);
        assert_eq!(navigator.location(), "/teacher/grades");
    }

    #[test]
    fn client_errors_pass_through_quietly() {
        let (interceptor, _, _, toasts) = fixture();
        let err = interceptor.on_error_status(StatusCode::NOT_FOUND, br#"{"error":"Turma nao encontrada"}"#);
        assert!(matches!(err, AppError::Http { ref message, .. } if message == "Turma nao encontrada"));
        assert!(toasts.is_empty());
    }
}
