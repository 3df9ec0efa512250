use std::sync::Arc;

use garde::Validate;
use serde::Deserialize;

use crate::{
    api::ApiClient,
    error::{AppError, DEFAULT_LOGIN_ERROR, Result},
    models::{session::Session, user::User},
    navigation::Navigator,
    notify::Toasts,
    repositories::session::SessionStore,
    validation::auth::{LoginRequest, PasswordChange, ProfileUpdate},
};

/// The response body of `POST /auth/login`.
#[derive(Deserialize)]
struct LoginResponse {
    token: String,
    user: User,
}

/// Owns the session lifecycle: startup validation, login, logout and refresh.
#[derive(Clone)]
pub struct SessionManager {
    api: ApiClient,
    session: Arc<SessionStore>,
    navigator: Arc<Navigator>,
    toasts: Arc<Toasts>,
}

impl SessionManager {
    pub fn new(
        api: ApiClient,
        session: Arc<SessionStore>,
        navigator: Arc<Navigator>,
        toasts: Arc<Toasts>,
    ) -> Self {
        Self {
            api,
            session,
            navigator,
            toasts,
        }
    }

    pub fn session(&self) -> Session {
        self.session.snapshot()
    }

    /// Resolves the startup session from the persisted token.
    ///
    /// Without a token no request is made. With one, the token is attached and
    /// `/auth/me` decides: a profile signs the user in, any failure clears the
    /// token. Either way `loading` ends up false.
    pub async fn initialize(&self) -> Session {
        let token = match self.session.persisted_token() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("⚠️ Could not read persisted token: {}", e);
                None
            }
        };

        match token {
            None => tracing::debug!("🔐 No persisted token, starting signed out"),
            Some(token) => {
                self.session.attach(token);
                self.fetch_me().await;
            }
        }

        self.session.finish_loading();
        let session = self.session.snapshot();
        tracing::info!(
            "✅ Session resolved: {}",
            session
                .user
                .as_ref()
                .map(|u| u.username.as_str())
                .unwrap_or("signed out")
        );
        session
    }

    /// Authenticates against `/auth/login`, persists the returned token and
    /// returns the user. A rejection carries the server's error message.
    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        let request = LoginRequest::new(username, password);
        request.validate()?;

        tracing::debug!("🔐 Logging in: {}", request.username);
        let response: LoginResponse = match self.api.post("auth/login", &request).await {
            Ok(response) => response,
            Err(AppError::Unauthorized(msg)) => return Err(AppError::Authentication(msg)),
            Err(AppError::Http { status, message }) if status.is_client_error() => {
                return Err(AppError::Authentication(message));
            }
            Err(e) => return Err(e),
        };

        if response.token.trim().is_empty() {
            return Err(AppError::Authentication(DEFAULT_LOGIN_ERROR.to_string()));
        }

        self.session.establish(&response.token, response.user.clone())?;
        self.navigator.release_login();
        self.toasts
            .success(format!("Welcome, {}!", response.user.display_name));
        tracing::info!("✅ User logged in: {} ({})", response.user.username, response.user.role);

        Ok(response.user)
    }

    /// Clears the persisted token, the attached header and the user.
    /// No server round-trip; calling it twice is the same as calling it once.
    pub fn logout(&self) {
        let was_signed_in = self.session.snapshot().is_authenticated();
        self.session.clear();
        if was_signed_in {
            self.toasts.info("Logged out successfully");
            tracing::info!("👋 User logged out");
        }
    }

    /// Re-fetches the profile to pick up server-side changes. The token is left as is.
    ///
    /// Only a rejected token ends the session; a transient failure keeps the
    /// profile already held.
    pub async fn refresh(&self) -> Result<User> {
        match self.api.get::<User>("auth/me").await {
            Ok(user) => {
                self.session.set_user(user.clone());
                Ok(user)
            }
            Err(e @ AppError::Unauthorized(_)) => {
                self.session.clear();
                Err(e)
            }
            Err(e) => {
                tracing::warn!("⚠️ Profile refresh failed, keeping current profile: {}", e);
                Err(e)
            }
        }
    }

    /// Saves profile changes and refreshes the session on success.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        update.validate()?;

        if let Err(e) = self.api.put_unit("auth/profile", update).await {
            self.toasts.error(format!("Could not save profile: {}", e.user_message()));
            return Err(e);
        }
        self.toasts.success("Profile updated!");

        self.refresh().await
    }

    /// Changes the signed-in user's password.
    pub async fn change_password(&self, change: &PasswordChange) -> Result<()> {
        change.check()?;

        match self.api.put_unit("auth/password", change).await {
            Ok(()) => {
                self.toasts.success("Password changed successfully!");
                tracing::info!("🔑 Password changed");
                Ok(())
            }
            Err(e) => {
                self.toasts.error(e.user_message());
                Err(e)
            }
        }
    }

    async fn fetch_me(&self) {
        match self.api.get::<User>("auth/me").await {
            Ok(user) => {
                tracing::debug!("✅ Profile loaded for {}", user.username);
                self.session.set_user(user);
            }
            Err(e) => {
                tracing::warn!("⚠️ Profile fetch failed, clearing session: {}", e);
                self.session.clear();
            }
        }
    }
}
