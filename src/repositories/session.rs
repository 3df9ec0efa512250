use std::sync::Arc;

use tokio::sync::watch;
use zeroize::Zeroizing;

use crate::{
    error::Result,
    models::{session::Session, user::User},
    repositories::token::TokenStore,
};

/// Owns the single [`Session`] and the durable token behind it.
///
/// Constructed once at startup and handed to every collaborator that needs it.
/// Mutations go through `watch::Sender::send_modify`, so readers always see a
/// whole snapshot and no lock is ever held across an await.
pub struct SessionStore {
    state: watch::Sender<Session>,
    tokens: Arc<dyn TokenStore>,
}

impl SessionStore {
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        let (state, _) = watch::channel(Session::starting());
        Self { state, tokens }
    }

    /// A copy of the current session.
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Waits until the startup validation has finished and returns the resolved session.
    pub async fn resolved(&self) -> Session {
        let mut rx = self.state.subscribe();
        match rx.wait_for(|session| !session.loading).await {
            Ok(session) => session.clone(),
            Err(_) => self.snapshot(),
        }
    }

    /// The `Authorization` header value for outbound requests, if a token is attached.
    pub fn bearer(&self) -> Option<Zeroizing<String>> {
        self.state
            .borrow()
            .token
            .as_ref()
            .map(|token| Zeroizing::new(format!("Bearer {}", token.as_str())))
    }

    /// Reads the persisted token.
    pub fn persisted_token(&self) -> Result<Option<Zeroizing<String>>> {
        self.tokens.load()
    }

    /// Attaches `token` to future requests without persisting it.
    pub fn attach(&self, token: Zeroizing<String>) {
        self.state.send_modify(|session| session.token = Some(token));
    }

    /// Persists `token`, attaches it and records `user` as signed in.
    pub fn establish(&self, token: &str, user: User) -> Result<()> {
        self.tokens.persist(token)?;
        let token = Zeroizing::new(token.to_string());
        self.state.send_modify(|session| {
            session.token = Some(token);
            session.user = Some(user);
            session.loading = false;
        });
        Ok(())
    }

    /// Replaces the profile of the signed-in user.
    pub fn set_user(&self, user: User) {
        self.state.send_modify(|session| session.user = Some(user));
    }

    /// Drops the persisted token, the attached header and the in-memory user.
    ///
    /// A failure to remove the persisted token is logged; the in-memory session
    /// is cleared regardless.
    pub fn clear(&self) {
        if let Err(e) = self.tokens.clear() {
            tracing::warn!("⚠️ Failed to remove persisted token: {}", e);
        }
        self.state.send_modify(|session| {
            session.token = None;
            session.user = None;
        });
    }

    /// Marks startup validation as finished. Only the first call has any effect.
    pub fn finish_loading(&self) -> bool {
        self.state.send_if_modified(|session| {
            if session.loading {
                session.loading = false;
                true
            } else {
                false
            }
        })
    }
}
