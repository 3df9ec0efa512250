use std::fmt;

use zeroize::Zeroizing;

use crate::models::user::{Role, User};

/// The client-held record of the authenticated user and their bearer token.
///
/// `loading` is true only while the startup token validation is in flight.
/// It flips to false exactly once, whether that validation succeeds or not.
#[derive(Clone)]
pub struct Session {
    /// The bearer token attached to outbound requests.
    pub token: Option<Zeroizing<String>>,
    /// The authenticated user's profile.
    pub user: Option<User>,
    /// Whether the startup validation is still pending.
    pub loading: bool,
}

impl Session {
    /// The state a fresh application starts in.
    pub fn starting() -> Self {
        Self {
            token: None,
            user: None,
            loading: true,
        }
    }

    /// A resolved session with nobody signed in.
    pub fn signed_out() -> Self {
        Self {
            token: None,
            user: None,
            loading: false,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.as_str())
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::starting()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user", &self.user.as_ref().map(|u| &u.username))
            .field("loading", &self.loading)
            .finish()
    }
}
