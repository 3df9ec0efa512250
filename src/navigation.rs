use std::sync::{
    RwLock,
    atomic::{AtomicBool, Ordering},
};

use crate::routes::table::{LOGIN_PATH, View};

/// Tracks where the application currently is.
///
/// `at_login` is an explicit flag rather than a comparison on the location
/// string. It is set whenever the login entry point renders or a forced
/// re-login starts, and cleared when any other view renders.
#[derive(Debug)]
pub struct Navigator {
    location: RwLock<String>,
    at_login: AtomicBool,
}

impl Navigator {
    pub fn new(initial: &str) -> Self {
        Self {
            location: RwLock::new(initial.to_string()),
            at_login: AtomicBool::new(false),
        }
    }

    pub fn location(&self) -> String {
        match self.location.read() {
            Ok(location) => location.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_at_login(&self) -> bool {
        self.at_login.load(Ordering::SeqCst)
    }

    /// Records that `view` rendered at `path`.
    pub fn commit(&self, path: &str, view: View) {
        self.set_location(path);
        self.at_login.store(view == View::Login, Ordering::SeqCst);
    }

    /// Starts a forced return to the login entry point.
    ///
    /// Returns false, and changes nothing, when the application is already at
    /// the login entry point or another caller already started the redirect.
    pub fn claim_login_redirect(&self) -> bool {
        if self
            .at_login
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }
        self.set_location(LOGIN_PATH);
        true
    }

    /// Drops the login flag without moving. Called once a new session is
    /// established so the next rejected token is handled again.
    pub fn release_login(&self) {
        self.at_login.store(false, Ordering::SeqCst);
    }

    fn set_location(&self, path: &str) {
        let mut location = match self.location.write() {
            Ok(location) => location,
            Err(poisoned) => poisoned.into_inner(),
        };
        *location = path.to_string();
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new("/")
    }
}
