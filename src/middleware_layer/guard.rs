use crate::{
    models::{session::Session, user::Role},
    routes::table::{DASHBOARD_PATH, LOGIN_PATH},
};

/// What the guard decided for a protected view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// The session has not resolved yet; show a neutral loading state.
    Loading,
    /// The view may render.
    Render,
    /// Navigate elsewhere instead.
    Redirect(&'static str),
}

/// Decides whether a protected view renders for `session`.
///
/// `allowed` is the view's role allow-list; `None` admits any signed-in user.
/// Pure: no navigation happens here.
pub fn check(session: &Session, allowed: Option<&[Role]>) -> GuardDecision {
    if session.loading {
        return GuardDecision::Loading;
    }

    let Some(user) = session.user.as_ref() else {
        tracing::debug!("🔐 No authenticated user, redirecting to login");
        return GuardDecision::Redirect(LOGIN_PATH);
    };

    match allowed {
        Some(roles) if !roles.contains(&user.role) => {
            tracing::debug!("🚫 Role {} not allowed here, redirecting to dashboard", user.role);
            GuardDecision::Redirect(DASHBOARD_PATH)
        }
        _ => GuardDecision::Render,
    }
}
