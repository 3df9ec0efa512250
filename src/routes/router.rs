use crate::{
    middleware_layer::guard::{self, GuardDecision},
    models::session::Session,
    routes::table::{self, DASHBOARD_PATH, LOGIN_PATH, Target, View},
};

/// Redirect hops followed before giving up on a path.
pub const MAX_REDIRECTS: usize = 8;

/// The outcome of resolving a navigation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The session is still loading; nothing was decided.
    Loading,
    /// `view` renders at `path`, reached through `redirects` (in order).
    Render {
        path: String,
        view: View,
        redirects: Vec<&'static str>,
    },
}

impl Resolution {
    pub fn view(&self) -> Option<View> {
        match self {
            Resolution::Loading => None,
            Resolution::Render { view, .. } => Some(*view),
        }
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            Resolution::Loading => None,
            Resolution::Render { path, .. } => Some(path.as_str()),
        }
    }
}

/// Drops query string, fragment and trailing slashes.
pub fn normalize_path(raw: &str) -> String {
    let path = raw
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// Where `/dashboard` sends the current session.
pub fn dashboard_target(session: &Session) -> &'static str {
    match session.role() {
        Some(role) => table::landing_path(role),
        None => LOGIN_PATH,
    }
}

/// Resolves `requested` against the route table for `session`.
///
/// Follows guard and table redirects until a view renders. A chain longer than
/// [`MAX_REDIRECTS`] ends on the Not Found view.
pub fn resolve(requested: &str, session: &Session) -> Resolution {
    let mut current = normalize_path(requested);
    let mut redirects = Vec::new();

    loop {
        let spec = table::lookup(&current);

        let decision = match spec.access.allow_list() {
            None => GuardDecision::Render,
            Some(allowed) => guard::check(session, allowed),
        };

        let next = match decision {
            GuardDecision::Loading => return Resolution::Loading,
            GuardDecision::Redirect(to) => to,
            GuardDecision::Render => match spec.target {
                Target::Redirect(to) => to,
                Target::View(View::DashboardRedirect) => dashboard_target(session),
                Target::View(View::Login) if session.is_authenticated() => DASHBOARD_PATH,
                Target::View(view) => {
                    return Resolution::Render {
                        path: current,
                        view,
                        redirects,
                    };
                }
            },
        };

        if redirects.len() == MAX_REDIRECTS {
            tracing::error!("❌ Redirect loop resolving {}: {:?}", requested, redirects);
            return Resolution::Render {
                path: current,
                view: View::NotFound,
                redirects,
            };
        }
        redirects.push(next);
        current = next.to_string();
    }
}
