use std::{future::Future, sync::Arc};

use crate::{
    api::ApiClient,
    boundary::FallbackBoundary,
    config::Config,
    error::Result,
    middleware_layer::interceptor::ResponseInterceptor,
    models::user::User,
    navigation::Navigator,
    notify::Toasts,
    query_cache::QueryCache,
    repositories::{session::SessionStore, token::TokenStore},
    routes::{
        router::{self, Resolution},
        table::{self, LOGIN_PATH, NavItem},
    },
    services::session::SessionManager,
};

/// The application shell: every collaborator, constructed once and passed down.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration.
    pub config: Config,
    /// The session and the persisted token behind it.
    pub session: Arc<SessionStore>,
    /// Current location and the login-redirect flag.
    pub navigator: Arc<Navigator>,
    /// Pending user notifications.
    pub toasts: Arc<Toasts>,
    /// The HTTP client with the global response interceptor.
    pub api: ApiClient,
    /// Login, logout, refresh and profile operations.
    pub auth: SessionManager,
    /// Cached GET results for views.
    pub queries: QueryCache,
    /// The top-level fault boundary.
    pub boundary: Arc<FallbackBoundary>,
}

impl AppState {
    /// Wires up a new `AppState` around `tokens`.
    pub fn new(config: &Config, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let session = Arc::new(SessionStore::new(tokens));
        let navigator = Arc::new(Navigator::default());
        let toasts = Arc::new(Toasts::new());

        let interceptor =
            ResponseInterceptor::new(session.clone(), navigator.clone(), toasts.clone());
        let api = ApiClient::new(config, session.clone(), interceptor)?;
        tracing::info!("✅ API client ready for {}", api.base_url());

        let auth = SessionManager::new(
            api.clone(),
            session.clone(),
            navigator.clone(),
            toasts.clone(),
        );
        let queries = QueryCache::new(api.clone(), config);

        Ok(AppState {
            config: config.clone(),
            session,
            navigator,
            toasts,
            api,
            auth,
            queries,
            boundary: Arc::new(FallbackBoundary::new()),
        })
    }

    /// Resolves the startup session, then settles on the current location.
    pub async fn start(&self) -> Resolution {
        self.auth.initialize().await;
        self.navigate(&self.navigator.location()).await
    }

    /// Navigates to `path` against the current session.
    ///
    /// Never waits: while startup validation is still running, guarded routes
    /// resolve to [`Resolution::Loading`] and the location is left unchanged.
    pub async fn navigate(&self, path: &str) -> Resolution {
        let session = self.session.snapshot();
        if !session.is_authenticated() {
            self.queries.clear().await;
        }
        let resolution = router::resolve(path, &session);
        self.commit(&resolution);
        resolution
    }

    /// Logs in and lands on the user's role page.
    pub async fn login(&self, username: &str, password: &str) -> Result<(User, Resolution)> {
        let user = self.auth.login(username, password).await?;
        let resolution = self.navigate(table::landing_path(user.role)).await;
        Ok((user, resolution))
    }

    /// Logs out, drops cached data and returns to the login entry point.
    pub async fn logout(&self) -> Resolution {
        self.auth.logout();
        self.navigate(LOGIN_PATH).await
    }

    /// Runs a view's work inside the fallback boundary.
    pub async fn render<T, E, F>(&self, view: F) -> Option<T>
    where
        F: Future<Output = std::result::Result<T, E>>,
        E: std::fmt::Display,
    {
        self.boundary.capture(view.await)
    }

    /// Hard reset after a fault: clears it, drops cached data and goes to login.
    pub async fn recover(&self) -> Resolution {
        if self.boundary.reset() {
            tracing::info!("🔄 Recovering from view fault");
        }
        self.queries.clear().await;
        self.navigate(LOGIN_PATH).await
    }

    /// The sidebar for the signed-in user.
    pub fn menu(&self) -> &'static [NavItem] {
        match self.session.snapshot().role() {
            Some(role) => table::nav_items(role),
            None => &[],
        }
    }

    fn commit(&self, resolution: &Resolution) {
        if let Resolution::Render {
            path,
            view,
            redirects,
        } = resolution
        {
            if !redirects.is_empty() {
                tracing::debug!("↪️ Redirected via {:?}", redirects);
            }
            self.navigator.commit(path, *view);
        }
    }
}
