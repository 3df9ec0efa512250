#![allow(dead_code)]

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use craftmind_nexus::{AppState, Config, repositories::token::TokenStore};
use serde_json::{Value, json};
use tokio::sync::Notify;

struct Account {
    username: &'static str,
    password: String,
    token: &'static str,
    profile: Value,
}

#[derive(Default)]
struct Counters {
    me: usize,
    me_failures_left: usize,
    classes: usize,
    classes_failures_left: usize,
    hold_classes: bool,
}

/// In-process stand-in for the REST backend.
#[derive(Clone)]
pub struct Backend {
    accounts: Arc<Mutex<Vec<Account>>>,
    counters: Arc<Mutex<Counters>>,
    classes_arrived: Arc<Notify>,
    classes_released: Arc<Notify>,
}

impl Backend {
    pub fn new() -> Self {
        let accounts = vec![
            Account {
                username: "admin",
                password: "admin123".into(),
                token: "tok-admin",
                profile: json!({
                    "id": 1, "username": "admin", "displayName": "Alex Admin",
                    "email": "admin@nexus.school", "role": "admin"
                }),
            },
            Account {
                username: "ana",
                password: "teach123".into(),
                token: "tok-teacher",
                profile: json!({
                    "id": 2, "username": "ana", "displayName": "Ana Teacher",
                    "email": "ana@nexus.school", "role": "teacher"
                }),
            },
            Account {
                username: "steve",
                password: "mine123".into(),
                token: "tok-student",
                profile: json!({
                    "id": "s-3", "username": "steve", "displayName": "Steve",
                    "email": "steve@nexus.school", "role": "student",
                    "minecraftUsername": "Steve_42", "totalXp": 2450, "level": 3
                }),
            },
        ];
        Self {
            accounts: Arc::new(Mutex::new(accounts)),
            counters: Arc::new(Mutex::new(Counters::default())),
            classes_arrived: Arc::new(Notify::new()),
            classes_released: Arc::new(Notify::new()),
        }
    }

    pub fn me_hits(&self) -> usize {
        self.counters.lock().unwrap().me
    }

    pub fn classes_hits(&self) -> usize {
        self.counters.lock().unwrap().classes
    }

    /// Makes the next `n` calls to `/classes` answer 503.
    pub fn fail_classes(&self, n: usize) {
        self.counters.lock().unwrap().classes_failures_left = n;
    }

    /// Makes the next `n` calls to `/auth/me` answer 503.
    pub fn fail_me(&self, n: usize) {
        self.counters.lock().unwrap().me_failures_left = n;
    }

    /// Holds the next `/classes` response until [`Backend::release_classes`].
    pub fn hold_classes(&self) {
        self.counters.lock().unwrap().hold_classes = true;
    }

    /// Resolves once a held `/classes` request has reached the backend.
    pub async fn classes_arrived(&self) {
        self.classes_arrived.notified().await;
    }

    pub fn release_classes(&self) {
        self.classes_released.notify_one();
    }

    /// Starts serving on an ephemeral port and returns the API base URL.
    pub async fn spawn(self) -> String {
        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/me", get(me))
            .route("/api/auth/profile", put(update_profile))
            .route("/api/auth/password", put(change_password))
            .route("/api/classes", get(classes))
            .route("/api/reports", get(reports))
            .with_state(self);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/api", addr)
    }

    fn profile_for(&self, headers: &HeaderMap) -> Option<Value> {
        let token = headers
            .get(AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;
        let accounts = self.accounts.lock().unwrap();
        accounts
            .iter()
            .find(|a| a.token == token)
            .map(|a| a.profile.clone())
    }
}

fn rejected(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

async fn login(State(backend): State<Backend>, Json(body): Json<Value>) -> Response {
    let accounts = backend.accounts.lock().unwrap();
    let found = accounts.iter().find(|a| {
        body["username"] == a.username && body["password"].as_str() == Some(a.password.as_str())
    });
    match found {
        Some(account) => Json(json!({ "token": account.token, "user": account.profile })).into_response(),
        None => rejected(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    }
}

async fn me(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    {
        let mut counters = backend.counters.lock().unwrap();
        counters.me += 1;
        if counters.me_failures_left > 0 {
            counters.me_failures_left -= 1;
            return rejected(StatusCode::SERVICE_UNAVAILABLE, "Try again");
        }
    }
    match backend.profile_for(&headers) {
        Some(profile) => Json(profile).into_response(),
        None => rejected(StatusCode::UNAUTHORIZED, "Token invalid or expired"),
    }
}

async fn update_profile(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let Some(profile) = backend.profile_for(&headers) else {
        return rejected(StatusCode::UNAUTHORIZED, "Token invalid or expired");
    };
    let mut accounts = backend.accounts.lock().unwrap();
    let account = accounts
        .iter_mut()
        .find(|a| a.profile["id"] == profile["id"])
        .unwrap();
    for field in ["displayName", "email", "minecraftUsername"] {
        if let Some(value) = body.get(field) {
            account.profile[field] = value.clone();
        }
    }
    Json(json!({ "ok": true })).into_response()
}

async fn change_password(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let Some(profile) = backend.profile_for(&headers) else {
        return rejected(StatusCode::UNAUTHORIZED, "Token invalid or expired");
    };
    let mut accounts = backend.accounts.lock().unwrap();
    let account = accounts
        .iter_mut()
        .find(|a| a.profile["id"] == profile["id"])
        .unwrap();
    if body["currentPassword"].as_str() != Some(account.password.as_str()) {
        return rejected(StatusCode::BAD_REQUEST, "Current password is incorrect");
    }
    account.password = body["newPassword"].as_str().unwrap_or_default().to_string();
    StatusCode::NO_CONTENT.into_response()
}

async fn classes(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    if backend.profile_for(&headers).is_none() {
        return rejected(StatusCode::UNAUTHORIZED, "Token invalid or expired");
    }
    let held = {
        let mut counters = backend.counters.lock().unwrap();
        counters.classes += 1;
        if counters.classes_failures_left > 0 {
            counters.classes_failures_left -= 1;
            return rejected(StatusCode::SERVICE_UNAVAILABLE, "Try again");
        }
        std::mem::take(&mut counters.hold_classes)
    };
    if held {
        backend.classes_arrived.notify_one();
        backend.classes_released.notified().await;
    }
    Json(json!([{ "id": 1, "name": "7A" }, { "id": 2, "name": "8B" }])).into_response()
}

async fn reports() -> Response {
    rejected(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable")
}

pub fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("craftmind-e2e-{}", uuid::Uuid::new_v4()))
}

pub fn app(base_url: &str, tokens: Arc<dyn TokenStore>) -> AppState {
    let config = Config::new(base_url).unwrap();
    AppState::new(&config, tokens).unwrap()
}
