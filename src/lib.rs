//! Client core for the CraftMind Nexus school platform: session lifecycle,
//! role-based route guarding and the REST API client that ties them together.

pub mod api;
pub mod boundary;
pub mod config;
pub mod error;
pub mod navigation;
pub mod notify;
pub mod query_cache;
pub mod state;

pub mod models {
    pub mod session;
    pub mod user;
}

pub mod repositories {
    pub mod session;
    pub mod token;
}

pub mod services {
    pub mod session;
}

pub mod middleware_layer {
    pub mod guard;
    pub mod interceptor;
}

pub mod routes {
    pub mod router;
    pub mod table;
}

pub mod validation {
    pub mod auth;
}

pub use config::Config;
pub use error::{AppError, Result};
pub use state::AppState;
