mod common;

use std::{sync::Arc, time::Duration};

use common::{Backend, app, scratch_dir};
use craftmind_nexus::{
    AppError,
    models::user::{Role, User, UserId},
    notify::ToastLevel,
    repositories::token::{FileTokenStore, MemoryTokenStore, TokenStore},
    routes::{router::Resolution, table::View},
    validation::auth::{PasswordChange, ProfileUpdate},
};

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_startup_without_token_makes_no_request() {
        let backend = Backend::new();
        let base_url = backend.clone().spawn().await;
        let app = app(&base_url, Arc::new(MemoryTokenStore::new()));

        let session = app.auth.initialize().await;

        assert!(!session.loading);
        assert!(session.user.is_none());
        assert_eq!(backend.me_hits(), 0, "no token means no profile fetch");
    }

    #[tokio::test]
    async fn test_startup_with_valid_token_restores_user() {
        let backend = Backend::new();
        let base_url = backend.clone().spawn().await;
        let tokens = Arc::new(MemoryTokenStore::with_token("tok-teacher"));
        let app = app(&base_url, tokens.clone());

        let resolution = app.start().await;

        let session = app.session.snapshot();
        assert!(!session.loading);
        assert_eq!(session.role(), Some(Role::Teacher));
        assert_eq!(session.token(), Some("tok-teacher"));
        assert_eq!(backend.me_hits(), 1);
        // Started at "/", which funnels to the teacher landing page.
        assert_eq!(resolution.path(), Some("/teacher"));
        assert_eq!(resolution.view(), Some(View::TeacherDashboard));
    }

    #[tokio::test]
    async fn test_startup_with_invalid_token_removes_it() {
        let backend = Backend::new();
        let base_url = backend.clone().spawn().await;
        let dir = scratch_dir();
        let tokens = Arc::new(FileTokenStore::new(&dir));
        tokens.persist("tok-revoked").unwrap();
        let app = app(&base_url, tokens.clone());

        let resolution = app.start().await;

        assert!(tokens.load().unwrap().is_none(), "persisted token must be removed");
        assert!(!tokens.path().exists());
        let session = app.session.snapshot();
        assert!(!session.loading);
        assert!(session.user.is_none());
        assert!(session.token().is_none());
        assert_eq!(resolution.view(), Some(View::Login));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_startup_with_backend_offline_resolves_signed_out() {
        let tokens = Arc::new(MemoryTokenStore::with_token("tok-admin"));
        let app = app("http://127.0.0.1:1/api", tokens.clone());

        let session = app.auth.initialize().await;

        assert!(!session.loading);
        assert!(session.user.is_none());
        assert!(tokens.load().unwrap().is_none());
        assert!(app.toasts.is_empty(), "network failures do not raise toasts");
    }

    #[tokio::test]
    async fn test_admin_login_and_navigation() {
        let backend = Backend::new();
        let base_url = backend.spawn().await;
        let dir = scratch_dir();
        let tokens = Arc::new(FileTokenStore::new(&dir));
        let app = app(&base_url, tokens.clone());
        app.start().await;

        let (user, landing) = app.login("admin", "admin123").await.unwrap();

        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.id, UserId::Number(1));
        assert_eq!(tokens.load().unwrap().as_deref().map(String::as_str), Some("tok-admin"));
        assert_eq!(landing.view(), Some(View::AdminDashboard));

        let welcome = app.toasts.drain();
        assert_eq!(welcome.len(), 1);
        assert_eq!(welcome[0].level, ToastLevel::Success);
        assert_eq!(welcome[0].message, "Welcome, Alex Admin!");

        let admin = app.navigate("/admin").await;
        assert_eq!(
            admin,
            Resolution::Render {
                path: "/admin".into(),
                view: View::AdminDashboard,
                redirects: vec![],
            }
        );

        let bounced = app.navigate("/student").await;
        assert_eq!(
            bounced,
            Resolution::Render {
                path: "/admin".into(),
                view: View::AdminDashboard,
                redirects: vec!["/dashboard", "/admin"],
            }
        );
        assert_eq!(app.navigator.location(), "/admin");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_bad_credentials_surface_server_message() {
        let backend = Backend::new();
        let base_url = backend.spawn().await;
        let app = app(&base_url, Arc::new(MemoryTokenStore::new()));
        app.start().await;

        let err = app.login("admin", "wrong").await.unwrap_err();

        assert!(matches!(err, AppError::Authentication(ref msg) if msg == "Invalid credentials"));
        assert!(app.session.snapshot().user.is_none());
        assert_eq!(app.navigator.location(), "/login");
    }

    #[tokio::test]
    async fn test_empty_credentials_never_reach_the_backend() {
        let app = app("http://127.0.0.1:1/api", Arc::new(MemoryTokenStore::new()));
        let err = app.auth.login("  ", "").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_logout_twice_matches_logout_once() {
        let backend = Backend::new();
        let base_url = backend.spawn().await;
        let tokens = Arc::new(MemoryTokenStore::new());
        let app = app(&base_url, tokens.clone());
        app.start().await;
        app.login("steve", "mine123").await.unwrap();
        app.toasts.drain();

        let first = app.logout().await;
        let after_first = app.session.snapshot();
        let second = app.logout().await;
        let after_second = app.session.snapshot();

        assert_eq!(first, second);
        assert_eq!(first.view(), Some(View::Login));
        assert!(after_first.user.is_none() && after_second.user.is_none());
        assert!(after_first.token().is_none() && after_second.token().is_none());
        assert_eq!(after_first.loading, after_second.loading);
        assert!(tokens.load().unwrap().is_none());
        assert_eq!(app.toasts.drain().len(), 1, "only the real logout is announced");
        assert!(app.menu().is_empty());
    }

    #[tokio::test]
    async fn test_profile_update_refreshes_session() {
        let backend = Backend::new();
        let base_url = backend.clone().spawn().await;
        let app = app(&base_url, Arc::new(MemoryTokenStore::new()));
        app.start().await;
        app.login("steve", "mine123").await.unwrap();
        let hits_before = backend.me_hits();

        let update = ProfileUpdate::new("Steve the Builder", None, Some("Builder_7"));
        let user = app.auth.update_profile(&update).await.unwrap();

        assert_eq!(user.display_name, "Steve the Builder");
        assert_eq!(user.minecraft_username.as_deref(), Some("Builder_7"));
        assert_eq!(backend.me_hits(), hits_before + 1);
        assert_eq!(
            app.session.snapshot().user.unwrap().display_name,
            "Steve the Builder"
        );
        assert_eq!(app.session.snapshot().token(), Some("tok-student"));
        assert_eq!(user.progress().level, 3);
    }

    #[tokio::test]
    async fn test_password_change_reports_wrong_current_password() {
        let backend = Backend::new();
        let base_url = backend.spawn().await;
        let app = app(&base_url, Arc::new(MemoryTokenStore::new()));
        app.start().await;
        app.login("ana", "teach123").await.unwrap();
        app.toasts.drain();

        let err = app
            .auth
            .change_password(&PasswordChange::new("nope", "newpass1", "newpass1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Http { ref message, .. } if message == "Current password is incorrect"));
        assert_eq!(app.toasts.drain()[0].level, ToastLevel::Error);

        app.auth
            .change_password(&PasswordChange::new("teach123", "newpass1", "newpass1"))
            .await
            .unwrap();
        app.logout().await;
        assert!(app.login("ana", "newpass1").await.is_ok());
    }

    #[tokio::test]
    async fn test_navigation_before_startup_never_blocks() {
        let app = app("http://127.0.0.1:1/api", Arc::new(MemoryTokenStore::new()));
        let wait = Duration::from_secs(2);

        let login = tokio::time::timeout(wait, app.navigate("/login"))
            .await
            .expect("public routes resolve while loading");
        assert_eq!(login.view(), Some(View::Login));

        let admin = tokio::time::timeout(wait, app.navigate("/admin"))
            .await
            .expect("guarded routes report loading instead of waiting");
        assert_eq!(admin, Resolution::Loading);
        assert_eq!(app.navigator.location(), "/login");

        let out = tokio::time::timeout(wait, app.logout())
            .await
            .expect("logout does not wait for startup");
        assert_eq!(out.view(), Some(View::Login));
        assert!(app.session.snapshot().loading);
    }

    #[tokio::test]
    async fn test_refresh_with_rejected_token_ends_session() {
        let backend = Backend::new();
        let base_url = backend.spawn().await;
        let tokens = Arc::new(MemoryTokenStore::new());
        let app = app(&base_url, tokens.clone());
        app.start().await;
        app.login("ana", "teach123").await.unwrap();

        tokens.persist("tok-revoked").unwrap();
        app.session
            .attach(zeroize::Zeroizing::new("tok-revoked".to_string()));

        let err = app.auth.refresh().await.unwrap_err();

        assert!(matches!(err, AppError::Unauthorized(_)));
        let session = app.session.snapshot();
        assert!(session.user.is_none());
        assert!(session.token().is_none());
        assert!(tokens.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_refresh_server_error_keeps_profile() {
        let backend = Backend::new();
        let base_url = backend.clone().spawn().await;
        let tokens = Arc::new(MemoryTokenStore::new());
        let app = app(&base_url, tokens.clone());
        app.start().await;
        app.login("steve", "mine123").await.unwrap();

        backend.fail_me(1);
        let err = app.auth.refresh().await.unwrap_err();

        assert!(matches!(err, AppError::Server { .. }));
        let session = app.session.snapshot();
        assert_eq!(
            session.user.as_ref().map(|u| u.username.as_str()),
            Some("steve")
        );
        assert_eq!(session.token(), Some("tok-student"));
        assert!(tokens.load().unwrap().is_some());

        let user = app.auth.refresh().await.unwrap();
        assert_eq!(user.display_name, "Steve");
    }

    #[tokio::test]
    async fn test_refresh_offline_keeps_profile() {
        let tokens = Arc::new(MemoryTokenStore::new());
        let app = app("http://127.0.0.1:1/api", tokens.clone());
        let admin = User {
            id: UserId::Number(1),
            username: "admin".into(),
            display_name: "Alex Admin".into(),
            email: "admin@nexus.school".into(),
            role: Role::Admin,
            minecraft_username: None,
            total_xp: None,
            level: None,
        };
        app.session.establish("tok-admin", admin).unwrap();

        let err = app.auth.refresh().await.unwrap_err();

        assert!(matches!(err, AppError::Network(_)));
        let session = app.session.snapshot();
        assert_eq!(session.role(), Some(Role::Admin));
        assert_eq!(session.token(), Some("tok-admin"));
        assert_eq!(tokens.load().unwrap().as_deref().map(String::as_str), Some("tok-admin"));
    }
}
