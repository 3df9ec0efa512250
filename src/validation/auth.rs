use std::fmt;

use garde::Validate;
use serde::Serialize;

use crate::error::{AppError, Result};

/// The body of `POST /auth/login`.
#[derive(Serialize, Validate)]
pub struct LoginRequest {
    #[garde(length(min = 1, max = 255))]
    pub username: String,
    #[garde(length(min = 1, max = 128))]
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.trim().to_string(),
            password: password.to_string(),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The body of `PUT /auth/profile`.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[garde(length(min = 1, max = 255))]
    pub display_name: String,
    #[garde(email)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[garde(custom(valid_minecraft_username))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minecraft_username: Option<String>,
}

impl ProfileUpdate {
    /// Builds an update, treating blank optional fields as absent.
    pub fn new(display_name: &str, email: Option<&str>, minecraft_username: Option<&str>) -> Self {
        let non_blank = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Self {
            display_name: display_name.trim().to_string(),
            email: non_blank(email),
            minecraft_username: non_blank(minecraft_username),
        }
    }
}

/// Minecraft names are 3 to 16 letters, digits or underscores.
fn valid_minecraft_username(value: &Option<String>, _ctx: &()) -> garde::Result {
    let Some(name) = value else {
        return Ok(());
    };
    if !(3..=16).contains(&name.len()) {
        return Err(garde::Error::new("must be between 3 and 16 characters"));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(garde::Error::new(
            "can only contain letters, numbers and underscores",
        ));
    }
    Ok(())
}

/// The body of `PUT /auth/password`.
#[derive(Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    #[garde(length(min = 1, max = 128))]
    pub current_password: String,
    #[garde(length(min = 6, max = 128))]
    pub new_password: String,
    #[serde(skip)]
    #[garde(skip)]
    confirmation: String,
}

impl PasswordChange {
    pub fn new(current_password: &str, new_password: &str, confirmation: &str) -> Self {
        Self {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
            confirmation: confirmation.to_string(),
        }
    }

    /// Validates field rules and that the new password matches its confirmation.
    pub fn check(&self) -> Result<()> {
        if self.new_password != self.confirmation {
            return Err(AppError::Validation("Passwords do not match".to_string()));
        }
        self.validate()?;
        Ok(())
    }
}

impl fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordChange").finish_non_exhaustive()
    }
}
