use std::fmt;

use serde::{Deserialize, Serialize};

/// Experience points needed to climb one level.
pub const XP_PER_LEVEL: u64 = 1000;

/// The role a user holds; decides which views are reachable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Secretary,
    Teacher,
    Student,
}

impl Role {
    /// Every role, in display order.
    pub const ALL: [Role; 4] = [Role::Admin, Role::Secretary, Role::Teacher, Role::Student];

    /// The wire name of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Secretary => "secretary",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }

    /// Human-readable label shown next to the user's name.
    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Secretary => "Secretary",
            Role::Teacher => "Teacher",
            Role::Student => "Student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "secretary" => Ok(Role::Secretary),
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Backend identifiers arrive as numbers or strings depending on the endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Number(i64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Number(n) => write!(f, "{}", n),
            UserId::Text(s) => f.write_str(s),
        }
    }
}

/// The authenticated user's profile as returned by `/auth/me` and `/auth/login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The unique identifier for the user.
    pub id: UserId,
    /// The user's login name.
    pub username: String,
    /// The name shown across the dashboards.
    pub display_name: String,
    /// The user's email address.
    #[serde(default)]
    pub email: String,
    /// The user's role.
    pub role: Role,
    /// The linked Minecraft account, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minecraft_username: Option<String>,
    /// Accumulated experience points (students).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_xp: Option<u64>,
    /// Level as reported by the backend (students).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
}

/// Where a student stands inside their current level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct XpProgress {
    pub level: u64,
    pub xp_in_level: u64,
    pub percent: u8,
}

impl XpProgress {
    pub fn from_xp(xp: u64) -> Self {
        let xp_in_level = xp % XP_PER_LEVEL;
        let percent = ((xp_in_level * 100 + XP_PER_LEVEL / 2) / XP_PER_LEVEL).min(100) as u8;
        Self {
            level: xp / XP_PER_LEVEL + 1,
            xp_in_level,
            percent,
        }
    }
}

impl User {
    pub fn progress(&self) -> XpProgress {
        XpProgress::from_xp(self.total_xp.unwrap_or(0))
    }
}
