//! User record as exchanged with the backend, plus display helpers.
//!
//! Enumerated fields travel as integers. Codes the console does not know are
//! kept as `Other(n)` so that a record survives a round trip untouched.

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Avatar shown when a record has none.
pub const DEFAULT_AVATAR: &str = "/icons/user-center.png";

macro_rules! int_enum {
    ($name:ident { $($variant:ident = $code:literal),+ $(,)? }) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(from = "i32", into = "i32")]
        pub enum $name {
            $($variant,)+
            Other(i32),
        }

        impl From<i32> for $name {
            fn from(code: i32) -> Self {
                match code {
                    $($code => Self::$variant,)+
                    other => Self::Other(other),
                }
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> i32 {
                match value {
                    $($name::$variant => $code,)+
                    $name::Other(other) => other,
                }
            }
        }
    };
}

int_enum!(Gender { Female = 0, Male = 1 });
int_enum!(UserStatus { Normal = 0, Disabled = 1 });
int_enum!(UserRole { Regular = 0, Admin = 1 });

impl Gender {
    pub const CHOICES: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn label(self) -> String {
        match self {
            Gender::Male => "男".to_string(),
            Gender::Female => "女".to_string(),
            Gender::Other(_) => String::new(),
        }
    }
}

impl UserStatus {
    pub const CHOICES: [UserStatus; 2] = [UserStatus::Normal, UserStatus::Disabled];

    pub fn label(self) -> String {
        match self {
            UserStatus::Normal => "正常".to_string(),
            UserStatus::Disabled => "禁用".to_string(),
            UserStatus::Other(code) => code.to_string(),
        }
    }
}

impl UserRole {
    pub const CHOICES: [UserRole; 2] = [UserRole::Admin, UserRole::Regular];

    pub fn label(self) -> String {
        match self {
            UserRole::Admin => "管理员".to_string(),
            _ => "普通用户".to_string(),
        }
    }
}

/// One user's persisted profile and access-control attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub user_account: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_status: Option<UserStatus>,
    #[serde(default)]
    pub user_role: Option<UserRole>,
    #[serde(default)]
    pub create_time: Option<String>,
}

impl UserRecord {
    pub fn is_admin(&self) -> bool {
        self.user_role == Some(UserRole::Admin)
    }

    /// Name for headings: username, then account, then a placeholder.
    pub fn display_name(&self) -> String {
        non_empty(&self.username)
            .or_else(|| non_empty(&self.user_account))
            .unwrap_or("未设置用户名")
            .to_string()
    }

    pub fn avatar(&self) -> &str {
        non_empty(&self.avatar_url).unwrap_or(DEFAULT_AVATAR)
    }

    pub fn gender_label(&self) -> String {
        self.gender.map(Gender::label).unwrap_or_default()
    }

    pub fn status_label(&self) -> String {
        self.user_status.map(UserStatus::label).unwrap_or_default()
    }

    pub fn role_label(&self) -> String {
        self.user_role.unwrap_or(UserRole::Regular).label()
    }

    pub fn create_time_label(&self) -> String {
        match non_empty(&self.create_time) {
            Some(raw) => format_timestamp(raw),
            None => "-".to_string(),
        }
    }
}

/// Borrow an optional string only when it has visible content.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// Render a backend timestamp in local time. Accepts RFC 3339 (what the
/// backend's JSON mapper emits) and a plain `YYYY-MM-DD HH:MM:SS`; anything
/// else is shown verbatim.
pub fn format_timestamp(raw: &str) -> String {
    const OUT: &str = "%Y-%m-%d %H:%M:%S";
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Local).format(OUT).to_string();
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return naive.format(OUT).to_string();
    }
    raw.to_string()
}
