use serde::{Deserialize, Serialize};

pub mod fixtures;
pub mod format;
pub mod logbook;
pub mod navigation;
pub mod protocol;
pub mod validation;
pub mod weather;

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const APP_NAME: &str = "SIGPA";
pub const STORAGE_THEME_KEY: &str = "sigpa-theme";
pub const STORAGE_SESSION_KEY: &str = "sigpa-session";
pub const THEME_CHANGED_EVENT: &str = "themeChanged";
pub const PROFILE_COLLECTION: &str = "users";

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

/// 显示主题
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Light, Theme::Dark, Theme::System];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }

    /// 界面上显示的名称
    pub fn label(&self) -> &'static str {
        match self {
            Theme::Light => "Claro",
            Theme::Dark => "Oscuro",
            Theme::System => "Sistema",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Theme::Light => "bi-sun",
            Theme::Dark => "bi-moon-stars",
            Theme::System => "bi-circle-half",
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(format!("tema desconocido: {}", other)),
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 身份提供方交给我们的会话用户
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub provider_ids: Vec<String>,
}

impl AuthUser {
    /// 顶栏显示用的名字：优先 displayName，否则取邮箱 @ 之前的部分
    pub fn short_name(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => self.email.split('@').next().unwrap_or(&self.email),
        }
    }
}

/// 文档库中以 uid 为键的用户档案
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, rename = "photoURL")]
    pub photo_url: String,
    #[serde(default)]
    pub provider_ids: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// 档案的可编辑字段，`None` 表示不修改
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.photo_url.is_none()
    }
}

/// 登录方式的友好名称
pub fn provider_display_name(provider_id: &str) -> &str {
    match provider_id {
        "password" => "Email y contraseña",
        "google.com" => "Google",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_parses_only_known_names() {
        assert_eq!("dark".parse::<Theme>(), Ok(Theme::Dark));
        assert_eq!("light".parse::<Theme>(), Ok(Theme::Light));
        assert!("sepia".parse::<Theme>().is_err());
        assert_eq!(Theme::default(), Theme::System);
    }

    #[test]
    fn short_name_falls_back_to_email_user() {
        let mut user = AuthUser {
            uid: "u1".into(),
            email: "ana@finca.co".into(),
            display_name: None,
            photo_url: None,
            provider_ids: vec!["password".into()],
        };
        assert_eq!(user.short_name(), "ana");

        user.display_name = Some("Ana Gómez".into());
        assert_eq!(user.short_name(), "Ana Gómez");
    }

    #[test]
    fn profile_uses_firestore_field_names() {
        let profile = UserProfile {
            uid: "u1".into(),
            email: "ana@finca.co".into(),
            display_name: "Ana".into(),
            photo_url: "https://img/ana.png".into(),
            provider_ids: vec!["password".into()],
            created_at: chrono::DateTime::from_timestamp(0, 0).unwrap(),
            updated_at: chrono::DateTime::from_timestamp(0, 0).unwrap(),
            last_login_at: None,
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["displayName"], "Ana");
        assert_eq!(json["photoURL"], "https://img/ana.png");
        assert_eq!(json["providerIds"][0], "password");
        assert!(json.get("lastLoginAt").is_none());
    }
}
