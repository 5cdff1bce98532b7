//! 前端配置
//!
//! 所有值在编译期通过环境变量注入（`SIGPA_FIREBASE_API_KEY=... trunk build`），
//! 未设置时使用本地开发用的默认值。

use sigpa::AppConfig;

const DEFAULT_ALERT_RELAY_URL: &str = "http://localhost:8787";
const DEFAULT_FIREBASE_PROJECT_ID: &str = "sigpa-demo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontendConfig {
    /// Identity Toolkit 的 Web API Key
    pub firebase_api_key: String,
    pub firebase_project_id: String,
    /// 告警中继地址（不带结尾斜杠）
    pub alert_relay_url: String,
    pub app: AppConfig,
}

impl FrontendConfig {
    pub fn from_env() -> Self {
        let mut app = AppConfig::default();
        if let Some(path) = option_env!("SIGPA_DATA_BASE_PATH") {
            app = app.with_data_base_path(path);
        }

        Self {
            firebase_api_key: option_env!("SIGPA_FIREBASE_API_KEY")
                .unwrap_or_default()
                .to_string(),
            firebase_project_id: option_env!("SIGPA_FIREBASE_PROJECT_ID")
                .unwrap_or(DEFAULT_FIREBASE_PROJECT_ID)
                .to_string(),
            alert_relay_url: option_env!("SIGPA_ALERT_RELAY_URL")
                .unwrap_or(DEFAULT_ALERT_RELAY_URL)
                .trim_end_matches('/')
                .to_string(),
            app,
        }
    }

    pub fn has_identity_provider(&self) -> bool {
        !self.firebase_api_key.is_empty()
    }
}
