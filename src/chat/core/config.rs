//! Configuration for the chat widget and its backend client.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::chat::core::errors::{ChatError, ChatResult};

/// Environment variable pointing to a JSON configuration file.
pub const CONFIG_PATH_ENV: &str = "STOREFRONT_CHAT_CONFIG";
/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "STOREFRONT_CHAT_API_URL";
/// Environment variable overriding the request timeout (seconds).
pub const TIMEOUT_ENV: &str = "STOREFRONT_CHAT_TIMEOUT_SECS";

/// Top-level configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Backend endpoints.
    pub api: ApiConfig,
    /// Widget texts and behaviour.
    pub widget: WidgetConfig,
}

impl ChatConfig {
    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> ChatResult<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(ChatError::InvalidConfig(
                "api.base_url must not be empty".to_string(),
            ));
        }

        self.api.endpoint(&self.api.history_path)?;
        self.api.endpoint(&self.api.ask_path)?;

        if self.api.request_timeout.is_zero() {
            return Err(ChatError::InvalidConfig(
                "api.request_timeout must be > 0".to_string(),
            ));
        }

        for (field, value) in [
            ("widget.welcome_message", &self.widget.welcome_message),
            ("widget.error_message", &self.widget.error_message),
            ("widget.login_prompt", &self.widget.login_prompt),
        ] {
            if value.trim().is_empty() {
                return Err(ChatError::InvalidConfig(format!("{field} must not be empty")));
            }
        }

        if !self.widget.login_path.starts_with('/') {
            return Err(ChatError::InvalidConfig(
                "widget.login_path must be an absolute path".to_string(),
            ));
        }

        Ok(())
    }

    /// Load configuration from a JSON file. Missing fields take defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_json_file(path: impl AsRef<Path>) -> ChatResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Build configuration from the environment.
    ///
    /// Starts from the file named by `STOREFRONT_CHAT_CONFIG` (or defaults) and
    /// applies the URL and timeout overrides.
    ///
    /// # Errors
    /// Returns an error if the file or an override is invalid.
    pub fn from_env() -> ChatResult<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_json_file(path)?,
            Err(_) => Self::default(),
        };

        if let Ok(base_url) = std::env::var(API_URL_ENV) {
            config.api.base_url = base_url;
        }

        if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ChatError::InvalidConfig(format!("{TIMEOUT_ENV} must be a number of seconds"))
            })?;
            config.api.request_timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api.base_url = base_url.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.api.request_timeout = timeout;
        self
    }
}

/// Backend endpoint settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the storefront API (should end with `/`).
    pub base_url: String,
    /// Path of the history endpoint, relative to `base_url`.
    pub history_path: String,
    /// Path of the ask endpoint, relative to `base_url`.
    pub ask_path: String,
    /// Timeout for a single request.
    #[serde(with = "duration_serde")]
    pub request_timeout: Duration,
}

impl ApiConfig {
    /// Resolve an endpoint path against the base URL.
    ///
    /// # Errors
    /// Returns an error if the base URL or the joined URL is invalid.
    pub fn endpoint(&self, path: &str) -> ChatResult<Url> {
        let base = Url::parse(&self.base_url)?;
        Ok(base.join(path.trim_start_matches('/'))?)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/api/".to_string(),
            history_path: "chatbot/history".to_string(),
            ask_path: "chatbot/ask".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Widget texts and presentation settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Greeting shown when there is no history to restore.
    pub welcome_message: String,
    /// Bot message appended when a send fails.
    pub error_message: String,
    /// Question asked before redirecting a guest to the login page.
    pub login_prompt: String,
    /// Route of the login page.
    pub login_path: String,
    /// Whether the widget starts visible.
    pub start_open: bool,
    /// Delay before scrolling so layout can settle (milliseconds).
    pub scroll_settle_ms: u64,
}

impl WidgetConfig {
    /// Scroll settle delay as a duration.
    #[must_use]
    pub const fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            welcome_message: "Xin chào! 👋 Mình là trợ lý của cửa hàng. Bạn cần tìm sản phẩm nào?"
                .to_string(),
            error_message: "Xin lỗi, đã có lỗi xảy ra. Bạn vui lòng thử lại sau nhé!".to_string(),
            login_prompt: "Bạn cần đăng nhập để trò chuyện với trợ lý. Chuyển đến trang đăng nhập?"
                .to_string(),
            login_path: "/login".to_string(),
            start_open: false,
            scroll_settle_ms: 100,
        }
    }
}

/// Serde module for Duration serialization.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ChatConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.widget.login_path, "/login");
        assert!(!config.widget.start_open);
    }

    #[test]
    fn test_endpoint_join() {
        let config = ChatConfig::default().with_base_url("https://shop.example/api/");
        let url = config.api.endpoint("/chatbot/ask").unwrap();
        assert_eq!(url.as_str(), "https://shop.example/api/chatbot/ask");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = ChatConfig::default().with_timeout(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = ChatConfig::default().with_base_url("not a url");
        assert!(matches!(config.validate(), Err(ChatError::Url(_))));

        let mut config = ChatConfig::default();
        config.widget.login_path = "login".to_string();
        assert!(config.validate().is_err());

        let mut config = ChatConfig::default();
        config.widget.error_message = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ChatConfig =
            serde_json::from_str(r#"{"api": {"request_timeout": 5}, "widget": {"start_open": true}}"#)
                .unwrap();
        assert_eq!(config.api.request_timeout, Duration::from_secs(5));
        assert_eq!(config.api.ask_path, "chatbot/ask");
        assert!(config.widget.start_open);
        assert_eq!(config.widget.scroll_settle(), Duration::from_millis(100));
    }
}
