// src/config/mod.rs

use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct BoltunConfig {
    // ── Provider Configuration
    pub provider_base_url: String,
    pub provider_api_key: String,
    pub chat_model: String,
    pub code_model: String,
    pub vision_model: String,
    pub image_model: String,

    // ── Telegram Configuration
    pub telegram_api_base: String,
    pub telegram_bot_token: String,

    // ── Server Configuration
    pub host: String,
    pub port: u16,

    // ── Timeouts (in seconds)
    pub request_timeout_secs: u64,

    // ── Logging Configuration
    pub log_level: String,
}

impl Default for BoltunConfig {
    fn default() -> Self {
        Self {
            provider_base_url: "https://api.a4f.co/v1".to_string(),
            provider_api_key: String::new(),
            chat_model: "provider-3/claude-3.5-haiku".to_string(),
            code_model: "deepseek-v3".to_string(),
            vision_model: "provider-3/claude-3.5-haiku".to_string(),
            image_model: "flux-1.1-pro".to_string(),
            telegram_api_base: "https://api.telegram.org".to_string(),
            telegram_bot_token: String::new(),
            host: "0.0.0.0".to_string(),
            port: 3001,
            request_timeout_secs: 60,
            log_level: "info".to_string(),
        }
    }
}

/// Values may carry inline `#` comments and stray whitespace, both are
/// stripped before parsing.
fn parse_env_value<T: FromStr>(raw: &str) -> Option<T> {
    let clean = raw.split('#').next().unwrap_or("").trim();
    clean.parse::<T>().ok()
}

fn env_var_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match parse_env_value(&raw) {
            Some(parsed) => parsed,
            None => {
                eprintln!("Config: {} = '{}' (parse failed, using default)", key, raw);
                default
            }
        },
        // Just a missing variable, use the default.
        Err(_) => default,
    }
}

impl BoltunConfig {
    pub fn from_env() -> Self {
        // Load from .env file first if it exists
        if dotenvy::dotenv().is_err() {
            eprintln!("Warning: .env file not found. Using environment variables and defaults.");
        }

        let defaults = Self::default();
        Self {
            provider_base_url: env_var_or("A4F_BASE_URL", defaults.provider_base_url),
            provider_api_key: env_var_or("A4F_API_KEY", defaults.provider_api_key),
            chat_model: env_var_or("BOLTUN_CHAT_MODEL", defaults.chat_model),
            code_model: env_var_or("BOLTUN_CODE_MODEL", defaults.code_model),
            vision_model: env_var_or("BOLTUN_VISION_MODEL", defaults.vision_model),
            image_model: env_var_or("BOLTUN_IMAGE_MODEL", defaults.image_model),
            telegram_api_base: env_var_or("TELEGRAM_API_BASE", defaults.telegram_api_base),
            telegram_bot_token: env_var_or("TELEGRAM_BOT_TOKEN", defaults.telegram_bot_token),
            host: env_var_or("BOLTUN_HOST", defaults.host),
            port: env_var_or("BOLTUN_PORT", defaults.port),
            request_timeout_secs: env_var_or("BOLTUN_REQUEST_TIMEOUT", defaults.request_timeout_secs),
            log_level: env_var_or("BOLTUN_LOG_LEVEL", defaults.log_level),
        }
    }

    // --- Convenience Methods for Common Operations ---

    /// Get server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Timeout applied to every outbound provider and Telegram request
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
