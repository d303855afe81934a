use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use service_core::middleware::AllowedOrigins;
use std::env;
use std::time::Duration;

const DEFAULT_APIYI_BASE_URL: &str = "https://api.apiyi.com";
const DEFAULT_IMAGE_PATH: &str = "v1/chat/completions";
const DEFAULT_VIDEO_SUBMIT_PATH: &str = "veo/v1/api/video/submit";

/// Image generation is slow; the provider routinely takes minutes.
const DEFAULT_IMAGE_TIMEOUT_SECS: u64 = 300;
const DEFAULT_VIDEO_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub apiyi: ApiyiConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiyiConfig {
    pub api_key: String,
    pub base_url: String,
    pub image_path: String,
    pub image_timeout_secs: u64,
    pub video_submit_path: String,
    pub video_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Raw `CORS_ALLOW_ORIGINS`; parsed with [`AllowedOrigins::parse`].
    pub cors_allow_origins: Option<String>,
    /// Prefix for absolute `view_url`s. Relative URLs are returned when unset.
    pub public_base_url: Option<String>,
}

impl GatewayConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = core_config::is_prod();

        Ok(GatewayConfig {
            common: common_config,
            mongodb: MongoConfig {
                uri: get_env("MONGO_DB_URI", None, is_prod)?,
                database: get_env("MONGO_DB_NAME", Some("zumidb"), is_prod)?,
            },
            apiyi: ApiyiConfig {
                api_key: get_env("APIYI_API_KEY", None, is_prod)?,
                base_url: get_non_blank("APIYI_BASE_URL", DEFAULT_APIYI_BASE_URL),
                image_path: get_non_blank("APIYI_IMAGE_PATH", DEFAULT_IMAGE_PATH),
                image_timeout_secs: get_secs(
                    "APIYI_IMAGE_TIMEOUT_SECONDS",
                    DEFAULT_IMAGE_TIMEOUT_SECS,
                )?,
                video_submit_path: get_non_blank("APIYI_SUBMIT_PATH", DEFAULT_VIDEO_SUBMIT_PATH),
                video_timeout_secs: get_secs("APIYI_TIMEOUT_SECONDS", DEFAULT_VIDEO_TIMEOUT_SECS)?,
            },
            http: HttpConfig {
                cors_allow_origins: env::var("CORS_ALLOW_ORIGINS").ok(),
                public_base_url: env::var("PUBLIC_BASE_URL")
                    .ok()
                    .map(|v| v.trim().trim_end_matches('/').to_string())
                    .filter(|v| !v.is_empty()),
            },
        })
    }

    pub fn allowed_origins(&self) -> AllowedOrigins {
        AllowedOrigins::parse(self.http.cors_allow_origins.as_deref())
    }
}

impl ApiyiConfig {
    pub fn image_url(&self) -> String {
        join_url(&self.base_url, &self.image_path)
    }

    pub fn video_submit_url(&self) -> String {
        join_url(&self.base_url, &self.video_submit_path)
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_secs)
    }

    pub fn video_timeout(&self) -> Duration {
        Duration::from_secs(self.video_timeout_secs)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

/// Optional override where an empty value means "use the default".
fn get_non_blank(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn get_secs(key: &str, default: u64) -> Result<u64, AppError> {
    match env::var(key) {
        Ok(val) => {
            // Accept "60" as well as "60.0"; sub-second precision is not needed.
            let secs: f64 = val.trim().parse().map_err(|_| {
                AppError::ConfigError(anyhow::anyhow!("{} must be a number, got '{}'", key, val))
            })?;
            if !secs.is_finite() || secs <= 0.0 {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} must be positive, got '{}'",
                    key,
                    val
                )));
            }
            Ok(secs.ceil() as u64)
        }
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apiyi(base_url: &str) -> ApiyiConfig {
        ApiyiConfig {
            api_key: "key".to_string(),
            base_url: base_url.to_string(),
            image_path: "/v1/chat/completions".to_string(),
            image_timeout_secs: DEFAULT_IMAGE_TIMEOUT_SECS,
            video_submit_path: DEFAULT_VIDEO_SUBMIT_PATH.to_string(),
            video_timeout_secs: DEFAULT_VIDEO_TIMEOUT_SECS,
        }
    }

    #[test]
    fn urls_join_without_double_slashes() {
        let config = apiyi("https://api.apiyi.com/");
        assert_eq!(config.image_url(), "https://api.apiyi.com/v1/chat/completions");
        assert_eq!(
            config.video_submit_url(),
            "https://api.apiyi.com/veo/v1/api/video/submit"
        );
    }

    #[test]
    fn image_timeout_is_generous_by_default() {
        assert!(apiyi("http://x").image_timeout() >= Duration::from_secs(300));
    }
}
