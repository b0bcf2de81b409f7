//! Configuration loading.
//!
//! A TOML file, overlaid with `AD_RESOURCE_*` environment variables:
//!
//! ```toml
//! platform = "facebook"
//! access_token = "EAAB..."
//! api_version = "11.0"
//!
//! [policy]
//! strict_associations = false
//! strict_pagination = true
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::framework::Policy;
use crate::platform::Platform;

pub const ENV_PLATFORM: &str = "AD_RESOURCE_PLATFORM";
pub const ENV_ACCESS_TOKEN: &str = "AD_RESOURCE_ACCESS_TOKEN";
pub const ENV_APP_ID: &str = "AD_RESOURCE_APP_ID";
pub const ENV_APP_SECRET: &str = "AD_RESOURCE_APP_SECRET";
pub const ENV_API_VERSION: &str = "AD_RESOURCE_API_VERSION";

/// Errors raised while loading configuration or connecting with it.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`Config`].
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown platform: {0}")]
    UnknownPlatform(String),

    /// A credential the platform needs is not configured.
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub platform: Platform,
    pub access_token: Option<String>,
    pub app_id: Option<String>,
    pub app_secret: Option<String>,
    pub api_version: Option<String>,
    pub policy: Policy,
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Overlays the `AD_RESOURCE_*` variables of the process environment.
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Overlays values from `lookup`; empty values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(platform) = get(ENV_PLATFORM) {
            self.platform = platform.parse()?;
        }
        if let Some(token) = get(ENV_ACCESS_TOKEN) {
            self.access_token = Some(token);
        }
        if let Some(app_id) = get(ENV_APP_ID) {
            self.app_id = Some(app_id);
        }
        if let Some(app_secret) = get(ENV_APP_SECRET) {
            self.app_secret = Some(app_secret);
        }
        if let Some(api_version) = get(ENV_API_VERSION) {
            self.api_version = Some(api_version);
        }
        Ok(self)
    }
}

/// Reads `path` and overlays the environment.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Config::from_toml(&content)?.with_env()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_full_file() {
        let config = Config::from_toml(
            r#"
            platform = "facebook"
            access_token = "token"
            api_version = "12.0"

            [policy]
            strict_associations = true
            "#,
        )
        .unwrap();

        assert_eq!(config.platform, Platform::Facebook);
        assert_eq!(config.access_token.as_deref(), Some("token"));
        assert_eq!(config.api_version.as_deref(), Some("12.0"));
        assert!(config.policy.strict_associations);
        assert!(config.policy.strict_pagination);
    }

    #[test]
    fn test_unknown_platform_in_file() {
        let result = Config::from_toml(r#"platform = "myspace""#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_environment_overrides_file() {
        let env = HashMap::from([(ENV_ACCESS_TOKEN, "from-env"), (ENV_APP_ID, "")]);
        let config = Config::from_toml(r#"access_token = "from-file""#)
            .unwrap()
            .with_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.access_token.as_deref(), Some("from-env"));
        assert_eq!(config.app_id, None);
    }

    #[test]
    fn test_unknown_platform_in_environment() {
        let result = Config::default().with_overrides(|key| (key == ENV_PLATFORM).then(|| "myspace".to_string()));
        assert!(matches!(result, Err(ConfigError::UnknownPlatform(p)) if p == "myspace"));
    }

    #[test]
    fn test_missing_file() {
        let result = load_config("/nonexistent/ad-resource.toml");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
