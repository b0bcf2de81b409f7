//! Supported ad platforms and how to connect to them.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;

use crate::config::{Config, ConfigError};
use crate::facebook;
use crate::framework::{Client, ResourceError, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Platform {
    #[default]
    Facebook,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Facebook => "facebook",
        }
    }

    /// Builds a client for this platform from `config`. The access token is
    /// required.
    pub fn connect(&self, config: &Config, transport: Arc<dyn Transport>) -> Result<Client, ConfigError> {
        let token = config
            .access_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingCredential("access_token"))?;
        Ok(self.anonymous(config, transport).with_access_token(token))
    }

    /// Builds a client by exchanging `short_lived_token` for a long-lived one
    /// with the configured app credentials.
    pub async fn login(
        &self,
        config: &Config,
        transport: Arc<dyn Transport>,
        short_lived_token: &str,
    ) -> Result<Client, ResourceError> {
        let client = self.anonymous(config, transport);
        match self {
            Platform::Facebook => {
                facebook::login(
                    &client,
                    config.app_id.as_deref().unwrap_or_default(),
                    config.app_secret.as_deref().unwrap_or_default(),
                    short_lived_token,
                )
                .await
            }
        }
    }

    fn anonymous(&self, config: &Config, transport: Arc<dyn Transport>) -> Client {
        match self {
            Platform::Facebook => {
                let version = config.api_version.as_deref().unwrap_or(facebook::API_VERSION);
                Client::new(transport, facebook::base_url(version))
                    .with_api_version(version)
                    .with_policy(config.policy)
            }
        }
    }
}

impl FromStr for Platform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "facebook" => Ok(Platform::Facebook),
            _ => Err(ConfigError::UnknownPlatform(s.to_string())),
        }
    }
}

impl TryFrom<String> for Platform {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
