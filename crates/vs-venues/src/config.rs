use std::time::Duration;

use derive_builder::{Builder, UninitializedFieldError};
use reqwest::Url;

use crate::{constants::*, error::ConfigError};

/// How often an in-flight request consults the cancellation flag.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Connection details for the venue API. Values are opaque and supplied by the host.
#[derive(Builder, Clone, Debug, PartialEq)]
#[builder(build_fn(validate = "Self::validate", error = "ConfigError"))]
pub struct Config {
    #[builder(setter(into), default = "DEFAULT_API_ROOT.to_string()")]
    pub api_root: String,
    #[builder(setter(into), default = "DEFAULT_USER_AGENT.to_string()")]
    pub user_agent: String,
    #[builder(setter(into))]
    pub access_token: String,
    #[builder(default = "DEFAULT_POLL_INTERVAL")]
    pub poll_interval: Duration,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub(crate) fn api_root_url(&self) -> Result<Url, ConfigError> {
        parse_api_root(&self.api_root)
    }
}

impl ConfigBuilder {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(api_root) = &self.api_root {
            parse_api_root(api_root)?;
        }
        if let Some(token) = &self.access_token {
            if token.trim().is_empty() {
                return Err(ConfigError::MissingAccessToken);
            }
        }
        if let Some(user_agent) = &self.user_agent {
            if user_agent.trim().is_empty() {
                return Err(ConfigError::MissingUserAgent);
            }
        }
        Ok(())
    }
}

impl From<UninitializedFieldError> for ConfigError {
    fn from(error: UninitializedFieldError) -> Self {
        match error.field_name() {
            "access_token" => ConfigError::MissingAccessToken,
            field => ConfigError::Incomplete(field.to_string()),
        }
    }
}

fn parse_api_root(api_root: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(api_root).map_err(|_| ConfigError::InvalidApiRoot(api_root.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidApiRoot(api_root.to_string()));
    }
    Ok(url)
}
