//! Client configuration: credentials and the API base URL.

use std::fmt;

use crate::error::ConfigError;

/// Default Helix API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.twitch.tv";

pub const ENV_CLIENT_ID: &str = "HELIX_CLIENT_ID";
pub const ENV_TOKEN: &str = "HELIX_TOKEN";
pub const ENV_BASE_URL: &str = "HELIX_BASE_URL";

/// Validated client configuration.
#[derive(Clone)]
pub struct HelixConfig {
    client_id: String,
    token: Option<String>,
    base_url: String,
}

impl HelixConfig {
    pub fn builder(client_id: impl Into<String>) -> HelixConfigBuilder {
        HelixConfigBuilder {
            client_id: client_id.into(),
            token: None,
            base_url: None,
        }
    }

    /// Load configuration from `HELIX_CLIENT_ID`, `HELIX_TOKEN` and
    /// `HELIX_BASE_URL`. Only the client id is required.
    pub fn from_env() -> Result<Self, ConfigError> {
        let client_id = std::env::var(ENV_CLIENT_ID).map_err(|source| match source {
            std::env::VarError::NotPresent => ConfigError::MissingClientId,
            source => ConfigError::Env {
                name: ENV_CLIENT_ID,
                source,
            },
        })?;

        let mut builder = Self::builder(client_id);
        if let Some(token) = optional_var(ENV_TOKEN)? {
            builder = builder.token(token);
        }
        if let Some(base_url) = optional_var(ENV_BASE_URL)? {
            builder = builder.base_url(base_url);
        }
        builder.build()
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Headers sent with every call: the client id, a JSON content type and,
    /// when a token is configured, a bearer authorization header.
    pub fn base_headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![
            ("Client-ID".to_string(), self.client_id.clone()),
            ("Content-Type".to_string(), "application/json".to_string()),
        ];
        if let Some(token) = &self.token {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        headers
    }
}

impl fmt::Debug for HelixConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelixConfig")
            .field("client_id", &self.client_id)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn optional_var(name: &'static str) -> Result<Option<String>, ConfigError> {
    match std::env::var(name) {
        Ok(value) if value.is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(source) => Err(ConfigError::Env { name, source }),
    }
}

/// Builder for [`HelixConfig`].
#[derive(Debug, Clone)]
pub struct HelixConfigBuilder {
    client_id: String,
    token: Option<String>,
    base_url: Option<String>,
}

impl HelixConfigBuilder {
    /// OAuth access token, sent as `Authorization: Bearer <token>`.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn build(self) -> Result<HelixConfig, ConfigError> {
        if self.client_id.is_empty() {
            return Err(ConfigError::MissingClientId);
        }
        let base_url = match self.base_url {
            Some(url) => validate_base_url(&url)?,
            None => DEFAULT_BASE_URL.to_string(),
        };
        Ok(HelixConfig {
            client_id: self.client_id,
            token: self.token.filter(|t| !t.is_empty()),
            base_url,
        })
    }
}

/// Check that `url` is an absolute http(s) URL and strip trailing slashes.
pub(crate) fn validate_base_url(url: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        url: url.to_string(),
        reason,
    };
    let parsed = url::Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", parsed.scheme())));
    }
    if parsed.query().is_some() {
        return Err(invalid("base url must not carry a query".to_string()));
    }
    Ok(url.trim_end_matches('/').to_string())
}
