//! Construction-time configuration for `CatalogWrapper`.

use std::time::Duration;

use catalog_core::{ApiError, Credential, Endpoint, Region, Result};

pub const ENV_ACCESS_KEY: &str = "CATALOG_ACCESS_KEY";
pub const ENV_SECRET_KEY: &str = "CATALOG_SECRET_KEY";
pub const ENV_ASSOCIATE_TAG: &str = "CATALOG_ASSOCIATE_TAG";
pub const ENV_ENDPOINT: &str = "CATALOG_ENDPOINT";
pub const ENV_USER_AGENT: &str = "CATALOG_USER_AGENT";
pub const ENV_TIMEOUT_SECS: &str = "CATALOG_TIMEOUT_SECS";

/// Everything a wrapper needs, fixed for its lifetime.
///
/// No timeout is applied unless one is set here; callers can also bound a
/// single call with their own deadline.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub credential: Credential,
    pub endpoint: Endpoint,
    pub user_agent: Option<String>,
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(credential: Credential, endpoint: impl Into<Endpoint>) -> Self {
        Self {
            credential,
            endpoint: endpoint.into(),
            user_agent: None,
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Reads the `CATALOG_*` environment variables.
    ///
    /// `CATALOG_ENDPOINT` takes a region code (`us`, `de`, ...) or a base URL
    /// and defaults to `us`.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` when a key is missing or a value does not parse.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &str| {
            get(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ApiError::InvalidConfiguration(format!("{name} is not set")))
        };

        let mut credential = Credential::new(required(ENV_ACCESS_KEY)?, required(ENV_SECRET_KEY)?);
        if let Some(tag) = get(ENV_ASSOCIATE_TAG).filter(|t| !t.is_empty()) {
            credential = credential.with_associate_tag(tag);
        }

        let endpoint = match get(ENV_ENDPOINT) {
            None => Endpoint::region(Region::Us),
            Some(value) => match Region::from_code(&value) {
                Some(region) => Endpoint::region(region),
                None => Endpoint::parse(&value)?,
            },
        };

        let mut config = Self::new(credential, endpoint);
        if let Some(user_agent) = get(ENV_USER_AGENT) {
            config = config.with_user_agent(user_agent);
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs
                .parse()
                .map_err(|e| ApiError::InvalidConfiguration(format!("{ENV_TIMEOUT_SECS}={secs:?}: {e}")))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}
