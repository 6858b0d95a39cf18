//! Configuration management
//!
//! Everything the pipeline needs from the environment is read once into a
//! [`Config`] and passed down by reference. Required values are validated
//! eagerly so a missing credential fails at startup rather than as a
//! confusing connection error later.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Default listing endpoint.
pub const DEFAULT_LISTING_URL: &str = "https://real-time-amazon-data.p.rapidapi.com/best-sellers";

/// Default value of the `x-rapidapi-host` header.
pub const DEFAULT_API_HOST: &str = "real-time-amazon-data.p.rapidapi.com";

/// Default HTTP request deadline in seconds.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

/// Default PostgreSQL port.
pub const DEFAULT_DATABASE_PORT: u16 = 5432;

/// Default database connect timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default listing query values.
pub const DEFAULT_CATEGORY: &str = "videogames";
pub const DEFAULT_LISTING_TYPE: &str = "BEST_SELLERS";
pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_COUNTRY: &str = "US";

/// Configuration errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Required environment variable {0} is missing or empty")]
    Missing(&'static str),

    #[error("Invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
}

/// Listing API access
#[derive(Clone)]
pub struct ApiConfig {
    pub listing_url: String,
    pub api_key: String,
    pub api_host: String,
    pub timeout_secs: u64,
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("listing_url", &self.listing_url)
            .field("api_key", &"<redacted>")
            .field("api_host", &self.api_host)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Load only the listing API settings, for commands that never touch the database
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|name| std::env::var(name).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = ApiConfig {
            listing_url: lookup("LISTING_URL").unwrap_or_else(|| DEFAULT_LISTING_URL.to_string()),
            api_key: required(&lookup, "RAPIDAPI_KEY")?,
            api_host: lookup("RAPIDAPI_HOST").unwrap_or_else(|| DEFAULT_API_HOST.to_string()),
            timeout_secs: parse_or(&lookup, "API_TIMEOUT_SECS", DEFAULT_API_TIMEOUT_SECS)?,
        };

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "API_TIMEOUT_SECS",
                value: "0".to_string(),
            });
        }

        if reqwest::Url::parse(&self.listing_url).is_err() {
            return Err(ConfigError::Invalid {
                name: "LISTING_URL",
                value: self.listing_url.clone(),
            });
        }

        Ok(())
    }
}

/// Database connection settings
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub connect_timeout_secs: u64,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl DatabaseConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = DatabaseConfig {
            host: required(&lookup, "DATABASE_HOST")?,
            port: parse_or(&lookup, "DATABASE_PORT", DEFAULT_DATABASE_PORT)?,
            user: required(&lookup, "DATABASE_USER")?,
            password: required(&lookup, "DATABASE_PASSWORD")?,
            name: required(&lookup, "DATABASE_NAME")?,
            connect_timeout_secs: parse_or(
                &lookup,
                "DATABASE_CONNECT_TIMEOUT",
                DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
            )?,
        };

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "DATABASE_CONNECT_TIMEOUT",
                value: "0".to_string(),
            });
        }

        Ok(())
    }
}

impl Config {
    /// Load configuration from `.env` (if present) and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Config {
            api: ApiConfig::from_vars(&lookup)?,
            database: DatabaseConfig::from_vars(&lookup)?,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api.validate()?;
        self.database.validate()
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

/// Query parameters for one listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    pub category: String,
    pub listing_type: String,
    pub page: u32,
    pub country: String,
}

impl Default for ListingRequest {
    fn default() -> Self {
        Self {
            category: DEFAULT_CATEGORY.to_string(),
            listing_type: DEFAULT_LISTING_TYPE.to_string(),
            page: DEFAULT_PAGE,
            country: DEFAULT_COUNTRY.to_string(),
        }
    }
}

impl ListingRequest {
    /// Query string pairs in the order the API documents them
    pub fn query_pairs(&self) -> [(&'static str, String); 4] {
        [
            ("category", self.category.clone()),
            ("type", self.listing_type.clone()),
            ("page", self.page.to_string()),
            ("country", self.country.clone()),
        ]
    }
}
