use std::{env, net::IpAddr, path::PathBuf, str::FromStr};

use dotenvy::dotenv;
use log::{debug, info, warn};
use serde::Deserialize;

use crate::errors::ConfigError;

// Server-specific configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub workers: usize,
}

// Application-specific configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub name: String,
    pub version: String,
    pub environment: Environment,
    pub log_level: String,
}

// Environment enum for different deployment environments
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Testing,
    Production,
}

// Implement FromStr trait for Environment enum to enable parsing from string
impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testing" | "test" => Ok(Environment::Testing),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(format!(
                "Invalid environment: {}. Must be one of: development, testing, production",
                s
            )),
        }
    }
}

// Result type for configuration functions
type ConfigResult<T> = Result<T, ConfigError>;

// Database config; `url` is optional - without it the service runs on the
// JSON file store alone
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_seconds: u64,
}

// Shortener behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ShortenerConfig {
    /// Base the public short URL is built from, e.g. `https://host/?s=`
    pub base_url: String,
    /// Length of generated codes and upper bound for aliases (1-12)
    pub max_length: usize,
    /// Reject plain-http target URLs
    pub enforce_https: bool,
    /// Records older than this many days are purged; 0 disables purging
    pub auto_purge_days: u32,
    /// Redirect status code, one of 301/302/307/308
    pub redirect_status: u16,
    /// Campaign tag appended to target URLs; None disables tagging
    pub utm_campaign: Option<String>,
    /// Location of the JSON fallback store
    pub store_path: PathBuf,
    /// Origins allowed to call the shorten API cross-origin
    pub cors_allowed_origins: Vec<String>,
}

// Config struct that matches our environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub app: AppConfig,
    pub db: DatabaseConfig,
    pub shortener: ShortenerConfig,
}

impl Config {
    // Load configuration from environment variables
    pub fn load() -> ConfigResult<Self> {
        // Load .env file if it exists
        match dotenv() {
            Ok(_) => debug!(".env file loaded successfully"),
            Err(e) => debug!("Could not load .env file: {}", e),
        }

        // Create the server config
        let server = ServerConfig {
            host: get_env_or_default("SERVER_HOST", "127.0.0.1")?,
            port: get_env_or_default("SERVER_PORT", "8000")?,
            workers: get_env_or_default("SERVER_WORKERS", "4")?,
        };

        // Get version from Cargo.toml or environment
        let version = option_env!("CARGO_PKG_VERSION")
            .unwrap_or("0.1.0")
            .to_string();

        // Create the app config
        let app = AppConfig {
            name: get_env_or_default("APP_NAME", "link-shortener")?,
            version: env::var("APP_VERSION").unwrap_or(version),
            environment: get_env_or_default("APP_ENVIRONMENT", "development")?,
            log_level: get_env_or_default("RUST_LOG", "info")?,
        };

        // Database config; an empty DATABASE_URL counts as unset
        let db = DatabaseConfig {
            url: env::var("DATABASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            max_connections: get_env_or_default("DATABASE_MAX_CONNECTIONS", "10")?,
            min_connections: get_env_or_default("DATABASE_MIN_CONNECTIONS", "5")?,
            connect_timeout_seconds: get_env_or_default("DATABASE_CONNECT_TIMEOUT_SECONDS", "5")?,
        };

        // Shortener config
        let shortener = ShortenerConfig {
            base_url: get_env_or_default("SHORTENER_BASE_URL", "http://localhost:8000/s")?,
            max_length: clamp_max_length(get_env_or_default("SHORTENER_MAX_LENGTH", "4")?),
            enforce_https: get_env_or_default("SHORTENER_ENFORCE_HTTPS", "false")?,
            auto_purge_days: get_env_or_default("SHORTENER_AUTO_PURGE_DAYS", "0")?,
            redirect_status: normalize_redirect_status(get_env_or_default(
                "SHORTENER_REDIRECT_STATUS",
                "302",
            )?),
            utm_campaign: env::var("SHORTENER_UTM_CAMPAIGN")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            store_path: get_env_or_default("SHORTENER_STORE_PATH", "data/short-links.json")?,
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|origin| origin.trim().to_string())
                        .filter(|origin| !origin.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        };

        let config = Config {
            db,
            app,
            server,
            shortener,
        };
        info!("Configuration loaded successfully");
        debug!("Loaded config: {:?}", config);

        Ok(config)
    }
}

/// Clamps the configured code length to the supported 1-12 range
fn clamp_max_length(value: usize) -> usize {
    if !(1..=12).contains(&value) {
        warn!(
            "SHORTENER_MAX_LENGTH {} out of range, clamping to 1-12",
            value
        );
    }
    value.clamp(1, 12)
}

/// Falls back to 302 for anything that is not a supported redirect status
fn normalize_redirect_status(value: u16) -> u16 {
    match value {
        301 | 302 | 307 | 308 => value,
        other => {
            warn!("SHORTENER_REDIRECT_STATUS {} unsupported, using 302", other);
            302
        }
    }
}

/// Helper function to get an env variable with a default value
fn get_env_or_default<T: std::str::FromStr>(key: &str, default: &str) -> ConfigResult<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| ConfigError::Parse(format!("Could not parse {}: {}", key, e))),
        Err(env::VarError::NotPresent) => {
            debug!("{} not set, using default: {}", key, default);
            default.parse::<T>().map_err(|e| {
                ConfigError::Parse(format!("Could not parse default for {}: {}", key, e))
            })
        }
        Err(e) => Err(ConfigError::EnvVar(e)),
    }
}
