// ABOUTME: Typed application configuration loaded from environment variables
// ABOUTME: Validates required settings and applies defaults for optional ones

pub mod constants;
mod duration;

use std::num::ParseIntError;
use std::str::FromStr;
use std::time::Duration;

use laundrylens_core::constants::{DEFAULT_CREDIT_PACK_SIZE, DEFAULT_QUOTA_UTC_OFFSET_HOURS};
use thiserror::Error;
use tracing::warn;

pub use duration::parse_duration;

use constants::*;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {source}")]
    InvalidNumber {
        name: &'static str,
        source: ParseIntError,
    },
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),
    #[error("Invalid environment: {0}")]
    InvalidEnvironment(String),
    #[error("Invalid value for {name}: {reason}")]
    OutOfRange { name: &'static str, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            _ => Err(ConfigError::InvalidEnvironment(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub environment: Environment,
    pub cors_origin: String,
    pub frontend_url: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

/// Client credentials registered with an OAuth provider
#[derive(Debug, Clone, Default)]
pub struct OAuthClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
}

impl OAuthClientConfig {
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct TossConfig {
    pub client_key: Option<String>,
    pub secret_key: Option<String>,
    pub api_url: String,
}

#[derive(Debug, Clone)]
pub struct BillingConfig {
    pub quota_utc_offset_hours: i32,
    pub credit_pack_size: i64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub kakao: OAuthClientConfig,
    pub google: OAuthClientConfig,
    pub openai: OpenAiConfig,
    pub toss: TossConfig,
    pub billing: BillingConfig,
    pub token_encryption_key: String,
}

impl Config {
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let port = match get(PORT) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|source| ConfigError::InvalidNumber { name: PORT, source })?,
            None => DEFAULT_PORT,
        };
        if port == 0 {
            return Err(ConfigError::PortOutOfRange(port));
        }

        let environment = match get(APP_ENV).or_else(|| get(NODE_ENV)) {
            Some(raw) => raw.parse()?,
            None => Environment::Development,
        };

        let frontend_url = get(FRONTEND_URL)
            .unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let cors_origin = get(CORS_ORIGIN).unwrap_or_else(|| frontend_url.clone());

        let max_connections = match get(DATABASE_MAX_CONNECTIONS) {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|source| ConfigError::InvalidNumber {
                    name: DATABASE_MAX_CONNECTIONS,
                    source,
                })?,
            None => DEFAULT_DATABASE_MAX_CONNECTIONS,
        };
        if max_connections == 0 {
            return Err(ConfigError::OutOfRange {
                name: DATABASE_MAX_CONNECTIONS,
                reason: "must be at least 1".to_string(),
            });
        }

        let jwt_secret = required(JWT_SECRET)?;
        let access_ttl = parse_duration(
            &get(JWT_EXPIRES_IN)
                .or_else(|| get(JWT_ACCESS_EXPIRES_IN))
                .unwrap_or_else(|| DEFAULT_JWT_EXPIRES_IN.to_string()),
        )?;
        let refresh_ttl = parse_duration(
            &get(JWT_REFRESH_EXPIRES_IN).unwrap_or_else(|| DEFAULT_JWT_REFRESH_EXPIRES_IN.to_string()),
        )?;
        if refresh_ttl < access_ttl {
            warn!("JWT refresh lifetime is shorter than the access token lifetime");
        }

        let kakao = OAuthClientConfig {
            client_id: get(KAKAO_CLIENT_ID).unwrap_or_default(),
            client_secret: get(KAKAO_CLIENT_SECRET).unwrap_or_default(),
            callback_url: get(KAKAO_CALLBACK_URL)
                .or_else(|| get(KAKAO_REDIRECT_URI))
                .unwrap_or_default(),
        };
        let google = OAuthClientConfig {
            client_id: get(GOOGLE_CLIENT_ID).unwrap_or_default(),
            client_secret: get(GOOGLE_CLIENT_SECRET).unwrap_or_default(),
            callback_url: get(GOOGLE_CALLBACK_URL)
                .or_else(|| get(GOOGLE_REDIRECT_URI))
                .unwrap_or_default(),
        };

        let openai = OpenAiConfig {
            api_key: get(OPENAI_API_KEY),
            model: get(OPENAI_MODEL).unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            base_url: get(OPENAI_BASE_URL)
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        };
        if openai.api_key.is_none() {
            warn!("OPENAI_API_KEY not set - image analysis will be unavailable");
        }

        let toss = TossConfig {
            client_key: get(TOSS_CLIENT_KEY),
            secret_key: get(TOSS_SECRET_KEY),
            api_url: get(TOSS_API_URL)
                .unwrap_or_else(|| DEFAULT_TOSS_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        };

        let quota_utc_offset_hours = match get(QUOTA_UTC_OFFSET_HOURS) {
            Some(raw) => {
                let hours = raw.trim().parse::<i32>().map_err(|source| {
                    ConfigError::InvalidNumber {
                        name: QUOTA_UTC_OFFSET_HOURS,
                        source,
                    }
                })?;
                if !(-12..=14).contains(&hours) {
                    return Err(ConfigError::OutOfRange {
                        name: QUOTA_UTC_OFFSET_HOURS,
                        reason: format!("{} is not between -12 and 14", hours),
                    });
                }
                hours
            }
            None => DEFAULT_QUOTA_UTC_OFFSET_HOURS,
        };

        let credit_pack_size = match get(CREDIT_PACK_SIZE) {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .map_err(|source| ConfigError::InvalidNumber {
                    name: CREDIT_PACK_SIZE,
                    source,
                })?,
            None => DEFAULT_CREDIT_PACK_SIZE,
        };
        if credit_pack_size < 1 {
            return Err(ConfigError::OutOfRange {
                name: CREDIT_PACK_SIZE,
                reason: "must be at least 1".to_string(),
            });
        }

        let token_encryption_key = get(TOKEN_ENCRYPTION_KEY).unwrap_or_else(|| jwt_secret.clone());

        Ok(Config {
            server: ServerConfig {
                port,
                environment,
                cors_origin,
                frontend_url,
            },
            database: DatabaseConfig {
                url: required(DATABASE_URL)?,
                max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                access_ttl,
                refresh_ttl,
            },
            kakao,
            google,
            openai,
            toss,
            billing: BillingConfig {
                quota_utc_offset_hours,
                credit_pack_size,
            },
            token_encryption_key,
        })
    }
}
