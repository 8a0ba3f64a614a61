use std::env;
use std::fmt;
use std::time::Duration;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_FRONTEND_URL: &str = "http://localhost:4200";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Distinguishes runtime behavior for different stages of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub api: ApiConfig,
    pub frontend: FrontendConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let base_url = parse_http_url(
            "TRAINING_API_BASE_URL",
            &env::var("TRAINING_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
        )?;

        let token = env::var("TRAINING_API_TOKEN")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let timeout_secs = env::var("TRAINING_API_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(ConfigError::InvalidTimeout)?;

        let frontend_url = parse_http_url(
            "TRAINING_FRONTEND_URL",
            &env::var("TRAINING_FRONTEND_URL")
                .unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_string()),
        )?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            api: ApiConfig {
                base_url,
                token,
                timeout: Duration::from_secs(timeout_secs),
            },
            frontend: FrontendConfig {
                base_url: frontend_url,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Connection settings for the training backend.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl ApiConfig {
    /// Replace the configured base URL, applying the same validation as `load`.
    pub fn override_base_url(&mut self, raw: &str) -> Result<(), ConfigError> {
        self.base_url = parse_http_url("--api-base-url", raw)?;
        Ok(())
    }
}

/// Origin of the web front end; redirect destinations are resolved against it.
#[derive(Debug, Clone)]
pub struct FrontendConfig {
    pub base_url: Url,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

fn parse_http_url(variable: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl {
        variable,
        value: raw.to_string(),
        source,
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::UnsupportedScheme {
            variable,
            value: raw.to_string(),
        }),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidUrl {
        variable: &'static str,
        value: String,
        source: url::ParseError,
    },
    UnsupportedScheme {
        variable: &'static str,
        value: String,
    },
    InvalidTimeout,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidUrl {
                variable, value, ..
            } => write!(f, "{variable} must be an absolute URL (found '{value}')"),
            ConfigError::UnsupportedScheme { variable, value } => {
                write!(f, "{variable} must use http or https (found '{value}')")
            }
            ConfigError::InvalidTimeout => {
                write!(f, "TRAINING_API_TIMEOUT_SECS must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidUrl { source, .. } => Some(source),
            ConfigError::UnsupportedScheme { .. } | ConfigError::InvalidTimeout => None,
        }
    }
}
