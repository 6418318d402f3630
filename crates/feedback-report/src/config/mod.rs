use crate::workflows::feedback::{AnalysisConfig, MissingLabelPolicy, SatisfactionFormula, SegmentKey};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
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
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub analysis: AnalysisConfig,
    pub classifier: ClassifierConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;
        let retention_secs = parse_number("APP_TASK_RETENTION_SECS", 1800)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let formula = parse_var("FEEDBACK_FORMULA", SatisfactionFormula::NetPromoter)?;
        let missing_label = parse_var("FEEDBACK_MISSING_LABEL", MissingLabelPolicy::Neutral)?;
        let segment_key = parse_var("FEEDBACK_SEGMENT_KEY", SegmentKey::Area)?;

        let endpoint = env::var("FEEDBACK_CLASSIFIER_URL")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        let token = env::var("FEEDBACK_CLASSIFIER_TOKEN")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let timeout_secs = parse_number("FEEDBACK_CLASSIFIER_TIMEOUT_SECS", 30)?;
        let max_chars = parse_number("FEEDBACK_CLASSIFIER_MAX_CHARS", 512)?;
        let batch_size = parse_number("FEEDBACK_CLASSIFIER_BATCH", 32)?;

        Ok(Self {
            environment,
            server: ServerConfig {
                host,
                port,
                task_retention: Duration::from_secs(retention_secs as u64),
            },
            telemetry: TelemetryConfig { log_level },
            analysis: AnalysisConfig {
                formula,
                missing_label,
                segment_key,
                ..AnalysisConfig::default()
            },
            classifier: ClassifierConfig {
                endpoint,
                token,
                timeout: Duration::from_secs(timeout_secs as u64),
                max_chars,
                batch_size: batch_size.max(1),
            },
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { name, value: raw }),
        _ => Ok(default),
    }
}

fn parse_number(name: &'static str, default: usize) -> Result<usize, ConfigError> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<usize>()
            .map_err(|_| ConfigError::InvalidValue { name, value: raw }),
        _ => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// How long finished analysis tasks stay pollable.
    pub task_retention: Duration,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Connection settings for the external sentiment classifier.
///
/// A missing endpoint puts the resolver in fallback-only mode for every run.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub endpoint: Option<String>,
    pub token: Option<String>,
    pub timeout: Duration,
    pub max_chars: usize,
    pub batch_size: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            token: None,
            timeout: Duration::from_secs(30),
            max_chars: 512,
            batch_size: 32,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidValue { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidValue { name, value } => {
                write!(f, "{name} has an unsupported value '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidValue { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

/// Serializes tests that read or write process environment variables.
#[cfg(test)]
pub(crate) fn env_guard() -> &'static std::sync::Mutex<()> {
    static GUARD: std::sync::OnceLock<std::sync::Mutex<()>> = std::sync::OnceLock::new();
    GUARD.get_or_init(|| std::sync::Mutex::new(()))
}
