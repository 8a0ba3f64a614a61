use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::training::GatewayBuildError;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Gateway(GatewayBuildError),
    Input {
        path: PathBuf,
        source: serde_json::Error,
    },
    Output(serde_json::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Gateway(err) => write!(f, "gateway error: {}", err),
            AppError::Input { path, source } => {
                write!(f, "could not read form file {}: {}", path.display(), source)
            }
            AppError::Output(err) => write!(f, "could not render output: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Gateway(err) => Some(err),
            AppError::Input { source, .. } => Some(source),
            AppError::Output(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<GatewayBuildError> for AppError {
    fn from(value: GatewayBuildError) -> Self {
        Self::Gateway(value)
    }
}
