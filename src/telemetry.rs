use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
pub enum TelemetryError {
    Filter { value: String, source: ParseError },
    AlreadyInstalled(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::Filter { value, .. } => {
                write!(f, "invalid log filter '{value}' in APP_LOG_LEVEL")
            }
            TelemetryError::AlreadyInstalled(err) => {
                write!(f, "tracing subscriber could not be installed: {err}")
            }
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::Filter { source, .. } => Some(source),
            TelemetryError::AlreadyInstalled(err) => Some(&**err),
        }
    }
}

/// HTTP client internals that drown out submission events below `warn`.
const QUIET_TARGETS: [&str; 3] = ["hyper", "hyper_util", "reqwest"];

/// `APP_LOG_LEVEL` plus a `warn` ceiling for the HTTP client stack, unless the level
/// already names one of those targets.
fn default_directives(log_level: &str) -> String {
    let mut directives: Vec<String> = log_level
        .split(',')
        .map(str::trim)
        .filter(|directive| !directive.is_empty())
        .map(str::to_string)
        .collect();

    for target in QUIET_TARGETS {
        let named = directives
            .iter()
            .any(|directive| directive.split('=').next() == Some(target));
        if !named {
            directives.push(format!("{target}=warn"));
        }
    }
    directives.join(",")
}

/// Install the process-wide subscriber. `RUST_LOG` wins over `APP_LOG_LEVEL`; events go to
/// stderr so command output on stdout stays machine readable.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directives(&config.log_level)).map_err(|source| {
            TelemetryError::Filter {
                value: config.log_level.clone(),
                source,
            }
        })?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::AlreadyInstalled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_targets_are_capped_at_warn() {
        assert_eq!(
            default_directives("debug"),
            "debug,hyper=warn,hyper_util=warn,reqwest=warn"
        );
    }

    #[test]
    fn explicit_client_directives_are_left_alone() {
        assert_eq!(
            default_directives("info,hyper_util=debug"),
            "info,hyper_util=debug,hyper=warn,reqwest=warn"
        );
    }
}
