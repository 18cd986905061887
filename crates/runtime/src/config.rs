//! Runtime configuration
//!
//! Settings come from an optional TOML file and are then overridden by
//! environment variables:
//!
//! ```toml
//! log = "kiln=debug"      # or KILN_LOG
//! report = "human"        # off | human | json, or KILN_REPORT
//! stack_size_kib = 512    # run the toplevel on a thread with this stack
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const LOG_ENV: &str = "KILN_LOG";
pub const REPORT_ENV: &str = "KILN_REPORT";

/// Filter used when neither the environment nor the config file sets one
pub const DEFAULT_LOG_FILTER: &str = "kiln=warn";

/// At-exit report format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    #[default]
    Off,
    Human,
    Json,
}

impl FromStr for ReportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "off" | "0" => Ok(ReportMode::Off),
            "human" | "1" => Ok(ReportMode::Human),
            "json" => Ok(ReportMode::Json),
            other => Err(format!(
                "unknown report mode '{}' (expected off, human or json)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Tracing filter directive
    pub log: Option<String>,
    pub report: ReportMode,
    /// Native stack size for the toplevel thread, in KiB
    pub stack_size_kib: Option<usize>,
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
    InvalidEnv {
        var: &'static str,
        message: String,
    },
    /// `stack_size_kib` does not fit in a byte count
    StackSizeOverflow {
        kib: usize,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read config {}: {}", path.display(), source)
            }
            ConfigError::Parse(e) => write!(f, "invalid config: {}", e),
            ConfigError::InvalidEnv { var, message } => write!(f, "{}: {}", var, message),
            ConfigError::StackSizeOverflow { kib } => {
                write!(f, "stack size of {} KiB is too large", kib)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(e) => Some(e),
            ConfigError::InvalidEnv { .. } | ConfigError::StackSizeOverflow { .. } => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl RuntimeConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load the optional file, then apply the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.with_env(|var| std::env::var(var).ok())?;
        config.stack_size_bytes()?;
        Ok(config)
    }

    /// Apply environment overrides read through `lookup`
    pub fn with_env(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(filter) = lookup(LOG_ENV).filter(|f| !f.is_empty()) {
            self.log = Some(filter);
        }
        if let Some(mode) = lookup(REPORT_ENV) {
            self.report = mode
                .parse()
                .map_err(|message| ConfigError::InvalidEnv {
                    var: REPORT_ENV,
                    message,
                })?;
        }
        Ok(self)
    }

    /// Requested toplevel stack size in bytes, if any
    pub fn stack_size_bytes(&self) -> Result<Option<usize>, ConfigError> {
        match self.stack_size_kib {
            None => Ok(None),
            Some(kib) => kib
                .checked_mul(1024)
                .map(Some)
                .ok_or(ConfigError::StackSizeOverflow { kib }),
        }
    }

    /// Effective tracing filter directive
    pub fn log_filter(&self) -> &str {
        self.log.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::from_toml_str("").unwrap();
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.report, ReportMode::Off);
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_parse_all_fields() {
        let config = RuntimeConfig::from_toml_str(
            "log = \"kiln=trace\"\nreport = \"json\"\nstack_size_kib = 256\n",
        )
        .unwrap();
        assert_eq!(config.log_filter(), "kiln=trace");
        assert_eq!(config.report, ReportMode::Json);
        assert_eq!(config.stack_size_kib, Some(256));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = RuntimeConfig::from_toml_str("colour = true").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("colour"));
    }

    #[test]
    fn test_env_overrides_file() {
        let config = RuntimeConfig::from_toml_str("log = \"kiln=info\"\nreport = \"human\"")
            .unwrap()
            .with_env(env(&[(LOG_ENV, "kiln=debug"), (REPORT_ENV, "json")]))
            .unwrap();
        assert_eq!(config.log_filter(), "kiln=debug");
        assert_eq!(config.report, ReportMode::Json);
    }

    #[test]
    fn test_empty_log_env_is_ignored() {
        let config = RuntimeConfig::default()
            .with_env(env(&[(LOG_ENV, "")]))
            .unwrap();
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_bad_report_env() {
        let err = RuntimeConfig::default()
            .with_env(env(&[(REPORT_ENV, "loud")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: REPORT_ENV, .. }));
        assert!(err.to_string().contains("loud"));
    }

    #[test]
    fn test_stack_size_bytes() {
        assert_eq!(RuntimeConfig::default().stack_size_bytes().unwrap(), None);
        let config = RuntimeConfig::from_toml_str("stack_size_kib = 256").unwrap();
        assert_eq!(config.stack_size_bytes().unwrap(), Some(256 * 1024));
    }

    #[test]
    fn test_stack_size_overflow_rejected() {
        let config = RuntimeConfig {
            stack_size_kib: Some(usize::MAX),
            ..RuntimeConfig::default()
        };
        let err = config.stack_size_bytes().unwrap_err();
        assert!(matches!(err, ConfigError::StackSizeOverflow { kib } if kib == usize::MAX));
        assert!(err.to_string().contains("too large"));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "stack_size_kib = {}", usize::MAX / 512).unwrap();
        assert!(matches!(
            RuntimeConfig::load(Some(file.path())),
            Err(ConfigError::StackSizeOverflow { .. })
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "report = \"human\"").unwrap();
        let config = RuntimeConfig::from_file(file.path()).unwrap();
        assert_eq!(config.report, ReportMode::Human);

        let missing = file.path().with_extension("missing");
        assert!(matches!(
            RuntimeConfig::from_file(&missing),
            Err(ConfigError::Io { .. })
        ));
    }
}
