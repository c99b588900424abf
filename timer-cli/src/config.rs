//! Configuration loading from timer.toml
//!
//! The configuration is read from the file named by `TIMER_CONFIG`, or
//! discovered by walking up from the current directory to the first
//! `timer.toml`.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File name searched for during discovery
pub const CONFIG_FILE_NAME: &str = "timer.toml";

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "TIMER_CONFIG";

/// Timer configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TimerConfig {
    /// Report output configuration
    #[serde(default)]
    pub report: ReportConfig,
    /// Additional named templates for `--preset`
    #[serde(default)]
    pub presets: BTreeMap<String, String>,
}

/// Where the rendered report is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ReportStream {
    /// Standard output (default)
    #[default]
    Stdout,
    /// Standard error, keeping the child's stdout clean
    Stderr,
}

/// Report output configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReportConfig {
    /// Template replacing the built-in default
    #[serde(default)]
    pub format: Option<String>,
    /// Report destination: "stdout" or "stderr"
    #[serde(default)]
    pub stream: ReportStream,
}

impl TimerConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))?;
        Ok(config)
    }

    /// Locate the configuration file, if any
    pub fn locate() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Some(PathBuf::from(path));
        }

        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                return Some(config_path);
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Discover and load the configuration; a broken file is logged and ignored
    pub fn discover() -> Option<Self> {
        let path = Self::locate()?;
        match Self::load(&path) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "loaded configuration");
                Some(config)
            }
            Err(e) => {
                tracing::warn!("ignoring configuration: {:#}", e);
                None
            }
        }
    }

    /// Template source of a configuration-defined preset
    pub fn preset(&self, name: &str) -> Option<&str> {
        self.presets.get(name).map(String::as_str)
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# timer configuration

[report]
# Template replacing the built-in default (uncomment to enable)
# format = "real %r user %u sys %s\n"
# Report destination: "stdout" or "stderr"
stream = "stdout"

[presets]
# Named templates usable with --preset NAME
# brief = "%r\n"
# machine = "%mr %mu %ms %mR\n"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TimerConfig::default();
        assert_eq!(config.report.format, None);
        assert_eq!(config.report.stream, ReportStream::Stdout);
        assert!(config.presets.is_empty());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [report]
            stream = "stderr"

            [presets]
            brief = "%r\n"
        "#;

        let config: TimerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.report.stream, ReportStream::Stderr);
        assert_eq!(config.preset("brief"), Some("%r\n"));
        assert_eq!(config.preset("missing"), None);
        // Defaults should still apply
        assert_eq!(config.report.format, None);
    }

    #[test]
    fn test_default_toml_parses() {
        let config: TimerConfig = toml::from_str(&TimerConfig::default_toml()).unwrap();
        assert_eq!(config.report.stream, ReportStream::Stdout);
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[report]\nstream = 42\n").unwrap();

        let err = TimerConfig::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("timer.toml"));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[report]\nformat = \"%mr\\n\"\n").unwrap();

        let config = TimerConfig::load(&path).unwrap();
        assert_eq!(config.report.format.as_deref(), Some("%mr\n"));
    }
}
