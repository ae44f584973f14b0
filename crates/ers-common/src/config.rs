//! ---
//! ers_section: "01-core-functionality"
//! ers_subsection: "module"
//! ers_type: "source"
//! ers_scope: "code"
//! ers_description: "Shared primitives and utilities for the simulator runtime."
//! ers_version: "v0.1.0"
//! ers_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use tracing::debug;

use crate::logging::LogFormat;

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::StructuredJson
}

fn default_speedup() -> f64 {
    1.0
}

fn default_stop_timeout() -> Duration {
    Duration::from_millis(500)
}

fn default_autoplay() -> bool {
    true
}

fn default_output_every() -> u32 {
    1
}

/// Primary configuration object for the simulator runtime.
///
/// Scenario parameters (step size, delay length, smoothing factor, alarm
/// thresholds) are compiled in; this file covers pacing, logging and the
/// snapshot stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub driver: DriverConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Metadata describing where an [`AppConfig`] was loaded from.
///
/// `source` is `None` when no file was found and built-in defaults apply.
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    pub source: Option<PathBuf>,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &str = "ERS_CONFIG";

    /// Load configuration from disk, respecting the `ERS_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration from disk together with the effective source path.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        if let Some(loaded) = Self::try_load(candidates)? {
            return Ok(loaded);
        }
        Err(anyhow!(
            "no configuration files found. inspected: {}",
            candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }

    /// Same lookup as [`AppConfig::load_with_source`], falling back to the
    /// built-in defaults when no candidate exists.
    pub fn load_or_default<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        match Self::try_load(candidates)? {
            Some(loaded) => Ok(loaded),
            None => {
                debug!("no configuration file found; using built-in defaults");
                Ok(LoadedAppConfig {
                    config: AppConfig::default(),
                    source: None,
                })
            }
        }
    }

    fn try_load<P: AsRef<Path>>(candidates: &[P]) -> Result<Option<LoadedAppConfig>> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(&path)?;
                return Ok(Some(LoadedAppConfig {
                    config,
                    source: Some(path),
                }));
            }
        }

        for candidate in candidates {
            let path = candidate.as_ref();
            if path.exists() {
                let config = Self::from_path(path)?;
                return Ok(Some(LoadedAppConfig {
                    config,
                    source: Some(path.to_path_buf()),
                }));
            }
        }
        Ok(None)
    }

    fn from_path(path: &Path) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        let config = toml::from_str::<AppConfig>(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        self.driver.validate()?;
        self.output.validate()?;
        Ok(())
    }
}

impl std::str::FromStr for AppConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
    /// Also write a daily rolling JSON log under `directory`.
    #[serde(default)]
    pub file_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
            file_output: false,
        }
    }
}

/// Pacing of the scheduling loop that drives the simulation clock.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Wall-clock multiplier; 1.0 ticks once per simulated step duration.
    #[serde(default = "default_speedup")]
    pub speedup: f64,
    /// Upper bound on how long `reset` waits for the loop task to wind down.
    #[serde(default = "default_stop_timeout")]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub stop_timeout: Duration,
    #[serde(default = "default_autoplay")]
    pub autoplay: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            speedup: default_speedup(),
            stop_timeout: default_stop_timeout(),
            autoplay: default_autoplay(),
        }
    }
}

impl DriverConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.speedup.is_finite() || self.speedup <= 0.0 {
            return Err(anyhow!(
                "driver speedup must be a positive finite number, got {}",
                self.speedup
            ));
        }
        // One simulated second must map to a representable wall-clock span;
        // every tick step is shorter than that.
        self.tick_period(1.0)
            .with_context(|| format!("driver speedup {} is too small", self.speedup))?;
        Ok(())
    }

    /// Wall-clock period between ticks for a simulated step of `step_secs`.
    pub fn tick_period(&self, step_secs: f64) -> Result<Duration> {
        Duration::try_from_secs_f64(step_secs / self.speedup).map_err(|err| {
            anyhow!(
                "tick period {}s / {} is not a valid duration: {}",
                step_secs,
                self.speedup,
                err
            )
        })
    }
}

/// Snapshot stream format used by the CLI.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
    None,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "none" => Ok(OutputFormat::None),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Emit every Nth snapshot.
    #[serde(default = "default_output_every")]
    pub every: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            every: default_output_every(),
        }
    }
}

impl OutputConfig {
    pub fn validate(&self) -> Result<()> {
        if self.every == 0 {
            return Err(anyhow!("output.every must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn empty_document_yields_defaults() {
        let config: AppConfig = "".parse().unwrap();
        assert_eq!(config.driver.speedup, 1.0);
        assert_eq!(config.driver.stop_timeout, Duration::from_millis(500));
        assert!(config.driver.autoplay);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.output.every, 1);
        assert_eq!(config.logging.format, LogFormat::StructuredJson);
        assert!(!config.logging.file_output);
    }

    #[test]
    fn parses_all_sections() {
        let config: AppConfig = r#"
            [logging]
            directory = "/tmp/ers-logs"
            format = "pretty"
            file_output = true

            [driver]
            speedup = 4.0
            stop_timeout = 250
            autoplay = false

            [output]
            format = "csv"
            every = 10
        "#
        .parse()
        .unwrap();
        assert_eq!(config.logging.directory, PathBuf::from("/tmp/ers-logs"));
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.logging.file_output);
        assert_eq!(config.driver.speedup, 4.0);
        assert_eq!(config.driver.stop_timeout, Duration::from_millis(250));
        assert!(!config.driver.autoplay);
        assert_eq!(config.output.format, OutputFormat::Csv);
        assert_eq!(config.output.every, 10);
    }

    #[test]
    fn rejects_non_positive_speedup() {
        let err = "[driver]\nspeedup = 0.0\n".parse::<AppConfig>().unwrap_err();
        assert!(err.to_string().contains("speedup"));
        assert!("[driver]\nspeedup = -2.0\n".parse::<AppConfig>().is_err());
    }

    #[test]
    fn rejects_zero_output_stride() {
        assert!("[output]\nevery = 0\n".parse::<AppConfig>().is_err());
    }

    #[test]
    fn tick_period_scales_with_speedup() {
        let driver = DriverConfig {
            speedup: 10.0,
            ..DriverConfig::default()
        };
        assert_eq!(driver.tick_period(0.1).unwrap(), Duration::from_millis(10));
        assert_eq!(
            DriverConfig::default().tick_period(0.1).unwrap(),
            Duration::from_millis(100)
        );
    }

    #[test]
    fn rejects_speedup_with_unrepresentable_period() {
        let driver = DriverConfig {
            speedup: 1e-30,
            ..DriverConfig::default()
        };
        assert!(driver.tick_period(0.1).is_err());
        let err = driver.validate().unwrap_err();
        assert!(format!("{:#}", err).contains("too small"));
        assert!("[driver]\nspeedup = 1e-30\n".parse::<AppConfig>().is_err());
    }

    #[test]
    fn output_format_from_str() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("none".parse::<OutputFormat>().unwrap(), OutputFormat::None);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn load_with_source_reports_first_existing_candidate() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "[driver]\nspeedup = 2.5")?;
        file.flush()?;
        let missing = PathBuf::from("/definitely/not/here.toml");
        let loaded = AppConfig::load_with_source(&[missing, file.path().to_path_buf()])?;
        assert_eq!(loaded.source.as_deref(), Some(file.path()));
        assert_eq!(loaded.config.driver.speedup, 2.5);
        Ok(())
    }

    #[test]
    fn load_or_default_falls_back_without_candidates() -> Result<()> {
        let loaded = AppConfig::load_or_default(&[PathBuf::from("/definitely/not/here.toml")])?;
        if std::env::var(AppConfig::ENV_CONFIG_PATH).is_err() {
            assert!(loaded.source.is_none());
            assert_eq!(loaded.config.driver.speedup, 1.0);
        }
        Ok(())
    }

    #[test]
    fn invalid_file_is_reported_with_path() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "[output]\nevery = 0")?;
        file.flush()?;
        if std::env::var(AppConfig::ENV_CONFIG_PATH).is_ok() {
            return Ok(());
        }
        let err = AppConfig::load(&[file.path()]).unwrap_err();
        assert!(format!("{:#}", err).contains("every"));
        Ok(())
    }
}
