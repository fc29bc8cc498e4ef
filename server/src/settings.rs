use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use config::{Config, Environment, File as ConfigFile};

pub const DEFAULT_CONFIG_PATH: &str = "config/soilscope.toml";
pub const ENV_PREFIX: &str = "SOILSCOPE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Plain,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "plain" => Ok(LogFormat::Plain),
            other => anyhow::bail!("Unsupported log_format '{other}' (expected pretty or plain)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub config_path: Option<PathBuf>,
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub log_level: String,
    pub log_format: LogFormat,
    pub prometheus_enabled: bool,
    /// Empty means every origin is allowed.
    pub allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_path: None,
            host: "127.0.0.1".to_string(),
            port: 8000,
            model_path: PathBuf::from("models/soil_pipeline.json"),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            prometheus_enabled: true,
            allowed_origins: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Layer the TOML file (if any) under `SOILSCOPE_*` environment variables.
    ///
    /// An explicit `--config` path must exist; the default path is optional.
    pub fn load(config_path_override: Option<&Path>) -> Result<Self> {
        Self::load_with_env(config_path_override, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(config_path_override: Option<&Path>, env: Environment) -> Result<Self> {
        let resolved_path = match config_path_override {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!(
                        "Configuration file {} not found (specified via --config)",
                        path.display()
                    );
                }
                Some(path.to_path_buf())
            }
            None => Some(PathBuf::from(DEFAULT_CONFIG_PATH)).filter(|path| path.exists()),
        };

        let mut builder = Config::builder();
        if let Some(path) = &resolved_path {
            builder = builder.add_source(ConfigFile::from(path.as_path()));
        }
        builder = builder.add_source(env);

        let config = builder.build().context("Failed to read configuration")?;
        Self::from_config(&config, resolved_path)
    }

    fn from_config(config: &Config, config_path: Option<PathBuf>) -> Result<Self> {
        let defaults = Self::default();

        let port = match get_string_value(config, &["port"]) {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("Invalid port '{raw}'"))?,
            None => defaults.port,
        };

        let log_format = match get_string_value(config, &["log_format"]) {
            Some(raw) => raw.parse()?,
            None => defaults.log_format,
        };

        let allowed_origins = get_string_value(config, &["allowed_origins"])
            .map(|raw| {
                raw.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.allowed_origins);

        Ok(Self {
            config_path,
            host: get_string_value(config, &["host"]).unwrap_or(defaults.host),
            port,
            model_path: get_string_value(config, &["model_path"])
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            log_level: get_string_value(config, &["log_level"]).unwrap_or(defaults.log_level),
            log_format,
            prometheus_enabled: get_bool_value(
                config,
                &["prometheus_enabled"],
                defaults.prometheus_enabled,
            ),
            allowed_origins,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            anyhow::bail!("host must not be empty");
        }
        if self.port == 0 {
            anyhow::bail!("port must be non-zero");
        }
        if self.model_path.as_os_str().is_empty() {
            anyhow::bail!("model_path must not be empty");
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn get_string_value(config: &Config, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        config
            .get_string(key)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

fn get_bool_value(config: &Config, keys: &[&str], default: bool) -> bool {
    for key in keys {
        if let Ok(value) = config.get_bool(key) {
            return value;
        }
        if let Ok(raw) = config.get_string(key) {
            if let Ok(parsed) = raw.parse::<bool>() {
                return parsed;
            }
        }
    }
    default
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("soilscope.toml");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn defaults_without_file_or_env() {
        let config = AppConfig::load_with_env(None, env(&[])).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8000);
        assert_eq!(config.model_path, PathBuf::from("models/soil_pipeline.json"));
        assert!(config.prometheus_enabled);
        assert!(config.allowed_origins.is_empty());
        assert_eq!(config.bind_addr(), "127.0.0.1:8000");
    }

    #[test]
    fn file_values_are_read() {
        let (_dir, path) = write_config(
            r#"
host = "0.0.0.0"
port = 9000
model_path = "/srv/models/soil_pipeline.json"
log_level = "debug"
log_format = "plain"
prometheus_enabled = false
allowed_origins = "http://localhost:3000, https://farm.example"
"#,
        );
        let config = AppConfig::load_with_env(Some(&path), env(&[])).unwrap();

        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
        assert_eq!(config.model_path, PathBuf::from("/srv/models/soil_pipeline.json"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Plain);
        assert!(!config.prometheus_enabled);
        assert_eq!(
            config.allowed_origins,
            vec!["http://localhost:3000", "https://farm.example"]
        );
    }

    #[test]
    fn environment_overrides_file() {
        let (_dir, path) = write_config("port = 9000\nlog_level = \"warn\"\n");
        let config = AppConfig::load_with_env(
            Some(&path),
            env(&[("SOILSCOPE_PORT", "7000"), ("SOILSCOPE_PROMETHEUS_ENABLED", "false")]),
        )
        .unwrap();

        assert_eq!(config.port, 7000);
        assert_eq!(config.log_level, "warn");
        assert!(!config.prometheus_enabled);
    }

    #[test]
    fn missing_explicit_config_fails() {
        let err = AppConfig::load_with_env(Some(Path::new("/nonexistent/soilscope.toml")), env(&[]))
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(AppConfig::load_with_env(None, env(&[("SOILSCOPE_PORT", "http")])).is_err());
        assert!(
            AppConfig::load_with_env(None, env(&[("SOILSCOPE_LOG_FORMAT", "xml")])).is_err()
        );

        let config = AppConfig {
            port: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
