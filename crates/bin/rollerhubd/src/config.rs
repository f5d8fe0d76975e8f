//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `rollerhub.toml` in the working directory, or at the path given
//! by `ROLLERHUB_CONFIG`. Logging and GPIO settings have defaults; the
//! `[rpi_gpio_roller]` section does not. Environment variables take
//! precedence over file values.

use std::str::FromStr;

use serde::Deserialize;

use rollerhub_adapter_rpi_gpio_roller::RollerConfig;
use rollerhub_domain::error::RollerHubError;

const DEFAULT_PATH: &str = "rollerhub.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// GPIO backend selection.
    pub gpio: GpioConfig,
    /// Roller cover integration settings.
    pub rpi_gpio_roller: Option<RollerConfig>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GpioConfig {
    pub backend: GpioBackend,
}

/// Which [`GpioDriver`](rollerhub_app::ports::GpioDriver) drives the relays.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GpioBackend {
    /// In-memory pins, for running anywhere.
    #[default]
    Virtual,
    /// The Raspberry Pi header through `rppal`.
    Rppal,
}

impl FromStr for GpioBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "virtual" => Ok(Self::Virtual),
            "rppal" => Ok(Self::Rppal),
            other => Err(ConfigError::Validation(format!(
                "unknown gpio backend {other:?}"
            ))),
        }
    }
}

impl Config {
    /// Load configuration from `rollerhub.toml` (or `$ROLLERHUB_CONFIG`),
    /// apply environment-variable overrides and validate the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is malformed, an override is
    /// invalid, or the configuration fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("ROLLERHUB_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = lookup("ROLLERHUB_GPIO") {
            self.gpio.backend = val.parse()?;
        }
        if let Some(val) = lookup("ROLLERHUB_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.gpio.backend == GpioBackend::Rppal && !cfg!(feature = "raspberry_pi") {
            return Err(ConfigError::Validation(
                "gpio backend \"rppal\" requires the raspberry_pi feature".to_string(),
            ));
        }
        self.roller()?.validate()?;
        Ok(())
    }

    /// The roller integration settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when the section is missing.
    pub fn roller(&self) -> Result<&RollerConfig, ConfigError> {
        self.rpi_gpio_roller.as_ref().ok_or_else(|| {
            ConfigError::Validation("missing [rpi_gpio_roller] section".to_string())
        })
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "rollerhubd=info,rollerhub=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
    /// The `[rpi_gpio_roller]` section is well-formed but inconsistent.
    #[error("invalid [rpi_gpio_roller] section")]
    Roller(#[from] RollerHubError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use rollerhub_domain::error::ValidationError;

    const MINIMAL: &str = "
        [rpi_gpio_roller]
        covers = [{ name = 'Blind1', relay_pin_up = 17, relay_pin_down = 18 }]
    ";

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.gpio.backend, GpioBackend::Virtual);
        assert_eq!(config.logging.filter, "rollerhubd=info,rollerhub=info");
        assert!(config.rpi_gpio_roller.is_none());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        let roller = config.roller().unwrap();
        assert_eq!(roller.covers.len(), 1);
        assert_eq!(roller.relay_time, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [logging]
            filter = 'debug'

            [gpio]
            backend = 'virtual'

            [rpi_gpio_roller]
            relay_time = 2
            invert_logic = true

            [[rpi_gpio_roller.covers]]
            name = 'Blind1'
            relay_pin_up = 17
            relay_pin_down = 18

            [[rpi_gpio_roller.covers]]
            name = 'Blind2'
            relay_pin_up = 22
            relay_pin_down = 23
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.logging.filter, "debug");
        let roller = config.roller().unwrap();
        assert_eq!(roller.relay_time, 2);
        assert!(roller.invert_logic);
        assert_eq!(roller.covers[1].relay_pin_down, 23);
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert!(config.rpi_gpio_roller.is_none());
    }

    #[test]
    fn should_require_roller_section() {
        let config = Config::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn should_surface_roller_validation_errors() {
        let toml = "
            [rpi_gpio_roller]
            covers = [
                { name = 'Blind1', relay_pin_up = 17, relay_pin_down = 18 },
                { name = 'Blind2', relay_pin_up = 18, relay_pin_down = 19 },
            ]
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Roller(RollerHubError::Validation(
                ValidationError::PinConflict { pin: 18, .. }
            )))
        ));
    }

    #[test]
    fn should_reject_unknown_backend_in_file() {
        let toml = format!("[gpio]\nbackend = 'sysfs'\n{MINIMAL}");
        assert!(toml::from_str::<Config>(&toml).is_err());
    }

    #[test]
    fn should_apply_env_overrides() {
        let mut config: Config = toml::from_str(MINIMAL).unwrap();
        config
            .apply_overrides(env(&[("ROLLERHUB_GPIO", "RPPAL"), ("ROLLERHUB_LOG", "trace")]))
            .unwrap();
        assert_eq!(config.gpio.backend, GpioBackend::Rppal);
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_prefer_rust_log_over_rollerhub_log() {
        let mut config = Config::default();
        config
            .apply_overrides(env(&[("ROLLERHUB_LOG", "trace"), ("RUST_LOG", "warn")]))
            .unwrap();
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn should_reject_unknown_backend_override() {
        let mut config = Config::default();
        let result = config.apply_overrides(env(&[("ROLLERHUB_GPIO", "sysfs")]));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[cfg(not(feature = "raspberry_pi"))]
    #[test]
    fn should_reject_rppal_without_feature() {
        let mut config: Config = toml::from_str(MINIMAL).unwrap();
        config.gpio.backend = GpioBackend::Rppal;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
