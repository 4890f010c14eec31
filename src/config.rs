use serde::Deserialize;

use crate::error::AppError;
use crate::guard::GuardConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub guard: GuardSettings,
    #[serde(default)]
    pub metrics: MetricsSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

/// Cooldown and sweep timings, in minutes.
#[derive(Debug, Clone, Deserialize)]
pub struct GuardSettings {
    pub cooldown_minutes: i64,
    pub sweep_interval_minutes: i64,
    pub sweep_threshold_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    pub enabled: bool,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Settings {
    pub fn new() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        Self::from_config(builder)
    }

    /// Builds settings from an already assembled builder, applying the guard defaults first.
    pub fn from_config(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, config::ConfigError> {
        builder
            .set_default("application.host", "0.0.0.0")?
            .set_default("application.port", 3000)?
            .set_default("application.log_level", "info")?
            .set_default("guard.cooldown_minutes", 30)?
            .set_default("guard.sweep_interval_minutes", 10)?
            .set_default("guard.sweep_threshold_minutes", 35)?
            .build()?
            .try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }
}

impl TryFrom<&GuardSettings> for GuardConfig {
    type Error = AppError;

    fn try_from(settings: &GuardSettings) -> Result<Self, Self::Error> {
        let config = GuardConfig {
            cooldown: minutes("cooldown_minutes", settings.cooldown_minutes)?,
            sweep_interval: minutes("sweep_interval_minutes", settings.sweep_interval_minutes)?,
            sweep_threshold: minutes("sweep_threshold_minutes", settings.sweep_threshold_minutes)?,
        };
        config.validate()?;
        Ok(config)
    }
}

fn minutes(field: &str, value: i64) -> Result<chrono::Duration, AppError> {
    chrono::Duration::try_minutes(value).ok_or_else(|| {
        AppError::Configuration(format!("guard.{} is out of range: {}", field, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_without_sources() {
        let settings = Settings::from_config(config::Config::builder()).unwrap();
        assert_eq!(settings.application.port, 3000);
        assert_eq!(settings.application.log_format, "pretty");
        assert_eq!(settings.guard.cooldown_minutes, 30);
        assert_eq!(settings.guard.sweep_interval_minutes, 10);
        assert_eq!(settings.guard.sweep_threshold_minutes, 35);
        assert!(settings.metrics.enabled);
        assert_eq!(settings.bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_overrides_take_precedence() {
        let builder = config::Config::builder()
            .set_override("guard.cooldown_minutes", 45)
            .unwrap()
            .set_override("guard.sweep_threshold_minutes", 50)
            .unwrap();
        let settings = Settings::from_config(builder).unwrap();
        assert_eq!(settings.guard.cooldown_minutes, 45);

        let guard = GuardConfig::try_from(&settings.guard).unwrap();
        assert_eq!(guard.cooldown, chrono::Duration::minutes(45));
        assert_eq!(guard.sweep_threshold, chrono::Duration::minutes(50));
    }

    #[test]
    fn test_overflowing_minutes_are_a_config_error() {
        let builder = config::Config::builder()
            .set_override("guard.cooldown_minutes", i64::MAX / 2)
            .unwrap();
        let settings = Settings::from_config(builder).unwrap();

        match GuardConfig::try_from(&settings.guard) {
            Err(AppError::Configuration(msg)) => assert!(msg.contains("cooldown_minutes")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_threshold_below_cooldown_is_a_config_error() {
        let builder = config::Config::builder()
            .set_override("guard.sweep_threshold_minutes", 10)
            .unwrap();
        let settings = Settings::from_config(builder).unwrap();

        assert!(matches!(
            GuardConfig::try_from(&settings.guard),
            Err(AppError::Configuration(_))
        ));
    }
}
