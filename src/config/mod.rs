mod types;

pub use types::*;

use crate::{Error, Result};
use std::env;
use std::path::Path;
use tracing::debug;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Loads the YAML config file (if any) and applies environment overrides.
///
/// A missing `config.yaml` in the working directory means defaults; a path
/// given explicitly through `CONFIG_PATH` must exist.
pub async fn load() -> Result<Config> {
    let explicit = env::var("CONFIG_PATH").ok();
    let config_path = explicit
        .clone()
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = if explicit.is_none() && !Path::new(&config_path).exists() {
        debug!("No configuration file at {}, using defaults", config_path);
        Config::default()
    } else {
        debug!("Loading configuration from: {}", config_path);
        let config_str = tokio::fs::read_to_string(&config_path).await?;
        serde_yaml::from_str(&config_str)?
    };

    let config = apply_overrides(config, |key| env::var(key).ok())?;
    check(&config)?;
    Ok(config)
}

/// Overlays values returned by `lookup` for the supported environment keys.
pub fn apply_overrides<F>(mut config: Config, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("HOST") {
        config.server.host = host;
    }
    if let Some(port) = lookup("PORT") {
        config.server.port = port
            .trim()
            .parse()
            .map_err(|_| Error::config(format!("Invalid PORT: '{}'", port)))?;
    }
    if let Some(level) = lookup("LOG_LEVEL") {
        config.server.logs.level = level;
    }
    if let Some(origins) = lookup("CORS_ALLOWED_ORIGINS") {
        config.server.cors.allowed_origins = origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect();
    }
    if let Some(path) = lookup("MODEL_PATH") {
        config.model.model_path = path;
    }
    if let Some(path) = lookup("SCALER_PATH") {
        config.model.scaler_path = if path.trim().is_empty() {
            None
        } else {
            Some(path)
        };
    }
    if let Some(value) = lookup("SCALING_ENABLED") {
        config.pipeline.scaling = parse_bool("SCALING_ENABLED", &value)?;
    }
    if let Some(value) = lookup("STRICT_NON_NEGATIVE") {
        config.pipeline.non_negative = parse_bool("STRICT_NON_NEGATIVE", &value)?;
    }
    if let Some(value) = lookup("AUDIT_ENABLED") {
        config.audit.enabled = parse_bool("AUDIT_ENABLED", &value)?;
    }
    if let Some(path) = lookup("DATABASE_PATH") {
        config.audit.database_path = path;
    }
    if let Some(value) = lookup("METRICS_ENABLED") {
        config.metrics.enabled = parse_bool("METRICS_ENABLED", &value)?;
    }
    Ok(config)
}

/// Rejects combinations that cannot start.
pub fn check(config: &Config) -> Result<()> {
    if config.model.model_path.trim().is_empty() {
        return Err(Error::config("model_path must not be empty"));
    }
    if config.pipeline.scaling && config.model.scaler_path.is_none() {
        return Err(Error::config(
            "scaling is enabled but no scaler_path is configured",
        ));
    }
    if config.audit.enabled && config.audit.database_path.trim().is_empty() {
        return Err(Error::config("audit is enabled but database_path is empty"));
    }
    Ok(())
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::config(format!("Invalid {}: '{}'", key, value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.logs.level, "info");
        assert_eq!(config.model.model_path, "lr_model.json");
        assert!(config.pipeline.scaling);
        assert!(!config.pipeline.non_negative);
        assert!(config.audit.enabled);
        assert_eq!(config.audit.database_path, "predictions.db");
        assert!(config.metrics.enabled);
        assert_eq!(config.server.cors.allowed_origins.len(), 2);
        check(&config).unwrap();
    }

    #[test]
    fn test_yaml_partial_uses_defaults() {
        let config: Config = serde_yaml::from_str(
            r#"
server:
  port: 8000
pipeline:
  scaling: false
  non_negative: true
"#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(!config.pipeline.scaling);
        assert!(config.pipeline.non_negative);
        assert!(config.audit.enabled);
    }

    #[test]
    fn test_env_overrides() {
        let config = apply_overrides(
            Config::default(),
            lookup(&[
                ("PORT", "8080"),
                ("MODEL_PATH", "/models/xgb.json"),
                ("SCALER_PATH", ""),
                ("SCALING_ENABLED", "false"),
                ("STRICT_NON_NEGATIVE", "yes"),
                ("AUDIT_ENABLED", "0"),
                ("METRICS_ENABLED", "off"),
                ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example,"),
                ("LOG_LEVEL", "debug"),
            ]),
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.model.model_path, "/models/xgb.json");
        assert_eq!(config.model.scaler_path, None);
        assert!(!config.pipeline.scaling);
        assert!(config.pipeline.non_negative);
        assert!(!config.audit.enabled);
        assert!(!config.metrics.enabled);
        assert_eq!(
            config.server.cors.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.server.logs.level, "debug");
        check(&config).unwrap();
    }

    #[test]
    fn test_invalid_port() {
        let err = apply_overrides(Config::default(), lookup(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_invalid_bool() {
        let err = apply_overrides(Config::default(), lookup(&[("AUDIT_ENABLED", "maybe")]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: Invalid AUDIT_ENABLED: 'maybe'");
    }

    #[test]
    fn test_scaling_requires_scaler_path() {
        let mut config = Config::default();
        config.model.scaler_path = None;
        assert!(check(&config).is_err());
        config.pipeline.scaling = false;
        assert!(check(&config).is_ok());
    }
}
