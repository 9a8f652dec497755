use serde::{Deserialize, Serialize};
use std::fs;

use crate::error::{Error, Result};

/// Environment variable naming the cache service address for the gateway
pub const TARGET_ENV: &str = "GRPC_TARGET";

/// Log configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LogConfig {
  /// Log level, default is "info"
  #[serde(default = "default_log_level")]
  pub level: String,
}

fn default_log_level() -> String {
  "info".to_string()
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: default_log_level(),
    }
  }
}

/// kvcache configuration shared by the cache service and the gateway
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
  /// Cache service listening address (gRPC)
  #[serde(default = "default_cache_addr")]
  pub cache_addr: String,

  /// Gateway listening address (HTTP)
  #[serde(default = "default_gateway_addr")]
  pub gateway_addr: String,

  /// Cache service address the gateway connects to
  #[serde(default = "default_cache_target")]
  pub cache_target: String,

  /// Log configuration
  #[serde(default)]
  pub log: LogConfig,
}

fn default_cache_addr() -> String {
  "0.0.0.0:50051".to_string()
}

fn default_gateway_addr() -> String {
  "0.0.0.0:8080".to_string()
}

fn default_cache_target() -> String {
  "http://localhost:50051".to_string()
}

impl Default for Config {
  fn default() -> Self {
    Self {
      cache_addr: default_cache_addr(),
      gateway_addr: default_gateway_addr(),
      cache_target: default_cache_target(),
      log: LogConfig::default(),
    }
  }
}

impl Config {
  /// Load configuration from TOML file
  pub fn from_file(path: &str) -> Result<Self> {
    let config_str = fs::read_to_string(path).map_err(|e| Error::Config {
      path: path.to_string(),
      message: format!("failed to read: {}", e),
    })?;

    Self::parse(path, &config_str)
  }

  fn parse(path: &str, config_str: &str) -> Result<Self> {
    toml::from_str(config_str).map_err(|e| Error::Config {
      path: path.to_string(),
      message: format!("failed to parse: {}", e),
    })
  }

  /// Load from `path` if given, otherwise start from defaults, then apply
  /// environment overrides
  pub fn load(path: Option<&str>) -> Result<Self> {
    let config = match path {
      Some(path) => Self::from_file(path)?,
      None => Self::default(),
    };
    Ok(config.with_env(|name| std::env::var(name).ok()))
  }

  /// Apply environment overrides read through `lookup`
  pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
    if let Some(target) = lookup(TARGET_ENV).filter(|t| !t.is_empty()) {
      self.cache_target = target;
    }
    self
  }

  /// Gateway target as a URI, adding `http://` when no scheme is given
  pub fn cache_uri(&self) -> String {
    normalize_target(&self.cache_target)
  }
}

/// `localhost:50051` -> `http://localhost:50051`
pub fn normalize_target(target: &str) -> String {
  if target.contains("://") {
    target.to_string()
  } else {
    format!("http://{}", target)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.cache_addr, "0.0.0.0:50051");
    assert_eq!(config.gateway_addr, "0.0.0.0:8080");
    assert_eq!(config.cache_target, "http://localhost:50051");
    assert_eq!(config.log.level, "info");
  }

  #[test]
  fn test_parse_full_config() {
    let config_str = r#"
cache_addr = "127.0.0.1:6000"
gateway_addr = "127.0.0.1:9000"
cache_target = "cache.internal:6000"

[log]
level = "debug"
"#;

    let config = Config::parse("test.toml", config_str).unwrap();
    assert_eq!(config.cache_addr, "127.0.0.1:6000");
    assert_eq!(config.gateway_addr, "127.0.0.1:9000");
    assert_eq!(config.cache_target, "cache.internal:6000");
    assert_eq!(config.cache_uri(), "http://cache.internal:6000");
    assert_eq!(config.log.level, "debug");
  }

  #[test]
  fn test_parse_partial_config_uses_defaults() {
    let config = Config::parse("test.toml", "gateway_addr = \"127.0.0.1:1234\"\n").unwrap();
    assert_eq!(config.gateway_addr, "127.0.0.1:1234");
    assert_eq!(config.cache_addr, "0.0.0.0:50051");
    assert_eq!(config.log, LogConfig::default());
  }

  #[test]
  fn test_parse_invalid_config() {
    let err = Config::parse("bad.toml", "cache_addr = [").unwrap_err();
    assert!(matches!(err, Error::Config { ref path, .. } if path == "bad.toml"));
  }

  #[test]
  fn test_missing_file() {
    let err = Config::from_file("/nonexistent/kvcache.toml").unwrap_err();
    assert!(err.to_string().contains("failed to read"));
  }

  #[test]
  fn test_env_override() {
    let config = Config::default().with_env(|name| {
      (name == TARGET_ENV).then(|| "10.0.0.5:50051".to_string())
    });
    assert_eq!(config.cache_target, "10.0.0.5:50051");
    assert_eq!(config.cache_uri(), "http://10.0.0.5:50051");
  }

  #[test]
  fn test_empty_env_is_ignored() {
    let config = Config::default().with_env(|_| Some(String::new()));
    assert_eq!(config.cache_target, "http://localhost:50051");
  }

  #[test]
  fn test_normalize_target_keeps_scheme() {
    assert_eq!(normalize_target("https://cache:443"), "https://cache:443");
    assert_eq!(normalize_target("localhost:50051"), "http://localhost:50051");
  }
}
