//! Runtime configuration, deserialised from `config.toml` layered with
//! `INCOME_*` environment variables.

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
  pub host:                  String,
  pub port:                  u16,
  pub store_path:            PathBuf,
  /// Endpoint the registry query is POSTed to.
  pub registry_url:          String,
  /// Bearer token sent to the registry, if it requires one.
  #[serde(default)]
  pub registry_token:        Option<String>,
  #[serde(default = "default_consumer_id")]
  pub consumer_id:           String,
  #[serde(default = "default_registry_timeout_secs")]
  pub registry_timeout_secs: u64,
  /// Registry-side filter naming which income categories to return.
  #[serde(default = "default_income_filter")]
  pub income_filter:         String,
  /// Registry-side purpose code the query is made under.
  #[serde(default = "default_purpose")]
  pub purpose:               String,
}

fn default_consumer_id() -> String { "income-snapshot-store".into() }

fn default_registry_timeout_secs() -> u64 { 30 }

fn default_income_filter() -> String { "DagpengerGrunnlagA-Inntekt".into() }

fn default_purpose() -> String { "Dagpenger".into() }

impl ServerConfig {
  /// Load from an optional TOML file plus the environment.
  pub fn load(file: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::with_prefix("INCOME"))
      .build()?
      .try_deserialize()
  }

  /// `store_path` with a leading `~` expanded to the user's home directory.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use super::*;

  #[test]
  fn loads_file_and_applies_defaults() {
    let path = std::env::temp_dir()
      .join(format!("income-config-{}.toml", ulid::Ulid::new()));
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(
      f,
      r#"
host = "127.0.0.1"
port = 8099
store_path = "/var/lib/income/store.sqlite"
registry_url = "http://registry.local/hentinntektliste"
"#
    )
    .unwrap();

    let cfg = ServerConfig::load(&path).unwrap();
    assert_eq!(cfg.port, 8099);
    assert_eq!(cfg.registry_token, None);
    assert_eq!(cfg.registry_timeout_secs, 30);
    assert_eq!(cfg.consumer_id, "income-snapshot-store");

    let _ = std::fs::remove_file(&path);
  }

  #[test]
  fn missing_required_field_is_an_error() {
    let path = std::env::temp_dir()
      .join(format!("income-config-{}.toml", ulid::Ulid::new()));
    std::fs::write(&path, "host = \"0.0.0.0\"\n").unwrap();
    assert!(ServerConfig::load(&path).is_err());
    let _ = std::fs::remove_file(&path);
  }

  #[test]
  fn tilde_expands_to_home() {
    let cfg_path = PathBuf::from("~/income.sqlite");
    let expanded = expand_tilde(&cfg_path);
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(expanded, PathBuf::from(home).join("income.sqlite"));
    }
    let absolute = PathBuf::from("/tmp/income.sqlite");
    assert_eq!(expand_tilde(&absolute), absolute);
  }
}
