//! Loading service configuration (teacher passphrase + optional mission catalog) from TOML.
//!
//! Example:
//! ```toml
//! teacher_passphrase = "invisible"
//!
//! [[missions]]
//! id = "da-01"
//! title = "A Day in the Life"
//! objective = "Document your daily routine."
//! briefing = "Every agent needs a cover story."
//! tasks = ["List your morning activities."]
//! feedback_prompt = "You are a spy master..."
//! points = 100
//! ```

use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use crate::domain::Mission;

pub const DEFAULT_TEACHER_PASSPHRASE: &str = "invisible";

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub teacher_passphrase: Option<String>,
  /// Replaces the built-in catalog when non-empty.
  #[serde(default)]
  pub missions: Vec<Mission>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("invalid TOML: {0}")]
  Toml(#[from] toml::de::Error),
  #[error("duplicate mission id '{0}'")]
  DuplicateMission(String),
  #[error("mission '{mission}' repeats matching pair id {pair}")]
  DuplicatePair { mission: String, pair: u32 },
  #[error("mission '{0}' must award a positive number of points")]
  InvalidPoints(String),
}

/// Parse and sanity-check a config document.
pub fn parse_app_config(s: &str) -> Result<AppConfig, ConfigError> {
  let cfg: AppConfig = toml::from_str(s)?;
  let mut ids = HashSet::new();
  for m in &cfg.missions {
    if !ids.insert(m.id.as_str()) {
      return Err(ConfigError::DuplicateMission(m.id.clone()));
    }
    if m.points == 0 {
      return Err(ConfigError::InvalidPoints(m.id.clone()));
    }
    if let Some(content) = m.interactive() {
      let mut pairs = HashSet::new();
      for p in &content.matching_pairs {
        if !pairs.insert(p.id) {
          return Err(ConfigError::DuplicatePair { mission: m.id.clone(), pair: p.id });
        }
      }
    }
  }
  Ok(cfg)
}

/// Attempt to load `AppConfig` from MISSION_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_app_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("MISSION_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_app_config(&s) {
      Ok(cfg) => {
        info!(target: "mission_possible", %path, missions = cfg.missions.len(), "Loaded mission config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "mission_possible", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "mission_possible", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

/// TEACHER_PASSPHRASE wins over the TOML value, which wins over the default.
pub fn resolve_teacher_passphrase(env_value: Option<String>, cfg: Option<&AppConfig>) -> String {
  env_value
    .filter(|p| !p.is_empty())
    .or_else(|| cfg.and_then(|c| c.teacher_passphrase.clone()))
    .unwrap_or_else(|| DEFAULT_TEACHER_PASSPHRASE.into())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::MissionKind;

  const CATALOG: &str = r#"
teacher_passphrase = "shadow"

[[missions]]
id = "da-01"
title = "A Day in the Life"
objective = "Document your daily routine."
briefing = "Every agent needs a cover story."
tasks = ["List your morning activities."]
feedback_prompt = "You are a spy master."
points = 120

[[missions]]
id = "dp-01"
title = "The Mysterious Informant"
objective = "Describe people."
briefing = "We intercepted a photo."
feedback_prompt = "You are Handler."
points = 100

[missions.kind]
type = "interactive"
informant_image_url = "https://example.com/informant.jpg"

[missions.kind.vocabulary]
appearance = [{ word = "Tall", definition = "Of great height." }]
personality = [{ word = "Timid", definition = "Easily frightened." }]

[[missions.kind.matching_pairs]]
id = 1
image_url = "https://example.com/1.jpg"
description = "A friendly man."

[[missions.kind.matching_pairs]]
id = 2
description = "An elegant woman."
"#;

  #[test]
  fn parses_standard_and_interactive_missions() {
    let cfg = parse_app_config(CATALOG).unwrap();
    assert_eq!(cfg.teacher_passphrase.as_deref(), Some("shadow"));
    assert_eq!(cfg.missions.len(), 2);
    assert_eq!(cfg.missions[0].kind, MissionKind::Standard);
    assert_eq!(cfg.missions[0].points, 120);
    let content = cfg.missions[1].interactive().unwrap();
    assert_eq!(content.matching_pairs.len(), 2);
    assert_eq!(content.vocabulary.personality[0].word, "Timid");
  }

  #[test]
  fn rejects_duplicate_pair_ids() {
    let doc = CATALOG.replace("id = 2\n", "id = 1\n");
    assert!(matches!(parse_app_config(&doc), Err(ConfigError::DuplicatePair { pair: 1, .. })));
  }

  #[test]
  fn rejects_duplicate_missions() {
    let doc = CATALOG.replace("id = \"dp-01\"", "id = \"da-01\"");
    assert!(matches!(parse_app_config(&doc), Err(ConfigError::DuplicateMission(id)) if id == "da-01"));
  }

  #[test]
  fn passphrase_precedence() {
    let cfg = parse_app_config(CATALOG).unwrap();
    assert_eq!(resolve_teacher_passphrase(Some("env".into()), Some(&cfg)), "env");
    assert_eq!(resolve_teacher_passphrase(None, Some(&cfg)), "shadow");
    assert_eq!(resolve_teacher_passphrase(Some(String::new()), None), DEFAULT_TEACHER_PASSPHRASE);
  }
}
