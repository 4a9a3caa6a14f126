//! Loading engine configuration (tuning knobs + optional extra seeds) from TOML.
//!
//! See `EngineConfig` and `SeedCfg` for the expected schema. Every field has a default,
//! so an empty file (or no file at all) yields the stock behavior.

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::domain::{Course, QuestionSeed, Tier};
use crate::error::ConfigError;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  /// Fingerprints remembered per (course, topic, difficulty).
  pub recency_capacity: usize,
  /// Chance of appending a code snippet to a stem.
  pub snippet_probability: f64,
  /// Chance of appending "(topic: ...)" to stems that don't mention the topic.
  pub topic_hint_probability: f64,
  /// Synthesis attempts per requested question on the primary tier.
  pub retry_factor: usize,
  /// Synthesis attempts per seed when borrowing from another tier.
  pub borrow_factor: usize,
  pub min_options: usize,
  pub max_options: usize,
  pub mastery_alpha: f64,
  pub expected_time_sec: f64,
  /// Offset applied to timestamps before cutting them into calendar days.
  pub utc_offset_minutes: i32,
  pub source_timeout_ms: u64,
  pub seeds: Vec<SeedCfg>,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      recency_capacity: 200,
      snippet_probability: 0.35,
      topic_hint_probability: 0.5,
      retry_factor: 12,
      borrow_factor: 6,
      min_options: 4,
      max_options: 6,
      mastery_alpha: 0.3,
      expected_time_sec: 30.0,
      utc_offset_minutes: 0,
      source_timeout_ms: 5_000,
      seeds: Vec::new(),
    }
  }
}

/// Seed entry accepted in TOML configuration, appended to the built-in catalog.
#[derive(Clone, Debug, Deserialize)]
pub struct SeedCfg {
  pub course: String,
  pub difficulty: u8,
  pub stem: String,
  pub options: Vec<String>,
  pub answer: String,
  #[serde(default)]
  pub tags: Vec<String>,
}

impl SeedCfg {
  /// `None` when the entry can't be placed in the catalog.
  pub fn resolve(&self) -> Option<(Course, Tier, QuestionSeed)> {
    let course = Course::from_id(&self.course)?;
    let tier = Tier::try_from_level(self.difficulty)?;
    if self.stem.trim().is_empty() || self.answer.trim().is_empty() {
      return None;
    }
    let seed = QuestionSeed {
      stem: self.stem.clone(),
      options: self.options.clone(),
      answer: self.answer.clone(),
      tags: self.tags.clone(),
    };
    Some((course, tier, seed))
  }
}

impl EngineConfig {
  pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
    let cfg: EngineConfig = toml::from_str(s)?;
    cfg.validated()
  }

  pub fn from_path(path: &str) -> Result<Self, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_string(),
      source,
    })?;
    Self::from_toml_str(&raw)
  }

  /// Clamp knobs into usable ranges. Only a nonsensical option range is rejected outright.
  fn validated(mut self) -> Result<Self, ConfigError> {
    if self.max_options < self.min_options {
      return Err(ConfigError::Invalid {
        field: "max_options",
        reason: format!("{} is below min_options {}", self.max_options, self.min_options),
      });
    }
    self.min_options = self.min_options.clamp(2, 6);
    self.max_options = self.max_options.clamp(self.min_options, 6);
    self.recency_capacity = self.recency_capacity.max(1);
    self.retry_factor = self.retry_factor.max(1);
    self.borrow_factor = self.borrow_factor.max(1);
    self.snippet_probability = clamp_probability(self.snippet_probability);
    self.topic_hint_probability = clamp_probability(self.topic_hint_probability);
    if !(self.mastery_alpha.is_finite() && self.mastery_alpha > 0.0) {
      warn!(target: "practice_engine", alpha = self.mastery_alpha, "mastery_alpha out of range; using 0.3");
      self.mastery_alpha = 0.3;
    }
    self.mastery_alpha = self.mastery_alpha.min(1.0);
    if !(self.expected_time_sec.is_finite() && self.expected_time_sec > 0.0) {
      warn!(target: "practice_engine", expected = self.expected_time_sec, "expected_time_sec out of range; using 30");
      self.expected_time_sec = 30.0;
    }
    Ok(self)
  }
}

fn clamp_probability(p: f64) -> f64 {
  if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 }
}

/// Attempt to load `EngineConfig` from ENGINE_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_engine_config_from_env() -> Option<EngineConfig> {
  let path = std::env::var("ENGINE_CONFIG_PATH").ok()?;
  match EngineConfig::from_path(&path) {
    Ok(cfg) => {
      info!(target: "practice_engine", %path, extra_seeds = cfg.seeds.len(), "Loaded engine config (TOML)");
      Some(cfg)
    }
    Err(e) => {
      error!(target: "practice_engine", %path, error = %e, "Failed to load engine config");
      None
    }
  }
}
