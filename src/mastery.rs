//! Per-topic mastery as a recency-weighted average of attempt scores.
//!
//! `next = (1 − α)·current + α·score`, α = 0.3 by default. A topic with no history
//! reads as 0.5 (neutral). One tracker holds the map for one (learner, course).

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::config::EngineConfig;
use crate::domain::{Attempt, MasteryMap, NEUTRAL_MASTERY};
use crate::scoring::{score_attempt, DEFAULT_EXPECTED_TIME_SEC};

pub const DEFAULT_ALPHA: f64 = 0.3;

/// Result of folding one attempt into the map.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MasteryUpdate {
  pub topic: String,
  pub previous: f64,
  pub mastery: f64,
  pub score: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MasteryTracker {
  alpha: f64,
  expected_time_sec: f64,
  mastery: MasteryMap,
}

/// One EWMA step, kept inside [0, 1].
pub fn ewma(current: f64, observation: f64, alpha: f64) -> f64 {
  ((1.0 - alpha) * current + alpha * observation).clamp(0.0, 1.0)
}

impl MasteryTracker {
  pub fn new(alpha: f64, expected_time_sec: f64) -> Self {
    let alpha = if alpha.is_finite() && alpha > 0.0 { alpha.min(1.0) } else { DEFAULT_ALPHA };
    let expected_time_sec = if expected_time_sec.is_finite() && expected_time_sec > 0.0 {
      expected_time_sec
    } else {
      DEFAULT_EXPECTED_TIME_SEC
    };
    Self { alpha, expected_time_sec, mastery: MasteryMap::new() }
  }

  pub fn from_config(cfg: &EngineConfig) -> Self {
    Self::new(cfg.mastery_alpha, cfg.expected_time_sec)
  }

  /// Resume from a persisted map. Out-of-range or non-finite values are dropped.
  pub fn with_map(mut self, map: MasteryMap) -> Self {
    self.mastery = map
      .into_iter()
      .filter(|(topic, v)| !topic.trim().is_empty() && v.is_finite())
      .map(|(topic, v)| (topic, v.clamp(0.0, 1.0)))
      .collect();
    self
  }

  pub fn get(&self, topic: &str) -> f64 {
    self.mastery.get(topic).copied().unwrap_or(NEUTRAL_MASTERY)
  }

  pub fn map(&self) -> &MasteryMap {
    &self.mastery
  }

  pub fn into_map(self) -> MasteryMap {
    self.mastery
  }

  /// Fold one attempt in place. Malformed attempts leave the map untouched and yield `None`.
  #[instrument(level = "debug", skip(self, attempt), fields(item = %attempt.item_id, topic = %attempt.topic))]
  pub fn record_attempt(&mut self, attempt: &Attempt) -> Option<MasteryUpdate> {
    let Some(score) = score_attempt(attempt, self.expected_time_sec) else {
      warn!(target: "mastery", item = %attempt.item_id, "Skipping malformed attempt");
      return None;
    };
    let previous = self.get(&attempt.topic);
    let mastery = ewma(previous, score, self.alpha);
    self.mastery.insert(attempt.topic.clone(), mastery);
    debug!(target: "mastery", topic = %attempt.topic, previous, mastery, score, "Mastery updated");
    Some(MasteryUpdate { topic: attempt.topic.clone(), previous, mastery, score })
  }

  /// Fold a whole attempt log in order; returns how many records were applied.
  pub fn replay<'a, I>(&mut self, attempts: I) -> usize
  where
    I: IntoIterator<Item = &'a Attempt>,
  {
    attempts.into_iter().filter_map(|a| self.record_attempt(a)).count()
  }
}

impl Default for MasteryTracker {
  fn default() -> Self {
    Self::new(DEFAULT_ALPHA, DEFAULT_EXPECTED_TIME_SEC)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  fn attempt(topic: &str, correct: bool, time_sec: f64, expected: Option<f64>) -> Attempt {
    Attempt {
      item_id: "item".into(),
      topic: topic.into(),
      difficulty: 2,
      correct,
      score_pct: if correct { 100.0 } else { 0.0 },
      time_sec,
      hints_used: 0,
      timestamp: 1_700_000_000_000,
      expected_time_sec: expected,
    }
  }

  #[test]
  fn unseen_topic_is_neutral() {
    assert_eq!(MasteryTracker::default().get("anything"), 0.5);
  }

  #[test]
  fn one_step_matches_worked_example() {
    let mut t = MasteryTracker::default();
    let up = t.record_attempt(&attempt("loops", true, 40.0, Some(60.0))).expect("update");
    assert!((up.score - 0.8).abs() < 1e-9);
    assert!((up.previous - 0.5).abs() < 1e-12);
    assert!((up.mastery - 0.59).abs() < 1e-9);
    assert!((t.get("loops") - 0.59).abs() < 1e-9);
  }

  #[test]
  fn malformed_attempts_are_skipped() {
    let mut t = MasteryTracker::default();
    assert!(t.record_attempt(&attempt("", true, 1.0, None)).is_none());
    assert!(t.record_attempt(&attempt("loops", true, -3.0, None)).is_none());
    assert!(t.map().is_empty());
    let log = vec![attempt("loops", true, 0.0, None), attempt(" ", true, 0.0, None)];
    assert_eq!(t.replay(&log), 1);
  }

  #[test]
  fn resumed_map_is_sanitized() {
    let map = MasteryMap::from([("a".to_string(), 1.7), ("b".to_string(), f64::NAN), ("c".to_string(), 0.2)]);
    let t = MasteryTracker::default().with_map(map);
    assert_eq!(t.get("a"), 1.0);
    assert_eq!(t.get("b"), 0.5);
    assert_eq!(t.get("c"), 0.2);
  }

  proptest! {
    #[test]
    fn repeated_score_converges_and_stays_in_range(start in 0.0f64..=1.0, p in 0.0f64..=1.0, alpha in 0.05f64..=1.0) {
      let mut m = start;
      for _ in 0..200 {
        m = ewma(m, p, alpha);
        prop_assert!((0.0..=1.0).contains(&m));
      }
      prop_assert!((m - p).abs() < 1e-3);
    }
  }
}
