//! Aggregate view of a learner's recent attempts: averages, weak/strong topics, trend.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::Attempt;

pub const STRUGGLING_BELOW_PCT: f64 = 60.0;
pub const STRONG_ABOVE_PCT: f64 = 85.0;
const TREND_WINDOW: usize = 3;
const TREND_MARGIN_PCT: f64 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
  InsufficientData,
  Improving,
  Declining,
  Stable,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
  pub total_attempts: usize,
  pub average_score_pct: f64,
  pub average_time_sec: f64,
  pub struggling_topics: Vec<String>,
  pub strong_topics: Vec<String>,
  pub trend: Trend,
  /// Timestamp (epoch ms) of the last well-formed attempt in log order.
  pub last_activity: Option<i64>,
}

fn mean(xs: impl Iterator<Item = f64>) -> f64 {
  let (sum, n) = xs.fold((0.0, 0usize), |(s, n), x| (s + x, n + 1));
  if n == 0 { 0.0 } else { sum / n as f64 }
}

/// Last three attempts against the up-to-three before them, by `score_pct`.
pub fn trend(attempts: &[&Attempt]) -> Trend {
  if attempts.len() < TREND_WINDOW {
    return Trend::InsufficientData;
  }
  let split = attempts.len() - TREND_WINDOW;
  let recent = &attempts[split..];
  let older = &attempts[split.saturating_sub(TREND_WINDOW)..split];
  if older.is_empty() {
    return Trend::InsufficientData;
  }
  let recent_avg = mean(recent.iter().map(|a| a.score_pct));
  let older_avg = mean(older.iter().map(|a| a.score_pct));
  if recent_avg > older_avg + TREND_MARGIN_PCT {
    Trend::Improving
  } else if recent_avg < older_avg - TREND_MARGIN_PCT {
    Trend::Declining
  } else {
    Trend::Stable
  }
}

/// Summarize an attempt log. Malformed records are ignored.
pub fn summarize(attempts: &[Attempt]) -> PerformanceSummary {
  let valid: Vec<&Attempt> = attempts.iter().filter(|a| a.is_well_formed()).collect();

  let mut by_topic: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
  for a in &valid {
    by_topic.entry(a.topic.as_str()).or_default().push(a.score_pct);
  }
  let mut struggling_topics = Vec::new();
  let mut strong_topics = Vec::new();
  for (topic, scores) in by_topic {
    let avg = mean(scores.into_iter());
    if avg < STRUGGLING_BELOW_PCT {
      struggling_topics.push(topic.to_string());
    } else if avg > STRONG_ABOVE_PCT {
      strong_topics.push(topic.to_string());
    }
  }

  PerformanceSummary {
    total_attempts: valid.len(),
    average_score_pct: mean(valid.iter().map(|a| a.score_pct)),
    average_time_sec: mean(valid.iter().map(|a| a.time_sec)),
    struggling_topics,
    strong_topics,
    trend: trend(&valid),
    last_activity: valid.last().map(|a| a.timestamp),
  }
}
