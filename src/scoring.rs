//! Performance scoring: one attempt -> one value in [0, 1].
//!
//! `score = clamp01(0.7·correct + 0.3·timeNorm − hintPenalty)`
//! with `timeNorm = clamp01(1 − time/expected)` and `hintPenalty = min(0.4, 0.1·hints)`.

use crate::domain::Attempt;

pub const CORRECTNESS_WEIGHT: f64 = 0.7;
pub const SPEED_WEIGHT: f64 = 0.3;
pub const HINT_PENALTY_STEP: f64 = 0.1;
pub const HINT_PENALTY_CAP: f64 = 0.4;
pub const DEFAULT_EXPECTED_TIME_SEC: f64 = 30.0;

fn clamp01(x: f64) -> f64 {
  x.clamp(0.0, 1.0)
}

/// Raw scoring. A non-positive or non-finite `expected_time_sec` gives no speed credit.
pub fn performance_score(correct: bool, time_sec: f64, expected_time_sec: f64, hints_used: u32) -> f64 {
  let correctness = if correct { 1.0 } else { 0.0 };
  let time_norm = if expected_time_sec.is_finite() && expected_time_sec > 0.0 && time_sec.is_finite() {
    clamp01(1.0 - time_sec / expected_time_sec)
  } else {
    0.0
  };
  let hint_penalty = (hints_used as f64 * HINT_PENALTY_STEP).min(HINT_PENALTY_CAP);
  clamp01(CORRECTNESS_WEIGHT * correctness + SPEED_WEIGHT * time_norm - hint_penalty)
}

/// Score an attempt, preferring its own expected time over `default_expected`.
/// `None` for records that fail `Attempt::is_well_formed`.
pub fn score_attempt(attempt: &Attempt, default_expected: f64) -> Option<f64> {
  if !attempt.is_well_formed() {
    return None;
  }
  let expected = attempt.expected_time_sec.unwrap_or(default_expected);
  Some(performance_score(attempt.correct, attempt.time_sec, expected, attempt.hints_used))
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  #[test]
  fn fast_correct_no_hints() {
    let s = performance_score(true, 40.0, 60.0, 0);
    assert!((s - 0.8).abs() < 1e-9, "got {s}");
  }

  #[test]
  fn hint_penalty_is_capped() {
    let four = performance_score(true, 0.0, 30.0, 4);
    let ten = performance_score(true, 0.0, 30.0, 10);
    assert!((four - 0.6).abs() < 1e-9);
    assert_eq!(four, ten);
  }

  #[test]
  fn slow_wrong_answer_floors_at_zero() {
    assert_eq!(performance_score(false, 100.0, 30.0, 2), 0.0);
  }

  #[test]
  fn attempt_expected_time_overrides_default() {
    let a = Attempt {
      item_id: "q".into(),
      topic: "loops".into(),
      difficulty: 2,
      correct: true,
      score_pct: 100.0,
      time_sec: 40.0,
      hints_used: 0,
      timestamp: 0,
      expected_time_sec: Some(60.0),
    };
    let s = score_attempt(&a, 30.0).expect("well formed");
    assert!((s - 0.8).abs() < 1e-9);
    let bad = Attempt { time_sec: f64::NAN, ..a };
    assert_eq!(score_attempt(&bad, 30.0), None);
  }

  proptest! {
    #[test]
    fn score_stays_in_unit_range(correct in any::<bool>(), t in 0.0f64..500.0, e in 1.0f64..200.0, h in 0u32..20) {
      let s = performance_score(correct, t, e, h);
      prop_assert!((0.0..=1.0).contains(&s));
    }

    #[test]
    fn correctness_never_lowers_score(t in 0.0f64..500.0, e in 1.0f64..200.0, h in 0u32..20) {
      prop_assert!(performance_score(true, t, e, h) >= performance_score(false, t, e, h));
    }

    #[test]
    fn faster_never_lowers_score(correct in any::<bool>(), a in 0.0f64..200.0, b in 0.0f64..200.0, e in 1.0f64..200.0, h in 0u32..20) {
      let (fast, slow) = if a <= b { (a, b) } else { (b, a) };
      prop_assert!(performance_score(correct, fast, e, h) >= performance_score(correct, slow, e, h));
    }
  }
}
