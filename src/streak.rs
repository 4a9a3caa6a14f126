//! Daily streaks derived from attempt timestamps.
//!
//! Timestamps (epoch ms) are cut into calendar days at a configurable UTC offset, duplicates
//! collapse, then:
//! - best streak = longest run of consecutive days
//! - current streak = run ending today, or ending yesterday when today has no activity yet
//! - week activity = last 7 days ending today, oldest first

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Offset, Utc};
use tracing::{debug, instrument, warn};

use crate::domain::StreakState;

#[derive(Clone, Copy, Debug)]
pub struct StreakCalculator {
  offset: FixedOffset,
}

impl StreakCalculator {
  pub fn new(offset: FixedOffset) -> Self {
    Self { offset }
  }

  /// Offsets beyond ±24h are rejected by chrono; those fall back to UTC.
  pub fn from_offset_minutes(minutes: i32) -> Self {
    let offset = minutes
      .checked_mul(60)
      .and_then(FixedOffset::east_opt)
      .unwrap_or_else(|| {
        warn!(target: "mastery", minutes, "Invalid UTC offset for day boundary; using UTC");
        utc_offset()
      });
    Self { offset }
  }

  pub fn offset(&self) -> FixedOffset {
    self.offset
  }

  /// Local calendar day of a timestamp; `None` for values chrono can't represent.
  pub fn local_day(&self, ts_ms: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp_millis(ts_ms).map(|dt| dt.with_timezone(&self.offset).date_naive())
  }

  #[instrument(level = "debug", skip_all)]
  pub fn compute<I>(&self, timestamps: I, now: DateTime<Utc>) -> StreakState
  where
    I: IntoIterator<Item = i64>,
  {
    let mut skipped = 0usize;
    let days: BTreeSet<NaiveDate> = timestamps
      .into_iter()
      .filter_map(|ts| {
        let day = self.local_day(ts);
        if day.is_none() {
          skipped += 1;
        }
        day
      })
      .collect();
    if skipped > 0 {
      warn!(target: "mastery", skipped, "Ignored out-of-range attempt timestamps");
    }

    let today = now.with_timezone(&self.offset).date_naive();
    let yesterday = today - Duration::days(1);

    let week_activity: [bool; 7] =
      std::array::from_fn(|i| days.contains(&(today - Duration::days(6 - i as i64))));

    let state = StreakState {
      current_streak: current_run(&days, today, yesterday),
      best_streak: longest_run(&days),
      week_activity,
      last_active_day: days.last().copied(),
    };
    debug!(target: "mastery", current = state.current_streak, best = state.best_streak, days = days.len(), "Streak computed");
    state
  }
}

impl Default for StreakCalculator {
  fn default() -> Self {
    Self::new(utc_offset())
  }
}

fn utc_offset() -> FixedOffset {
  Utc.fix()
}

fn longest_run(days: &BTreeSet<NaiveDate>) -> u32 {
  let mut best = 0u32;
  let mut run = 0u32;
  let mut prev: Option<NaiveDate> = None;
  for day in days {
    run = match prev {
      Some(p) if *day - p == Duration::days(1) => run + 1,
      _ => 1,
    };
    best = best.max(run);
    prev = Some(*day);
  }
  best
}

fn current_run(days: &BTreeSet<NaiveDate>, today: NaiveDate, yesterday: NaiveDate) -> u32 {
  let mut cursor = if days.contains(&today) {
    today
  } else if days.contains(&yesterday) {
    yesterday
  } else {
    return 0;
  };
  let mut run = 0u32;
  while days.contains(&cursor) {
    run += 1;
    match cursor.pred_opt() {
      Some(p) => cursor = p,
      None => break,
    }
  }
  run
}

/// UTC-day convenience wrapper.
pub fn streak<I>(timestamps: I, now: DateTime<Utc>) -> StreakState
where
  I: IntoIterator<Item = i64>,
{
  StreakCalculator::default().compute(timestamps, now)
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
  }

  fn days_ago(n: i64) -> i64 {
    (now() - Duration::days(n)).timestamp_millis()
  }

  #[test]
  fn empty_log() {
    let s = streak(Vec::new(), now());
    assert_eq!(s.current_streak, 0);
    assert_eq!(s.best_streak, 0);
    assert_eq!(s.week_activity, [false; 7]);
    assert_eq!(s.last_active_day, None);
  }

  #[test]
  fn grace_day_keeps_yesterdays_run() {
    let s = streak(vec![days_ago(1), days_ago(2), days_ago(3)], now());
    assert_eq!(s.current_streak, 3);
    assert_eq!(s.best_streak, 3);
    assert_eq!(s.week_activity, [false, false, false, true, true, true, false]);
  }

  #[test]
  fn run_through_today() {
    let s = streak(vec![days_ago(0), days_ago(1), days_ago(5)], now());
    assert_eq!(s.current_streak, 2);
    assert_eq!(s.best_streak, 2);
    assert_eq!(s.last_active_day, Some(NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()));
  }

  #[test]
  fn gap_before_yesterday_breaks_current() {
    let s = streak(vec![days_ago(2)], now());
    assert_eq!(s.current_streak, 0);
    assert_eq!(s.best_streak, 1);
    assert_eq!(s.last_active_day, Some(NaiveDate::from_ymd_opt(2024, 5, 8).unwrap()));
  }

  #[test]
  fn same_day_duplicates_collapse() {
    let base = days_ago(0);
    let s = streak(vec![base, base - 1_000, base + 60_000, days_ago(1), days_ago(1)], now());
    assert_eq!(s.current_streak, 2);
    assert_eq!(s.best_streak, 2);
  }

  #[test]
  fn best_streak_can_be_in_the_past() {
    let s = streak(vec![days_ago(20), days_ago(19), days_ago(18), days_ago(17), days_ago(0)], now());
    assert_eq!(s.best_streak, 4);
    assert_eq!(s.current_streak, 1);
  }

  #[test]
  fn offset_moves_the_day_boundary() {
    // 2024-05-10 01:00 UTC is still 2024-05-09 in UTC-05:00.
    let late = Utc.with_ymd_and_hms(2024, 5, 10, 1, 0, 0).unwrap().timestamp_millis();
    let utc = StreakCalculator::default();
    let ny = StreakCalculator::from_offset_minutes(-300);
    assert_eq!(utc.local_day(late), NaiveDate::from_ymd_opt(2024, 5, 10));
    assert_eq!(ny.local_day(late), NaiveDate::from_ymd_opt(2024, 5, 9));
  }

  #[test]
  fn invalid_offset_falls_back_to_utc() {
    let calc = StreakCalculator::from_offset_minutes(10_000);
    assert_eq!(calc.offset().local_minus_utc(), 0);
  }

  #[test]
  fn unrepresentable_timestamps_are_skipped() {
    let s = streak(vec![i64::MAX, days_ago(0)], now());
    assert_eq!(s.current_streak, 1);
  }
}
