//! Next-item selection: one greedy, stateless pick per call.
//!
//! Mastery maps onto a target difficulty `1 + round(4·m)`; each undone item is ranked by
//! `|difficulty − target|·10 + difficulty` and the lowest key wins. Equal keys keep input order.

use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::domain::{MasteryMap, PracticeItem, NEUTRAL_MASTERY};

pub const MIN_DIFFICULTY: u8 = 1;
pub const MAX_DIFFICULTY: u8 = 5;

/// Difficulty (1..=5) the learner should be practicing at for a mastery level.
pub fn target_difficulty(mastery: f64) -> u8 {
  let m = if mastery.is_finite() { mastery.clamp(0.0, 1.0) } else { NEUTRAL_MASTERY };
  1 + (m * 4.0).round() as u8
}

fn rank_key(item: &PracticeItem, mastery: &MasteryMap) -> u32 {
  let m = mastery.get(&item.topic).copied().unwrap_or(NEUTRAL_MASTERY);
  let target = target_difficulty(m) as i32;
  let difficulty = item.difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY) as i32;
  ((difficulty - target).unsigned_abs() * 10) + difficulty as u32
}

/// `None` once every item is in `done`.
#[instrument(level = "debug", skip_all, fields(items = items.len(), done = done.len()))]
pub fn next_item<'a>(
  items: &'a [PracticeItem],
  done: &HashSet<String>,
  mastery: &MasteryMap,
) -> Option<&'a PracticeItem> {
  let picked = items
    .iter()
    .filter(|it| !done.contains(&it.id))
    .enumerate()
    .min_by_key(|(pos, it)| (rank_key(it, mastery), *pos))
    .map(|(_, it)| it);
  if let Some(it) = picked {
    debug!(target: "mastery", id = %it.id, topic = %it.topic, difficulty = it.difficulty, "Next item chosen");
  }
  picked
}

/// Nudge a step's difficulty by the learner's recent average quiz score (percent).
pub fn adaptive_difficulty(base: u8, average_score_pct: f64) -> u8 {
  let base = base.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);
  if average_score_pct > 85.0 {
    (base + 1).min(MAX_DIFFICULTY)
  } else if average_score_pct < 60.0 {
    (base - 1).max(MIN_DIFFICULTY)
  } else {
    base
  }
}
