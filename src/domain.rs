//! Domain models used by the engine: courses, tiers, seeds, questions, attempts, items, streaks.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::util::normalize_key;

/// Courses the seed catalog knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Course {
  Python,
  JavaScript,
  React,
  Vue,
  NodeJs,
  Java,
  Html,
  Angular,
  TypeScript,
}

/// Coarse grouping used to pick a code snippet style for a stem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CourseFamily {
  Python,
  JavaScript,
  Jvm,
  Markup,
}

impl Course {
  pub const ALL: [Course; 9] = [
    Course::Python,
    Course::JavaScript,
    Course::React,
    Course::Vue,
    Course::NodeJs,
    Course::Java,
    Course::Html,
    Course::Angular,
    Course::TypeScript,
  ];

  /// Case-insensitive lookup by course id ("python", "nodejs", ...).
  pub fn from_id(id: &str) -> Option<Course> {
    let id = id.trim().to_lowercase();
    Course::ALL.into_iter().find(|c| c.id() == id)
  }

  /// Like `from_id` but unknown ids land on python, the catalog's default course.
  pub fn from_id_or_default(id: &str) -> Course {
    Course::from_id(id).unwrap_or(Course::Python)
  }

  pub fn id(self) -> &'static str {
    match self {
      Course::Python => "python",
      Course::JavaScript => "javascript",
      Course::React => "react",
      Course::Vue => "vue",
      Course::NodeJs => "nodejs",
      Course::Java => "java",
      Course::Html => "html",
      Course::Angular => "angular",
      Course::TypeScript => "typescript",
    }
  }

  pub fn display_name(self) -> &'static str {
    match self {
      Course::Python => "Python",
      Course::JavaScript => "JavaScript",
      Course::React => "React",
      Course::Vue => "Vue",
      Course::NodeJs => "Node.js",
      Course::Java => "Java",
      Course::Html => "HTML",
      Course::Angular => "Angular",
      Course::TypeScript => "TypeScript",
    }
  }

  pub fn family(self) -> CourseFamily {
    match self {
      Course::Python => CourseFamily::Python,
      Course::JavaScript
      | Course::React
      | Course::Vue
      | Course::NodeJs
      | Course::Angular
      | Course::TypeScript => CourseFamily::JavaScript,
      Course::Java => CourseFamily::Jvm,
      Course::Html => CourseFamily::Markup,
    }
  }
}

impl fmt::Display for Course {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.id())
  }
}

/// Seed difficulty tier. Practice items use a wider 1..=5 scale; seeds only span 1..=3.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
  Basic,
  Intermediate,
  Advanced,
}

impl Tier {
  pub const ALL: [Tier; 3] = [Tier::Basic, Tier::Intermediate, Tier::Advanced];

  pub fn level(self) -> u8 {
    match self {
      Tier::Basic => 1,
      Tier::Intermediate => 2,
      Tier::Advanced => 3,
    }
  }

  /// Exact mapping; `None` outside 1..=3.
  pub fn try_from_level(level: u8) -> Option<Tier> {
    Tier::ALL.into_iter().find(|t| t.level() == level)
  }

  /// Clamping mapping for callers holding a 1..=5 item difficulty.
  pub fn from_level(level: u8) -> Tier {
    match level {
      0 | 1 => Tier::Basic,
      2 => Tier::Intermediate,
      _ => Tier::Advanced,
    }
  }

  /// Other tiers ordered by distance, lower tier first on ties.
  pub fn neighbours(self) -> Vec<Tier> {
    let mut others: Vec<Tier> = Tier::ALL.into_iter().filter(|t| *t != self).collect();
    others.sort_by_key(|t| ((t.level() as i16 - self.level() as i16).abs(), t.level()));
    others
  }
}

impl fmt::Display for Tier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.level())
  }
}

/// A parameterized question template. Placeholders: `{course}`, `{topic}`, `{n1}`, `{n2}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuestionSeed {
  pub stem: String,
  pub options: Vec<String>,
  pub answer: String,
  #[serde(default)]
  pub tags: Vec<String>,
}

/// One concrete multiple-choice question.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizedQuestion {
  pub id: String,
  pub question_text: String,
  pub options: Vec<String>,
  pub correct_answer: String,
  #[serde(default)]
  pub explanation: String,
}

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 6;

impl SynthesizedQuestion {
  /// Answer present exactly once, no duplicate options (case/whitespace-insensitive),
  /// and an option count inside [MIN_OPTIONS, MAX_OPTIONS].
  pub fn is_well_formed(&self) -> bool {
    if self.question_text.trim().is_empty() || self.correct_answer.trim().is_empty() {
      return false;
    }
    if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&self.options.len()) {
      return false;
    }
    let keys: Vec<String> = self.options.iter().map(|o| normalize_key(o)).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    sorted.dedup();
    if sorted.len() != keys.len() {
      return false;
    }
    let answer = normalize_key(&self.correct_answer);
    keys.iter().filter(|k| **k == answer).count() == 1
  }
}

/// One learner attempt, as read from the attempt log. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
  pub item_id: String,
  pub topic: String,
  pub difficulty: u8,
  pub correct: bool,
  #[serde(default)]
  pub score_pct: f64,
  pub time_sec: f64,
  #[serde(default)]
  pub hints_used: u32,
  /// Epoch milliseconds.
  #[serde(rename = "ts")]
  pub timestamp: i64,
  #[serde(default)]
  pub expected_time_sec: Option<f64>,
}

impl Attempt {
  /// Records with a blank topic or non-finite / negative numbers are skipped by every consumer.
  pub fn is_well_formed(&self) -> bool {
    !self.topic.trim().is_empty()
      && self.time_sec.is_finite()
      && self.time_sec >= 0.0
      && self.score_pct.is_finite()
      && self.expected_time_sec.map_or(true, |e| e.is_finite() && e > 0.0)
  }
}

/// topic -> mastery in [0, 1].
pub type MasteryMap = HashMap<String, f64>;

/// Mastery assumed for a topic with no attempts yet.
pub const NEUTRAL_MASTERY: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
  Lesson,
  Quiz,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeItem {
  pub id: String,
  #[serde(rename = "type")]
  pub kind: ItemKind,
  pub topic: String,
  /// 1..=5
  pub difficulty: u8,
  #[serde(default)]
  pub estimated_minutes: u32,
}

/// Derived from the attempt log on every call; never stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
  pub current_streak: u32,
  pub best_streak: u32,
  /// Oldest first; index 6 is today.
  pub week_activity: [bool; 7],
  pub last_active_day: Option<NaiveDate>,
}
