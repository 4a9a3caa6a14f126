//! Question identity independent of formatting and option order.

use std::fmt;

use crate::domain::SynthesizedQuestion;
use crate::util::normalize_key;

/// `<len>:<stem>::<len>:<opt>|<len>:<opt>...` over collapsed lowercase text, options sorted.
/// Byte-length prefixes keep separators inside options from colliding.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
  pub fn of(q: &SynthesizedQuestion) -> Self {
    Self::from_parts(&q.question_text, &q.options)
  }

  pub fn from_parts(stem: &str, options: &[String]) -> Self {
    let mut opts: Vec<String> = options.iter().map(|o| normalize_key(o)).collect();
    opts.sort();
    let opts: Vec<String> = opts.iter().map(|o| format!("{}:{o}", o.len())).collect();
    let stem = normalize_key(stem);
    Fingerprint(format!("{}:{stem}::{}", stem.len(), opts.join("|")))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for Fingerprint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}
