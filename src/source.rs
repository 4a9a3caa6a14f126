//! Optional external question sourcing.
//!
//! The engine treats any source as a black box that may return zero or more raw questions.
//! `fetch_absorbing` bounds the call with a timeout and turns every failure into
//! "no candidates", so a broken source can never surface to the pipeline's caller.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, instrument, warn};

use crate::domain::{Course, SynthesizedQuestion, Tier};
use crate::error::SourceError;
use crate::util::trunc_for_log;

#[derive(Clone, Debug)]
pub struct SourceRequest {
  pub course: Course,
  pub topic: String,
  pub tier: Tier,
  pub count: usize,
}

#[async_trait]
pub trait QuestionSource: Send + Sync {
  /// Short name used in logs.
  fn name(&self) -> &str;

  async fn fetch(&self, request: &SourceRequest) -> Result<Vec<SynthesizedQuestion>, SourceError>;
}

/// Call the source with a deadline. Errors, timeouts and malformed questions all count as zero.
#[instrument(level = "debug", skip(source, request), fields(source = source.name(), count = request.count))]
pub async fn fetch_absorbing(
  source: &dyn QuestionSource,
  request: &SourceRequest,
  timeout_ms: u64,
) -> Vec<SynthesizedQuestion> {
  let result = match tokio::time::timeout(Duration::from_millis(timeout_ms), source.fetch(request)).await {
    Ok(r) => r,
    Err(_) => Err(SourceError::Timeout(timeout_ms)),
  };
  match result {
    Ok(questions) => {
      let total = questions.len();
      let kept: Vec<SynthesizedQuestion> = questions.into_iter().filter(|q| q.is_well_formed()).collect();
      if kept.len() < total {
        let e = SourceError::Malformed(format!("{} of {total} questions failed validation", total - kept.len()));
        warn!(target: "practice", source = source.name(), error = %e, "Dropped malformed questions from external source");
      }
      kept
    }
    Err(e) => {
      error!(target: "practice", source = source.name(), course = %request.course, topic = %request.topic, error = %trunc_for_log(&e.to_string(), 300), "External question source failed; continuing with local synthesis");
      Vec::new()
    }
  }
}
