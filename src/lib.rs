//! Adaptive practice-question engine.
//!
//! - Seed catalog + variant synthesis for multiple-choice questions
//! - Dedup/augment pipeline backed by a per-(course, topic, tier) LRU of recent fingerprints
//! - Performance scoring, EWMA mastery tracking and greedy next-item selection
//! - Daily streaks over a configurable calendar-day boundary
//!
//! `PracticeEngine` bundles the stateful parts; the free functions in each module are usable
//! on their own.

pub mod analytics;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod mastery;
pub mod pipeline;
pub mod recency;
pub mod scoring;
pub mod seeds;
pub mod selector;
pub mod source;
pub mod streak;
pub mod synth;
pub mod telemetry;
pub mod util;

pub use config::EngineConfig;
pub use domain::{
    Attempt, Course, ItemKind, MasteryMap, PracticeItem, QuestionSeed, StreakState, SynthesizedQuestion, Tier,
};
pub use engine::PracticeEngine;
pub use error::{ConfigError, SourceError};
pub use fingerprint::Fingerprint;
pub use mastery::{MasteryTracker, MasteryUpdate};
pub use source::{QuestionSource, SourceRequest};
