//! Engine façade: owns the seed catalog, recency cache, random source and optional
//! external question source, and exposes the boundary operations.
//!
//! This module owns:
//!   - the seed catalog (built-ins + config seeds)
//!   - the recency cache, locked for the whole of each pipeline call so later requests
//!     observe earlier writes in order
//!   - a seeded `StdRng` (reproducible with `with_rng_seed`)
//!   - an optional `QuestionSource`, tried before local synthesis

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::Mutex;
use tracing::{info, instrument};

use crate::config::{load_engine_config_from_env, EngineConfig};
use crate::domain::{
    Attempt, Course, MasteryMap, PracticeItem, QuestionSeed, StreakState, SynthesizedQuestion, Tier,
};
use crate::mastery::{MasteryTracker, MasteryUpdate};
use crate::pipeline::{Augmenter, BatchRequest};
use crate::recency::RecencyCache;
use crate::seeds::SeedCatalog;
use crate::selector;
use crate::source::QuestionSource;
use crate::streak::StreakCalculator;
use crate::synth::{self, SynthOptions};

pub struct PracticeEngine {
    config: EngineConfig,
    catalog: SeedCatalog,
    recency: Mutex<RecencyCache>,
    rng: Mutex<StdRng>,
    source: Option<Box<dyn QuestionSource>>,
    streaks: StreakCalculator,
}

impl PracticeEngine {
    /// Build from env: load config (if any), merge config seeds, seed RNG from entropy.
    #[instrument(level = "info", skip_all)]
    pub fn from_env() -> Self {
        let config = load_engine_config_from_env().unwrap_or_default();
        Self::new(config)
    }

    pub fn new(config: EngineConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic construction for tests and replays.
    pub fn with_rng_seed(config: EngineConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: EngineConfig, rng: StdRng) -> Self {
        let catalog = SeedCatalog::with_extra(&config.seeds);
        let engine = Self {
            recency: Mutex::new(RecencyCache::new(config.recency_capacity)),
            rng: Mutex::new(rng),
            streaks: StreakCalculator::from_offset_minutes(config.utc_offset_minutes),
            source: None,
            catalog,
            config,
        };
        info!(
            target: "practice_engine",
            seeds = engine.catalog.len(),
            recency_capacity = engine.config.recency_capacity,
            utc_offset_minutes = engine.config.utc_offset_minutes,
            "Practice engine ready"
        );
        engine
    }

    /// Replace the catalog wholesale (config seeds are not re-applied).
    pub fn with_catalog(mut self, catalog: SeedCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_source(mut self, source: Box<dyn QuestionSource>) -> Self {
        info!(target: "practice_engine", source = source.name(), "External question source attached");
        self.source = Some(source);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &SeedCatalog {
        &self.catalog
    }

    /// A fresh tracker for one (learner, course), using the configured α and expected time.
    pub fn new_tracker(&self) -> MasteryTracker {
        MasteryTracker::from_config(&self.config)
    }

    /// One question from one seed.
    #[instrument(level = "debug", skip(self, seed), fields(%course, %topic, variant_index))]
    pub async fn synthesize(
        &self,
        seed: &QuestionSeed,
        course: Course,
        topic: &str,
        variant_index: usize,
    ) -> SynthesizedQuestion {
        let opts = SynthOptions::from(&self.config);
        let mut rng = self.rng.lock().await;
        synth::synthesize(seed, course, topic, variant_index, &opts, &mut *rng)
    }

    /// Unique, shuffled batch of at most `desired` questions built from `candidates` plus top-ups.
    pub async fn dedupe_and_augment(
        &self,
        candidates: Vec<SynthesizedQuestion>,
        course: Course,
        topic: &str,
        tier: Tier,
        desired: usize,
    ) -> Vec<SynthesizedQuestion> {
        let req = BatchRequest::new(course, topic, tier, desired);
        let augmenter = Augmenter::new(&self.catalog, &self.config).with_source(self.source.as_deref());
        // Cache first, then RNG; always in this order.
        let mut cache = self.recency.lock().await;
        let mut rng = self.rng.lock().await;
        augmenter
            .dedupe_and_augment(candidates, &req, &mut cache, &mut *rng)
            .await
    }

    /// Quiz generation entry point: no caller candidates, everything comes from the pipeline.
    #[instrument(level = "info", skip(self), fields(%course, %topic, %tier, desired))]
    pub async fn generate(
        &self,
        course: Course,
        topic: &str,
        tier: Tier,
        desired: usize,
    ) -> Vec<SynthesizedQuestion> {
        self.dedupe_and_augment(Vec::new(), course, topic, tier, desired)
            .await
    }

    pub fn record_attempt(
        &self,
        tracker: &mut MasteryTracker,
        attempt: &Attempt,
    ) -> Option<MasteryUpdate> {
        tracker.record_attempt(attempt)
    }

    pub fn next_item<'a>(
        &self,
        items: &'a [PracticeItem],
        done: &HashSet<String>,
        mastery: &MasteryMap,
    ) -> Option<&'a PracticeItem> {
        selector::next_item(items, done, mastery)
    }

    /// Streak over the configured local day boundary.
    pub fn streak<I>(&self, timestamps: I, now: DateTime<Utc>) -> StreakState
    where
        I: IntoIterator<Item = i64>,
    {
        self.streaks.compute(timestamps, now)
    }

    /// Drop every remembered fingerprint.
    pub async fn reset_recency(&self) {
        self.recency.lock().await.clear();
    }
}
