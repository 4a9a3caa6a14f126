//! Dedup/augment pipeline: raw candidate batch in, unique shuffled batch of at most
//! `desired` questions out.
//!
//! Flow:
//! 1) Keep the first occurrence of each fingerprint in the incoming batch.
//! 2) When short, ask the external source (if any), then synthesize more variants from the
//!    requested tier, then from neighbouring tiers. New candidates must be unseen in this
//!    batch AND absent from the recency cache.
//! 3) If still short, fall back to candidates that were rejected only for being recent.
//! 4) Shuffle, record every returned fingerprint in the recency cache.
//!
//! Every synthesis loop is bounded, so the pipeline always terminates.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, instrument, warn};

use crate::config::EngineConfig;
use crate::domain::{Course, QuestionSeed, SynthesizedQuestion, Tier};
use crate::fingerprint::Fingerprint;
use crate::recency::{CacheKey, RecencyCache};
use crate::seeds::SeedCatalog;
use crate::source::{fetch_absorbing, QuestionSource, SourceRequest};
use crate::synth::{synthesize, SynthOptions};

/// Largest shortfall requested in one synthesis round or one external-source call.
const MAX_ROUND: usize = 64;
/// Synthesis attempts allowed per seed in one tier, whatever `desired` is.
const MAX_ATTEMPTS_PER_SEED: usize = 64;

/// Oversampled round size for a shortfall: `missing + 2`, capped.
fn round_size(missing: usize) -> usize {
  missing.min(MAX_ROUND) + 2
}

/// What the caller wants back.
#[derive(Clone, Debug)]
pub struct BatchRequest {
  pub course: Course,
  pub topic: String,
  pub tier: Tier,
  pub desired: usize,
}

impl BatchRequest {
  pub fn new(course: Course, topic: impl Into<String>, tier: Tier, desired: usize) -> Self {
    Self { course, topic: topic.into(), tier, desired }
  }
}

/// Running state for one pipeline call.
struct Batch<'c> {
  key: CacheKey,
  desired: usize,
  seen: HashSet<Fingerprint>,
  out: Vec<(Fingerprint, SynthesizedQuestion)>,
  recent_rejects: Vec<(Fingerprint, SynthesizedQuestion)>,
  rejected: HashSet<Fingerprint>,
  cache: &'c RecencyCache,
}

impl<'c> Batch<'c> {
  fn is_full(&self) -> bool {
    self.out.len() >= self.desired
  }

  fn missing(&self) -> usize {
    self.desired.saturating_sub(self.out.len())
  }

  /// Accept a top-up candidate if it is well-formed, new to this batch and not recently served.
  fn offer(&mut self, q: SynthesizedQuestion) -> bool {
    if self.is_full() || !q.is_well_formed() {
      return false;
    }
    let fp = Fingerprint::of(&q);
    if self.seen.contains(&fp) {
      return false;
    }
    if self.cache.contains(&self.key, &fp) {
      if self.rejected.insert(fp.clone()) {
        self.recent_rejects.push((fp, q));
      }
      return false;
    }
    self.seen.insert(fp.clone());
    self.out.push((fp, q));
    true
  }
}

/// Pipeline collaborators. Cheap to build per call.
pub struct Augmenter<'a> {
  pub catalog: &'a SeedCatalog,
  pub synth: SynthOptions,
  pub retry_factor: usize,
  pub borrow_factor: usize,
  pub source: Option<&'a dyn QuestionSource>,
  pub source_timeout_ms: u64,
}

impl<'a> Augmenter<'a> {
  pub fn new(catalog: &'a SeedCatalog, cfg: &EngineConfig) -> Self {
    Self {
      catalog,
      synth: SynthOptions::from(cfg),
      retry_factor: cfg.retry_factor.max(1),
      borrow_factor: cfg.borrow_factor.max(1),
      source: None,
      source_timeout_ms: cfg.source_timeout_ms,
    }
  }

  pub fn with_source(mut self, source: Option<&'a dyn QuestionSource>) -> Self {
    self.source = source;
    self
  }

  #[instrument(level = "info", skip(self, candidates, req, cache, rng), fields(course = %req.course, topic = %req.topic, tier = %req.tier, desired = req.desired, candidates = candidates.len()))]
  pub async fn dedupe_and_augment<R: Rng + Send + ?Sized>(
    &self,
    candidates: Vec<SynthesizedQuestion>,
    req: &BatchRequest,
    cache: &mut RecencyCache,
    rng: &mut R,
  ) -> Vec<SynthesizedQuestion> {
    if req.desired == 0 {
      return Vec::new();
    }

    let mut batch = Batch {
      key: CacheKey::new(req.course, &req.topic, req.tier),
      desired: req.desired,
      seen: HashSet::new(),
      out: Vec::new(),
      recent_rejects: Vec::new(),
      rejected: HashSet::new(),
      cache: &*cache,
    };

    // 1) Batch-local dedup, first occurrence wins.
    let mut malformed = 0usize;
    for q in candidates {
      if batch.is_full() {
        break;
      }
      if !q.is_well_formed() {
        malformed += 1;
        continue;
      }
      let fp = Fingerprint::of(&q);
      if batch.seen.insert(fp.clone()) {
        batch.out.push((fp, q));
      }
    }
    if malformed > 0 {
      warn!(target: "practice", malformed, "Dropped malformed candidates");
    }
    let from_candidates = batch.out.len();

    // 2) Top up: external source first, then local synthesis.
    if !batch.is_full() {
      if let Some(source) = self.source {
        let request = SourceRequest {
          course: req.course,
          topic: req.topic.clone(),
          tier: req.tier,
          count: round_size(batch.missing()),
        };
        for q in fetch_absorbing(source, &request, self.source_timeout_ms).await {
          batch.offer(q);
        }
      }
    }

    let mut variant_index = 0usize;
    if !batch.is_full() {
      let seeds = self.catalog.seeds(req.course, req.tier);
      let budget = req
        .desired
        .saturating_mul(self.retry_factor)
        .min(seeds.len().saturating_mul(MAX_ATTEMPTS_PER_SEED));
      self.synthesize_into(&mut batch, seeds, req, budget, &mut variant_index, rng);
    }
    for tier in req.tier.neighbours() {
      if batch.is_full() {
        break;
      }
      let seeds = self.catalog.seeds(req.course, tier);
      if seeds.is_empty() {
        continue;
      }
      debug!(target: "practice", from = %req.tier, borrow = %tier, missing = batch.missing(), "Borrowing seeds from neighbouring tier");
      let budget = seeds
        .len()
        .saturating_mul(self.borrow_factor.min(MAX_ATTEMPTS_PER_SEED));
      self.synthesize_into(&mut batch, seeds, req, budget, &mut variant_index, rng);
    }

    // 3) Availability over freshness: reuse recently served items rather than come back short.
    let mut reused = 0usize;
    if !batch.is_full() {
      let rejects = std::mem::take(&mut batch.recent_rejects);
      for (fp, q) in rejects {
        if batch.is_full() {
          break;
        }
        if batch.seen.insert(fp.clone()) {
          batch.out.push((fp, q));
          reused += 1;
        }
      }
    }

    // 4) Shuffle and remember.
    let mut out = batch.out;
    out.shuffle(rng);
    let key = batch.key;
    for (fp, _) in &out {
      cache.insert(&key, fp.clone());
    }

    if out.len() < req.desired {
      warn!(target: "practice", returned = out.len(), desired = req.desired, "Seed pool exhausted; returning short batch");
    }
    info!(target: "practice", returned = out.len(), from_candidates, reused, synthesized = variant_index, "Batch ready");
    out.into_iter().map(|(_, q)| q).collect()
  }

  /// Synthesize in rounds of `missing + 2` (capped) until full or `budget` attempts are spent.
  fn synthesize_into<R: Rng + ?Sized>(
    &self,
    batch: &mut Batch<'_>,
    seeds: &[QuestionSeed],
    req: &BatchRequest,
    budget: usize,
    variant_index: &mut usize,
    rng: &mut R,
  ) {
    if seeds.is_empty() {
      return;
    }
    let mut order: Vec<usize> = (0..seeds.len()).collect();
    order.shuffle(rng);

    let mut attempts = 0usize;
    while !batch.is_full() && attempts < budget {
      let round = round_size(batch.missing()).min(budget - attempts);
      let fresh: Vec<SynthesizedQuestion> = (0..round)
        .map(|k| {
          let seed = &seeds[order[(attempts + k) % order.len()]];
          let q = synthesize(seed, req.course, &req.topic, *variant_index, &self.synth, rng);
          *variant_index += 1;
          q
        })
        .collect();
      attempts += round;
      for q in fresh {
        batch.offer(q);
      }
    }
  }
}
