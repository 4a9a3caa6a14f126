//! Variant synthesis: turn one seed template into one concrete, well-formed question.
//!
//! Steps:
//! 1) Fill `{course}`, `{topic}`, `{n1}`, `{n2}` in stem, options and answer.
//! 2) Make sure the answer sits in the options exactly once (overwrite a random slot if missing).
//! 3) Drop case/whitespace duplicates, then top up with generic topic distractors.
//! 4) Shuffle options; occasionally append a small code snippet to the stem.
//!
//! There is no failure path. Every random draw comes from the caller's `Rng`.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::domain::{Course, CourseFamily, QuestionSeed, SynthesizedQuestion, MAX_OPTIONS, MIN_OPTIONS};
use crate::util::{fill_template, has_placeholder, normalize_key, topic_text};

/// Knobs the synthesizer reads. Usually derived from `EngineConfig`.
#[derive(Clone, Debug)]
pub struct SynthOptions {
  pub snippet_probability: f64,
  pub topic_hint_probability: f64,
  pub min_options: usize,
  pub max_options: usize,
}

impl Default for SynthOptions {
  fn default() -> Self {
    Self::from(&EngineConfig::default())
  }
}

impl From<&EngineConfig> for SynthOptions {
  fn from(cfg: &EngineConfig) -> Self {
    Self {
      snippet_probability: cfg.snippet_probability,
      topic_hint_probability: cfg.topic_hint_probability,
      min_options: cfg.min_options,
      max_options: cfg.max_options,
    }
  }
}

const FALLBACK_ANSWER: &str = "None of the above";

/// The two small integers substituted for `{n1}` / `{n2}`.
pub fn variant_numbers(variant_index: usize) -> (usize, usize) {
  (3 + variant_index % 7, 2 + (variant_index * 2) % 5)
}

fn distractors(topic: &str) -> [String; 4] {
  [
    format!("Not related to {topic}"),
    format!("Common misconception about {topic}"),
    "Looks correct but isn't".to_string(),
    "Edge case answer".to_string(),
  ]
}

fn code_snippet(family: CourseFamily, topic: &str, variant_index: usize) -> Option<String> {
  match family {
    CourseFamily::Python => Some(format!(
      "What is the output?\ncode:\nprint(\"{}\")\nprint({} + {})",
      topic,
      1 + variant_index % 4,
      2 + variant_index % 3
    )),
    CourseFamily::JavaScript => {
      let head: String = topic.chars().take(3).collect();
      Some(format!(
        "What does this log?\ncode:\nconst a = {};\nconsole.log(a + '{}')",
        1 + variant_index % 3,
        head
      ))
    }
    CourseFamily::Jvm => Some(format!(
      "What does this print?\ncode:\nint n = {};\nSystem.out.println(n * {});",
      1 + variant_index % 4,
      2 + variant_index % 3
    )),
    CourseFamily::Markup => None,
  }
}

/// Expand one seed into one question. The result always satisfies `is_well_formed`.
pub fn synthesize<R: Rng + ?Sized>(
  seed: &QuestionSeed,
  course: Course,
  topic: &str,
  variant_index: usize,
  opts: &SynthOptions,
  rng: &mut R,
) -> SynthesizedQuestion {
  let topic_txt = topic_text(topic);
  let course_txt = course.display_name();
  let (n1, n2) = variant_numbers(variant_index);
  let (n1, n2) = (n1.to_string(), n2.to_string());
  let pairs = [
    ("course", course_txt),
    ("topic", topic_txt.as_str()),
    ("n1", n1.as_str()),
    ("n2", n2.as_str()),
  ];

  let mut stem = fill_template(&seed.stem, &pairs);
  if stem.trim().is_empty() {
    stem = format!("Which statement about {topic_txt} in {course_txt} is correct?");
  }
  let mentions_topic = has_placeholder(&seed.stem, "topic")
    || normalize_key(&stem).contains(&normalize_key(&topic_txt));
  if !mentions_topic && rng.gen::<f64>() < opts.topic_hint_probability {
    stem.push_str(&format!(" (topic: {topic_txt})"));
  }

  let mut options: Vec<String> = seed.options.iter().map(|o| fill_template(o, &pairs)).collect();

  // A blank answer template falls back to the first usable option.
  let mut correct = fill_template(&seed.answer, &pairs);
  if correct.trim().is_empty() {
    correct = options
      .iter()
      .find(|o| !o.trim().is_empty())
      .cloned()
      .unwrap_or_else(|| FALLBACK_ANSWER.to_string());
  }
  let correct_key = normalize_key(&correct);

  // Surface variants of the answer collapse onto the canonical text.
  for o in options.iter_mut() {
    if normalize_key(o) == correct_key {
      *o = correct.clone();
    }
  }
  if !options.iter().any(|o| *o == correct) {
    if options.is_empty() {
      options.push(correct.clone());
    } else {
      let slot = rng.gen_range(0..options.len());
      options[slot] = correct.clone();
    }
  }

  let mut seen = HashSet::new();
  options.retain(|o| {
    let key = normalize_key(o);
    !key.is_empty() && seen.insert(key)
  });

  let min_options = opts.min_options.clamp(MIN_OPTIONS, MAX_OPTIONS);
  let max_options = opts.max_options.clamp(min_options, MAX_OPTIONS);
  if options.len() < min_options {
    for d in distractors(&topic_txt) {
      if options.len() >= min_options {
        break;
      }
      if seen.insert(normalize_key(&d)) {
        options.push(d);
      }
    }
  }
  while options.len() > max_options {
    match options.iter().rposition(|o| *o != correct) {
      Some(idx) => {
        options.remove(idx);
      }
      None => break,
    }
  }

  options.shuffle(rng);

  if rng.gen::<f64>() < opts.snippet_probability {
    if let Some(snippet) = code_snippet(course.family(), &topic_txt, variant_index) {
      stem = format!("{stem}\n\n{snippet}");
    }
  }

  SynthesizedQuestion {
    id: format!("generated_{}", Uuid::new_v4()),
    explanation: format!("Because \"{correct}\" is correct for {topic_txt} in {course_txt}."),
    question_text: stem,
    options,
    correct_answer: correct,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Tier;
  use crate::seeds::builtin_seeds;
  use rand::SeedableRng;
  use rand_chacha::ChaCha8Rng;

  fn quiet() -> SynthOptions {
    SynthOptions { snippet_probability: 0.0, topic_hint_probability: 0.0, ..SynthOptions::default() }
  }

  fn seed(stem: &str, options: &[&str], answer: &str) -> QuestionSeed {
    QuestionSeed {
      stem: stem.into(),
      options: options.iter().map(|o| o.to_string()).collect(),
      answer: answer.into(),
      tags: vec![],
    }
  }

  #[test]
  fn every_builtin_seed_synthesizes_well_formed() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let opts = SynthOptions::default();
    for course in Course::ALL {
      for tier in Tier::ALL {
        for s in builtin_seeds(course, tier) {
          for idx in 0..5 {
            let q = synthesize(&s, course, "control-flow", idx, &opts, &mut rng);
            assert!(q.is_well_formed(), "{course}/{tier} idx={idx}: {q:?}");
            assert!(q.options.len() >= 4 && q.options.len() <= 6);
          }
        }
      }
    }
  }

  #[test]
  fn placeholders_are_substituted() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let s = seed("What is {n1} // {n2} in {course} ({topic})?", &["{n1}", "{n2}", "zero", "one"], "{n1}");
    let q = synthesize(&s, Course::Python, "integer-math", 3, &quiet(), &mut rng);
    assert_eq!(q.question_text, "What is 6 // 3 in Python (integer math)?");
    assert_eq!(q.correct_answer, "6");
    assert!(q.explanation.contains("integer math in Python"));
    assert!(q.id.starts_with("generated_"));
  }

  #[test]
  fn missing_answer_overwrites_one_slot() {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let s = seed("Pick one", &["a", "b", "c", "d"], "e");
    let q = synthesize(&s, Course::Java, "basics", 0, &quiet(), &mut rng);
    assert!(q.is_well_formed());
    assert_eq!(q.options.len(), 4);
    assert_eq!(q.options.iter().filter(|o| *o == "e").count(), 1);
  }

  #[test]
  fn duplicate_options_collapse_and_distractors_fill() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let s = seed("Pick one", &["Yes", " yes ", "YES", "No"], "yes");
    let q = synthesize(&s, Course::Html, "forms", 0, &quiet(), &mut rng);
    assert!(q.is_well_formed(), "{q:?}");
    assert_eq!(q.options.len(), 4);
    assert!(q.options.iter().any(|o| o == "Not related to forms"));
  }

  #[test]
  fn answer_only_seed_still_reaches_minimum() {
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let s = seed("Pick one", &[], "only");
    let q = synthesize(&s, Course::Vue, "", 0, &quiet(), &mut rng);
    assert!(q.is_well_formed());
    assert_eq!(q.options.len(), 4);
    assert!(q.options.iter().any(|o| o == "Common misconception about fundamentals"));
  }

  #[test]
  fn blank_answer_falls_back_to_first_option() {
    let mut rng = ChaCha8Rng::seed_from_u64(10);
    let s = seed("Pick one", &["  ", "a", "b"], " ");
    let q = synthesize(&s, Course::Java, "x", 0, &quiet(), &mut rng);
    assert_eq!(q.correct_answer, "a");
    assert!(q.is_well_formed(), "{q:?}");
  }

  #[test]
  fn blank_answer_without_options_uses_generic_answer() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let s = seed("Pick one", &[], "");
    let q = synthesize(&s, Course::Python, "x", 0, &quiet(), &mut rng);
    assert_eq!(q.correct_answer, "None of the above");
    assert_eq!(q.options.len(), 4);
    assert!(q.is_well_formed(), "{q:?}");
  }

  #[test]
  fn blank_stem_gets_a_generic_prompt() {
    let mut rng = ChaCha8Rng::seed_from_u64(12);
    let q = synthesize(&seed("   ", &["a", "b"], "a"), Course::Html, "forms", 0, &quiet(), &mut rng);
    assert_eq!(q.question_text, "Which statement about forms in HTML is correct?");
    assert!(q.is_well_formed());
  }

  #[test]
  fn oversized_option_lists_are_capped_keeping_answer() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let s = seed("Pick", &["1", "2", "3", "4", "5", "6", "7", "8"], "8");
    let q = synthesize(&s, Course::Python, "x", 0, &quiet(), &mut rng);
    assert_eq!(q.options.len(), 6);
    assert!(q.options.contains(&"8".to_string()));
    assert!(q.is_well_formed());
  }

  #[test]
  fn snippet_follows_course_family() {
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    let always = SynthOptions { snippet_probability: 1.0, topic_hint_probability: 0.0, ..SynthOptions::default() };
    let s = seed("Pick", &["a", "b", "c", "d"], "a");
    let py = synthesize(&s, Course::Python, "loops", 1, &always, &mut rng);
    assert!(py.question_text.contains("print(\"loops\")"));
    let js = synthesize(&s, Course::TypeScript, "loops", 1, &always, &mut rng);
    assert!(js.question_text.contains("console.log(a + 'loo')"));
    let html = synthesize(&s, Course::Html, "loops", 1, &always, &mut rng);
    assert_eq!(html.question_text, "Pick");
  }

  #[test]
  fn topic_hint_only_when_stem_lacks_topic() {
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let hint = SynthOptions { snippet_probability: 0.0, topic_hint_probability: 1.0, ..SynthOptions::default() };
    let plain = synthesize(&seed("Pick", &["a", "b"], "a"), Course::Java, "loops", 0, &hint, &mut rng);
    assert_eq!(plain.question_text, "Pick (topic: loops)");
    let has = synthesize(&seed("About {topic}", &["a", "b"], "a"), Course::Java, "loops", 0, &hint, &mut rng);
    assert_eq!(has.question_text, "About loops");
  }

  #[test]
  fn shuffling_varies_order_across_calls() {
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let s = seed("Pick", &["a", "b", "c", "d", "e", "f"], "a");
    let orders: HashSet<Vec<String>> = (0..20)
      .map(|_| synthesize(&s, Course::Python, "x", 0, &quiet(), &mut rng).options)
      .collect();
    assert!(orders.len() > 1);
  }

  #[test]
  fn seeded_rng_pins_the_outcome() {
    let s = seed("Pick", &["a", "b", "c", "d", "e"], "c");
    let a = synthesize(&s, Course::Python, "x", 4, &SynthOptions::default(), &mut ChaCha8Rng::seed_from_u64(42));
    let b = synthesize(&s, Course::Python, "x", 4, &SynthOptions::default(), &mut ChaCha8Rng::seed_from_u64(42));
    assert_eq!(a.options, b.options);
    assert_eq!(a.question_text, b.question_text);
  }
}
