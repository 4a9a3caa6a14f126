//! Practice engine demo driver.
//!
//! Generates one batch of practice questions and prints it as JSON on stdout.
//! Logs go to stderr.
//!
//! Important env variables:
//!   COURSE              : course id (default "python"; unknown ids fall back to python)
//!   TOPIC               : topic id (default "fundamentals")
//!   DIFFICULTY          : seed tier 1..=3 (default 1)
//!   COUNT               : questions wanted (default 5)
//!   ENGINE_CONFIG_PATH  : path to TOML config (tuning + extra seeds)
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

use practice_engine::telemetry;
use practice_engine::{Course, PracticeEngine, Tier};
use tracing::{info, warn};

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty()).unwrap_or_else(|| default.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init_tracing();

    let engine = PracticeEngine::from_env();

    let course_id = env_or("COURSE", "python");
    let course = Course::from_id(&course_id).unwrap_or_else(|| {
        warn!(target: "practice_engine", %course_id, "Unknown course; using python");
        Course::Python
    });
    let topic = env_or("TOPIC", "fundamentals");
    let tier = Tier::from_level(env_or("DIFFICULTY", "1").parse::<u8>().unwrap_or(1));
    let count = env_or("COUNT", "5").parse::<usize>().unwrap_or(5);

    let questions = engine.generate(course, &topic, tier, count).await;
    info!(target: "practice_engine", %course, %topic, %tier, requested = count, returned = questions.len(), "Batch generated");

    println!("{}", serde_json::to_string_pretty(&questions)?);
    Ok(())
}
