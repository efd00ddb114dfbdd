use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::autopilot::RunSummary;
use super::scenarios::{Scenario, ScenarioCtx};
use super::seeds::SeedInfo;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub share_code: String,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    /// Autopilot summaries, one per successful iteration that played levels.
    pub runs: Vec<RunSummary>,
}

impl ScenarioResult {
    /// Mean score over the recorded autopilot runs.
    #[must_use]
    pub fn average_score(&self) -> Option<f64> {
        if self.runs.is_empty() {
            return None;
        }
        let total: f64 = self.runs.iter().map(|run| f64::from(run.score)).sum();
        #[allow(clippy::cast_precision_loss)]
        let count = self.runs.len() as f64;
        Some(total / count)
    }
}

pub struct LogicTester {
    ctx: ScenarioCtx,
    verbose: bool,
}

impl LogicTester {
    pub const fn new(ctx: ScenarioCtx, verbose: bool) -> Self {
        Self { ctx, verbose }
    }

    pub async fn run_scenario(
        &self,
        scenario: &Scenario,
        seeds: &[SeedInfo],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::with_capacity(seeds.len());
        for seed in seeds {
            if self.verbose {
                println!(
                    "🧪 Testing scenario: {} (seed: {} / {})",
                    scenario.key.bright_white(),
                    seed.seed,
                    seed.share_code()
                );
            }
            results.push(self.run_single_scenario(scenario, seed, iterations).await);
        }
        results
    }

    async fn run_single_scenario(
        &self,
        scenario: &Scenario,
        seed: &SeedInfo,
        iterations: usize,
    ) -> ScenarioResult {
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut durations = Vec::new();
        let mut runs = Vec::new();

        for i in 0..iterations {
            let iteration_seed = seed
                .seed
                .wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));
            let start_time = Instant::now();

            match scenario.run(&self.ctx, iteration_seed).await {
                Ok(summary) => {
                    successes += 1;
                    let duration = start_time.elapsed();
                    durations.push(duration);
                    if self.verbose {
                        println!(
                            "  ✅ Iteration {}/{} passed ({duration:?})",
                            i + 1,
                            iterations
                        );
                    }
                    runs.extend(summary);
                }
                Err(err) => {
                    log::debug!("{} failed on seed {iteration_seed}: {err:?}", scenario.key);
                    let message = format!("Iteration {} (seed {iteration_seed}): {err}", i + 1);
                    if self.verbose {
                        println!(
                            "  ❌ Iteration {}/{} failed: {}",
                            i + 1,
                            iterations,
                            message.clone().red()
                        );
                    }
                    failures.push(message);
                }
            }
        }

        let average_duration = if durations.is_empty() {
            Duration::ZERO
        } else {
            durations.iter().sum::<Duration>() / u32::try_from(durations.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.key.to_string(),
            seed: seed.seed,
            share_code: seed.share_code(),
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            average_duration,
            runs,
        }
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}
