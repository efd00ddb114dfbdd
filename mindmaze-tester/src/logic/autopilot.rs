//! Scripted player: walks the shortest route to each exit and answers gate questions with a
//! configurable accuracy.
use mindmaze_game::question::{OPTION_COUNT, offline_len, offline_question};
use mindmaze_game::{
    AsyncQuestionSource, EventLog, GameStatus, MazeConfig, MazeSession, MoveOutcome,
    ProviderError, QuestionData, QuestionOrigin, fetch_with_timeout, path_directions,
    shortest_path,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Failed answers tolerated on one gate before the run is declared stuck.
const MAX_ATTEMPTS_PER_GATE: u32 = 256;

/// Stand-in for a remote question generator. Replies after `delay`, cycling through the
/// built-in bank so provider questions are distinguishable only by origin.
#[derive(Debug, Clone, Copy)]
pub struct ScriptedProvider {
    pub delay: Duration,
}

impl AsyncQuestionSource for ScriptedProvider {
    type Error = ProviderError;

    async fn fetch(&self, difficulty: u32) -> Result<QuestionData, Self::Error> {
        tokio::time::sleep(self.delay).await;
        let index = usize::try_from(difficulty).unwrap_or(0) % offline_len();
        offline_question(index).ok_or(ProviderError::Unavailable)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AutopilotPlan {
    pub levels: u32,
    /// Probability of answering a gate question correctly, in `(0, 1]`.
    pub accuracy: f64,
    pub provider: ScriptedProvider,
    pub provider_timeout: Duration,
}

impl Default for AutopilotPlan {
    fn default() -> Self {
        Self {
            levels: 3,
            accuracy: 0.75,
            provider: ScriptedProvider {
                delay: Duration::ZERO,
            },
            provider_timeout: Duration::from_millis(250),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    pub levels_cleared: u32,
    pub score: u32,
    pub moves: u32,
    pub blocked_moves: usize,
    pub challenges: u32,
    pub correct_answers: u32,
    pub wrong_answers: u32,
    pub offline_questions: u32,
    /// Score recomputed independently from the answers given.
    pub expected_score: u32,
}

#[derive(Debug, Error)]
pub enum AutopilotError {
    #[error("answer accuracy must be in (0, 1], got {0}")]
    Accuracy(f64),
    #[error(transparent)]
    Config(#[from] mindmaze_game::ConfigError),
    #[error(transparent)]
    Generation(#[from] mindmaze_game::GenerationError),
    #[error("no route from start to exit on level {level}")]
    Unsolvable { level: u32 },
    #[error("move rejected on level {level}: {source}")]
    Move {
        level: u32,
        source: mindmaze_game::MoveError,
    },
    #[error("challenge content rejected: {0}")]
    Challenge(#[from] mindmaze_game::ChallengeError),
    #[error("gate at level {level} still locked after {attempts} answers")]
    Stuck { level: u32, attempts: u32 },
    #[error("level {level} ended in {status:?} instead of won")]
    NotWon { level: u32, status: GameStatus },
}

pub struct Autopilot {
    plan: AutopilotPlan,
    cfg: MazeConfig,
}

impl Autopilot {
    pub fn new(plan: AutopilotPlan, cfg: MazeConfig) -> Result<Self, AutopilotError> {
        if !(plan.accuracy > 0.0 && plan.accuracy <= 1.0) {
            return Err(AutopilotError::Accuracy(plan.accuracy));
        }
        Ok(Self { plan, cfg })
    }

    /// Play `plan.levels` consecutive levels from a fresh game.
    pub async fn run(&self, seed: u64) -> Result<RunSummary, AutopilotError> {
        let mut session = MazeSession::with_sink(seed, self.cfg.clone(), EventLog::new())?;
        let mut answers = ChaCha20Rng::seed_from_u64(seed ^ 0xA11C_E5ED);
        let mut summary = RunSummary {
            seed,
            ..RunSummary::default()
        };

        session.start_game()?;
        for _ in 0..self.plan.levels {
            self.clear_level(&mut session, &mut answers, &mut summary)
                .await?;
            summary.levels_cleared += 1;
            if summary.levels_cleared < self.plan.levels {
                session.next_level()?;
            }
        }

        summary.score = session.state().score;
        summary.blocked_moves = session.sink().count_blocked();
        Ok(summary)
    }

    async fn clear_level(
        &self,
        session: &mut MazeSession<EventLog>,
        answers: &mut ChaCha20Rng,
        summary: &mut RunSummary,
    ) -> Result<(), AutopilotError> {
        let level = session.state().level;
        let route = session
            .layout()
            .and_then(|layout| shortest_path(&layout.grid, layout.start, layout.end))
            .ok_or(AutopilotError::Unsolvable { level })?;
        log::debug!("level {level}: route of {} steps", route.len() - 1);

        for dir in path_directions(&route) {
            let mut attempts = 0;
            loop {
                let outcome = session
                    .step(dir)
                    .map_err(|source| AutopilotError::Move { level, source })?;
                summary.moves += 1;
                let MoveOutcome::ChallengeRequested(ticket) = outcome else {
                    break;
                };

                summary.challenges += 1;
                let fetched = fetch_with_timeout(
                    &self.plan.provider,
                    ticket.difficulty,
                    self.plan.provider_timeout,
                    session.quiz_rng(),
                )
                .await;
                if fetched.origin == QuestionOrigin::Offline {
                    summary.offline_questions += 1;
                }
                let correct_index = fetched.question.correct_index;
                session.deliver_challenge(ticket, fetched.question)?;

                let choice = if answers.gen_bool(self.plan.accuracy) {
                    correct_index
                } else {
                    (correct_index + 1) % OPTION_COUNT
                };
                let scoring = session.config().scoring;
                match session.answer(choice) {
                    Some(resolution) if resolution.correct => {
                        summary.correct_answers += 1;
                        summary.expected_score = summary.expected_score.saturating_add(
                            if resolution.won {
                                scoring.finish_bonus
                            } else {
                                scoring.unlock_reward
                            },
                        );
                        break;
                    }
                    Some(_) => {
                        summary.wrong_answers += 1;
                        summary.expected_score = summary
                            .expected_score
                            .saturating_sub(scoring.wrong_answer_penalty);
                    }
                    None => break,
                }

                attempts += 1;
                if attempts >= MAX_ATTEMPTS_PER_GATE {
                    return Err(AutopilotError::Stuck { level, attempts });
                }
            }
        }

        match session.status() {
            GameStatus::Won => Ok(()),
            status => Err(AutopilotError::NotWon { level, status }),
        }
    }
}
