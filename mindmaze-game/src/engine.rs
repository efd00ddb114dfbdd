//! Traversal engine: player movement, visitation memory and the locked-cell challenge
//! sub-state-machine.
//!
//! All mutation of the grid and player goes through [`MazeSession::step`],
//! [`MazeSession::deliver_challenge`] and [`MazeSession::resolve_challenge`]. Moves are only
//! accepted while the status is `Playing`, so at most one challenge is ever in flight.
//! Every level start and reset bumps the epoch; challenge content tagged with an older
//! epoch is discarded on arrival.
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, MazeConfig};
use crate::event::{BlockReason, EventSink, MazeEvent, NullSink};
use crate::generator::{GenerationError, GeneratorParams, MazeLayout, generate_with};
use crate::grid::{CellType, Direction, Grid, Position};
use crate::level::{Dimensions, SizePolicy};
use crate::question::{QuestionData, QuestionError};
use crate::rng::{CountingRng, RngBundle};
use crate::visibility::FogView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    Idle,
    Playing,
    /// Waiting for challenge content.
    Generating,
    /// Question on screen, waiting for an answer.
    Challenge,
    Won,
    /// Reserved for front-ends; the engine never enters it.
    GameOver,
}

/// Snapshot the presentation layer renders alongside the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub level: u32,
    pub score: u32,
    pub status: GameStatus,
    pub rows: usize,
    pub cols: usize,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            level: 1,
            score: 0,
            status: GameStatus::Idle,
            rows: 0,
            cols: 0,
        }
    }
}

/// Handle for one in-flight challenge-content request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChallengeTicket {
    pub epoch: u64,
    pub serial: u64,
    pub target: Position,
    /// Difficulty hint for the provider; the current level.
    pub difficulty: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MoveOutcome {
    Moved { from: Position, to: Position },
    Won { at: Position },
    ChallengeRequested(ChallengeTicket),
}

/// Rejected moves. None of these change any state.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum MoveError {
    #[error("move {direction:?} from {from:?} leaves the grid")]
    OutOfBounds { from: Position, direction: Direction },
    #[error("wall blocks {direction:?} from {from:?}")]
    WallBlocked { from: Position, direction: Direction },
    #[error("({dx}, {dy}) is not a unit step")]
    InvalidDirection { dx: i32, dy: i32 },
    #[error("moves are not accepted while {status:?}")]
    NotPlaying { status: GameStatus },
}

impl MoveError {
    #[must_use]
    pub const fn reason(&self) -> BlockReason {
        match self {
            Self::OutOfBounds { .. } => BlockReason::OutOfBounds,
            Self::WallBlocked { .. } => BlockReason::Wall,
            Self::InvalidDirection { .. } => BlockReason::InvalidDirection,
            Self::NotPlaying { .. } => BlockReason::NotPlaying,
        }
    }
}

/// Reasons challenge content was not accepted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChallengeError {
    #[error("challenge ticket is stale (epoch {ticket_epoch}, current {current_epoch})")]
    Stale {
        ticket_epoch: u64,
        current_epoch: u64,
    },
    #[error("no challenge is waiting for content")]
    NoPendingChallenge,
    #[error(transparent)]
    InvalidQuestion(#[from] QuestionError),
}

/// Result of answering a challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeResolution {
    pub target: Position,
    pub correct: bool,
    pub won: bool,
    pub score: u32,
}

#[derive(Debug, Clone)]
struct PendingChallenge {
    ticket: ChallengeTicket,
    question: Option<QuestionData>,
}

/// One player's run: current level grid, player position, score and status.
#[derive(Debug, Clone)]
pub struct MazeSession<S: EventSink = NullSink> {
    cfg: MazeConfig,
    rngs: RngBundle,
    state: GameState,
    layout: Option<MazeLayout>,
    player: Position,
    pending: Option<PendingChallenge>,
    epoch: u64,
    serial: u64,
    sink: S,
}

impl MazeSession<NullSink> {
    /// Construct an idle session with no event subscriber.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when `cfg` fails validation.
    pub fn new(seed: u64, cfg: MazeConfig) -> Result<Self, ConfigError> {
        Self::with_sink(seed, cfg, NullSink)
    }
}

impl<S: EventSink> MazeSession<S> {
    /// Construct an idle session that reports events to `sink`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when `cfg` fails validation.
    pub fn with_sink(seed: u64, cfg: MazeConfig, sink: S) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            rngs: RngBundle::from_user_seed(seed),
            state: GameState::default(),
            layout: None,
            player: Position::default(),
            pending: None,
            epoch: 0,
            serial: 0,
            sink,
        })
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub const fn status(&self) -> GameStatus {
        self.state.status
    }

    #[must_use]
    pub const fn config(&self) -> &MazeConfig {
        &self.cfg
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.rngs.seed()
    }

    #[must_use]
    pub const fn player(&self) -> Position {
        self.player
    }

    #[must_use]
    pub const fn layout(&self) -> Option<&MazeLayout> {
        self.layout.as_ref()
    }

    #[must_use]
    pub fn grid(&self) -> Option<&Grid> {
        self.layout.as_ref().map(|layout| &layout.grid)
    }

    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Locked cell currently being challenged, if any.
    #[must_use]
    pub fn challenge_target(&self) -> Option<Position> {
        self.pending.as_ref().map(|pending| pending.ticket.target)
    }

    /// Question on screen while in `Challenge`.
    #[must_use]
    pub fn current_question(&self) -> Option<&QuestionData> {
        self.pending
            .as_ref()
            .and_then(|pending| pending.question.as_ref())
    }

    #[must_use]
    pub fn fog(&self) -> Option<FogView<'_>> {
        self.grid()
            .map(|grid| FogView::new(grid, self.player, &self.cfg.visibility))
    }

    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    pub const fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Random stream reserved for offline question selection.
    pub fn quiz_rng(&mut self) -> &mut CountingRng<SmallRng> {
        self.rngs.quiz()
    }

    /// Begin a new run at level 1 with a zero score.
    ///
    /// # Errors
    ///
    /// Propagates `GenerationError` from the maze generator.
    pub fn start_game(&mut self) -> Result<(), GenerationError> {
        self.state.score = 0;
        self.start_level(1)
    }

    /// Generate and enter `level`, sized by the configured growth policy.
    ///
    /// # Errors
    ///
    /// Propagates `GenerationError` from the maze generator.
    pub fn start_level(&mut self, level: u32) -> Result<(), GenerationError> {
        let dims = self.cfg.sizing.dimensions(level);
        self.start_level_sized(level, dims)
    }

    /// Generate and enter `level` using an external size policy.
    ///
    /// # Errors
    ///
    /// Propagates `GenerationError` from the maze generator.
    pub fn start_level_with<P: SizePolicy + ?Sized>(
        &mut self,
        level: u32,
        policy: &P,
    ) -> Result<(), GenerationError> {
        self.start_level_sized(level, policy.dimensions(level))
    }

    /// Generate and enter `level` with explicit dimensions.
    ///
    /// # Errors
    ///
    /// Propagates `GenerationError` from the maze generator.
    pub fn start_level_sized(
        &mut self,
        level: u32,
        dims: Dimensions,
    ) -> Result<(), GenerationError> {
        let params = GeneratorParams::from(&self.cfg);
        let layout = generate_with(dims.cols, dims.rows, params, self.rngs.maze())?;
        self.load_level(level, layout);
        Ok(())
    }

    /// Enter `level` on a prebuilt layout.
    ///
    /// A layout whose start is its end (a 1x1 maze) is won on entry.
    pub fn load_level(&mut self, level: u32, mut layout: MazeLayout) {
        self.bump_epoch();
        let won_on_entry = layout.start == layout.end;
        layout.grid.mark_visited(layout.start);
        self.player = layout.start;
        self.state.level = level;
        self.state.cols = layout.grid.cols();
        self.state.rows = layout.grid.rows();
        self.state.status = GameStatus::Playing;
        self.layout = Some(layout);
        log::info!(
            "level {level} started on a {}x{} maze",
            self.state.cols,
            self.state.rows
        );
        self.emit(MazeEvent::LevelStarted {
            level,
            cols: self.state.cols,
            rows: self.state.rows,
        });
        if won_on_entry {
            self.win();
        }
    }

    /// Advance to the next level after a win. Returns `false` when not in `Won`.
    ///
    /// # Errors
    ///
    /// Propagates `GenerationError` from the maze generator.
    pub fn next_level(&mut self) -> Result<bool, GenerationError> {
        if self.state.status != GameStatus::Won {
            return Ok(false);
        }
        self.start_level(self.state.level.saturating_add(1))?;
        Ok(true)
    }

    /// Abandon the level and return to `Idle`. Any in-flight challenge becomes stale.
    pub fn reset(&mut self) {
        self.bump_epoch();
        self.state.status = GameStatus::Idle;
        log::debug!("session reset to idle (epoch {})", self.epoch);
    }

    /// Attempt a unit move given as a coordinate delta.
    ///
    /// # Errors
    ///
    /// Returns `MoveError` when the move is rejected; state is left untouched.
    pub fn attempt_move(&mut self, dx: i32, dy: i32) -> Result<MoveOutcome, MoveError> {
        match Direction::from_delta(dx, dy) {
            Some(dir) => self.step(dir),
            None => Err(self.blocked(MoveError::InvalidDirection { dx, dy })),
        }
    }

    /// Attempt to move one cell in `dir`.
    ///
    /// # Errors
    ///
    /// Returns `MoveError` when the move is rejected; state is left untouched.
    pub fn step(&mut self, dir: Direction) -> Result<MoveOutcome, MoveError> {
        let from = self.player;
        let status = self.state.status;
        let checked = match self.layout.as_ref() {
            Some(layout) if status == GameStatus::Playing => Self::check_step(layout, from, dir),
            _ => Err(MoveError::NotPlaying { status }),
        };
        let (to, target_kind, end) = match checked {
            Ok(found) => found,
            Err(err) => return Err(self.blocked(err)),
        };

        if target_kind == CellType::Locked {
            return Ok(MoveOutcome::ChallengeRequested(self.request_challenge(to)));
        }

        if let Some(layout) = self.layout.as_mut() {
            layout.grid.mark_visited(to);
        }
        self.player = to;
        self.emit(MazeEvent::Moved { from, to });

        if to == end {
            self.win();
            return Ok(MoveOutcome::Won { at: to });
        }
        Ok(MoveOutcome::Moved { from, to })
    }

    /// Supply content for an outstanding challenge request.
    ///
    /// Content for a ticket from an abandoned level is discarded and reported as
    /// `ChallengeError::Stale`; callers may ignore it.
    ///
    /// # Errors
    ///
    /// Returns `ChallengeError` when the ticket is stale, nothing is waiting for content,
    /// or the question is malformed. State is unchanged in every error case.
    pub fn deliver_challenge(
        &mut self,
        ticket: ChallengeTicket,
        question: QuestionData,
    ) -> Result<(), ChallengeError> {
        if ticket.epoch != self.epoch {
            log::debug!(
                "discarding challenge content for epoch {} (current {})",
                ticket.epoch,
                self.epoch
            );
            return Err(ChallengeError::Stale {
                ticket_epoch: ticket.epoch,
                current_epoch: self.epoch,
            });
        }
        question.validate()?;

        let waiting = self.state.status == GameStatus::Generating;
        let Some(pending) = self.pending.as_mut().filter(|p| waiting && p.ticket == ticket) else {
            return Err(ChallengeError::NoPendingChallenge);
        };
        pending.question = Some(question);
        self.state.status = GameStatus::Challenge;
        self.emit(MazeEvent::ChallengeReady {
            target: ticket.target,
        });
        Ok(())
    }

    /// Answer the current question by option index. No-op outside `Challenge`.
    pub fn answer(&mut self, choice: usize) -> Option<ChallengeResolution> {
        let correct = self.current_question()?.is_correct(choice);
        self.resolve_challenge(correct)
    }

    /// Apply the outcome of the current challenge. No-op outside `Challenge`.
    pub fn resolve_challenge(&mut self, correct: bool) -> Option<ChallengeResolution> {
        if self.state.status != GameStatus::Challenge {
            return None;
        }
        let pending = self.pending.take()?;
        let target = pending.ticket.target;
        let scoring = self.cfg.scoring;
        let mut won = false;

        if correct {
            let end = self.layout.as_mut().map(|layout| {
                layout.grid.set_kind(target, CellType::Open);
                layout.grid.mark_visited(target);
                layout.end
            });
            self.player = target;
            if end == Some(target) {
                self.state.score = self.state.score.saturating_add(scoring.finish_bonus);
                won = true;
            } else {
                self.state.score = self.state.score.saturating_add(scoring.unlock_reward);
                self.state.status = GameStatus::Playing;
            }
        } else {
            self.state.score = self
                .state
                .score
                .saturating_sub(scoring.wrong_answer_penalty);
            self.state.status = GameStatus::Playing;
        }

        self.emit(MazeEvent::ChallengeResolved {
            target,
            correct,
            score: self.state.score,
        });
        if won {
            self.win();
        }
        Some(ChallengeResolution {
            target,
            correct,
            won,
            score: self.state.score,
        })
    }

    /// Bounds and wall checks for a step; yields the target, its type and the level end.
    fn check_step(
        layout: &MazeLayout,
        from: Position,
        dir: Direction,
    ) -> Result<(Position, CellType, Position), MoveError> {
        let grid = &layout.grid;
        let out_of_bounds = MoveError::OutOfBounds {
            from,
            direction: dir,
        };
        let to = from
            .step(dir, grid.cols(), grid.rows())
            .ok_or(out_of_bounds)?;
        if !grid.is_open(from, dir) {
            return Err(MoveError::WallBlocked {
                from,
                direction: dir,
            });
        }
        let kind = grid.get(to).map(|cell| cell.kind).ok_or(out_of_bounds)?;
        Ok((to, kind, layout.end))
    }

    fn request_challenge(&mut self, target: Position) -> ChallengeTicket {
        self.serial = self.serial.wrapping_add(1);
        let ticket = ChallengeTicket {
            epoch: self.epoch,
            serial: self.serial,
            target,
            difficulty: self.state.level,
        };
        self.pending = Some(PendingChallenge {
            ticket,
            question: None,
        });
        self.state.status = GameStatus::Generating;
        log::debug!("challenge requested for {target:?} (epoch {})", self.epoch);
        self.emit(MazeEvent::ChallengeRequested {
            target,
            epoch: self.epoch,
        });
        ticket
    }

    fn win(&mut self) {
        self.state.status = GameStatus::Won;
        log::info!(
            "level {} cleared with score {}",
            self.state.level,
            self.state.score
        );
        self.emit(MazeEvent::Won {
            level: self.state.level,
            score: self.state.score,
        });
    }

    fn blocked(&mut self, err: MoveError) -> MoveError {
        self.emit(MazeEvent::MoveBlocked {
            at: self.player,
            reason: err.reason(),
        });
        err
    }

    fn bump_epoch(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        self.pending = None;
    }

    fn emit(&mut self, event: MazeEvent) {
        self.sink.notify(&event);
    }
}
