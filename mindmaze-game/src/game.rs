//! Synchronous front-end facade: a session bound to a question source.
use crate::config::{ConfigError, MazeConfig};
use crate::engine::{ChallengeError, ChallengeResolution, MazeSession, MoveError, MoveOutcome};
use crate::event::{EventSink, NullSink};
use crate::grid::Direction;
use crate::provider::{QuestionOrigin, QuestionSource, fetch_or_fallback};

/// What one input produced once any challenge content has been fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Moved(MoveOutcome),
    /// A locked cell was hit and its question is now on screen.
    Challenge { origin: QuestionOrigin },
    Blocked(MoveError),
}

/// Session plus provider. Challenge requests are answered inline, falling back to the
/// offline bank, so the caller only ever sees `Playing`, `Challenge` or `Won`.
pub struct MazeGame<Q, S: EventSink = NullSink> {
    session: MazeSession<S>,
    source: Q,
    last_origin: Option<QuestionOrigin>,
}

impl<Q: QuestionSource> MazeGame<Q, NullSink> {
    /// # Errors
    ///
    /// Returns `ConfigError` when `cfg` fails validation.
    pub fn new(seed: u64, cfg: MazeConfig, source: Q) -> Result<Self, ConfigError> {
        Ok(Self::from_session(MazeSession::new(seed, cfg)?, source))
    }
}

impl<Q: QuestionSource, S: EventSink> MazeGame<Q, S> {
    pub const fn from_session(session: MazeSession<S>, source: Q) -> Self {
        Self {
            session,
            source,
            last_origin: None,
        }
    }

    #[must_use]
    pub const fn session(&self) -> &MazeSession<S> {
        &self.session
    }

    pub const fn session_mut(&mut self) -> &mut MazeSession<S> {
        &mut self.session
    }

    pub const fn source_mut(&mut self) -> &mut Q {
        &mut self.source
    }

    /// Origin of the most recently delivered question.
    #[must_use]
    pub const fn last_origin(&self) -> Option<QuestionOrigin> {
        self.last_origin
    }

    pub fn into_session(self) -> MazeSession<S> {
        self.session
    }

    /// Move one cell, fetching challenge content when a locked gate is hit.
    pub fn play(&mut self, dir: Direction) -> Turn {
        match self.session.step(dir) {
            Ok(MoveOutcome::ChallengeRequested(ticket)) => {
                let fetched =
                    fetch_or_fallback(&mut self.source, ticket.difficulty, self.session.quiz_rng());
                let origin = fetched.origin;
                match self.session.deliver_challenge(ticket, fetched.question) {
                    Ok(()) | Err(ChallengeError::Stale { .. }) => {}
                    Err(err) => log::error!("challenge content rejected: {err}"),
                }
                self.last_origin = Some(origin);
                Turn::Challenge { origin }
            }
            Ok(outcome) => Turn::Moved(outcome),
            Err(err) => Turn::Blocked(err),
        }
    }

    /// Answer the question on screen by option index.
    pub fn answer(&mut self, choice: usize) -> Option<ChallengeResolution> {
        self.session.answer(choice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::GameStatus;
    use crate::generator::MazeLayout;
    use crate::grid::{CellType, Grid, Position};
    use crate::provider::{JsonSource, Offline, ProviderError};

    fn gated_corridor() -> MazeLayout {
        let mut grid = Grid::new(3, 1);
        grid.carve(Position::new(0, 0), Direction::Right);
        grid.carve(Position::new(1, 0), Direction::Right);
        grid.set_kind(Position::new(0, 0), CellType::Start);
        grid.set_kind(Position::new(1, 0), CellType::Locked);
        grid.set_kind(Position::new(2, 0), CellType::End);
        MazeLayout {
            grid,
            start: Position::new(0, 0),
            end: Position::new(2, 0),
        }
    }

    #[test]
    fn offline_source_still_presents_a_question() {
        let mut game = MazeGame::new(3, MazeConfig::default(), Offline).unwrap();
        game.session_mut().load_level(1, gated_corridor());
        assert_eq!(
            game.play(Direction::Right),
            Turn::Challenge {
                origin: QuestionOrigin::Offline
            }
        );
        assert_eq!(game.session().status(), GameStatus::Challenge);
        let correct = game.session().current_question().unwrap().correct_index;
        let resolution = game.answer(correct).unwrap();
        assert!(resolution.correct);
        assert_eq!(game.session().state().score, 20);
        assert_eq!(
            game.play(Direction::Right),
            Turn::Moved(MoveOutcome::Won {
                at: Position::new(2, 0)
            })
        );
    }

    #[test]
    fn provider_questions_are_used_when_valid() {
        let source = JsonSource::new(|_difficulty| {
            Ok(r#"{"question":"2+2?","options":["3","4","5","22"],"correctIndex":1,
                   "explanation":"Arithmetic.","category":"logic"}"#
                .to_string())
        });
        let mut game = MazeGame::new(3, MazeConfig::default(), source).unwrap();
        game.session_mut().load_level(1, gated_corridor());
        game.play(Direction::Right);
        assert_eq!(game.last_origin(), Some(QuestionOrigin::Provider));
        assert_eq!(
            game.session().current_question().unwrap().question,
            "2+2?"
        );
    }

    #[test]
    fn failing_provider_falls_back() {
        let source = JsonSource::new(|_difficulty| Err(ProviderError::Timeout));
        let mut game = MazeGame::new(3, MazeConfig::default(), source).unwrap();
        game.session_mut().load_level(1, gated_corridor());
        game.play(Direction::Right);
        assert_eq!(game.last_origin(), Some(QuestionOrigin::Offline));
        assert_eq!(game.session().status(), GameStatus::Challenge);
    }

    #[test]
    fn blocked_input_is_reported() {
        let mut game = MazeGame::new(3, MazeConfig::default(), Offline).unwrap();
        game.session_mut().load_level(1, gated_corridor());
        assert!(matches!(
            game.play(Direction::Up),
            Turn::Blocked(MoveError::OutOfBounds { .. })
        ));
    }
}
