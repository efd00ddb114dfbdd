//! MindMaze Game Engine
//!
//! Platform-agnostic core for the MindMaze quiz labyrinth: perfect-maze generation with
//! locked gates, a traversal engine with a challenge sub-state-machine, fog of war and
//! the question bank. No UI, audio or network code lives here; presentation subscribes
//! through [`EventSink`] and question providers plug in through [`QuestionSource`].

pub mod config;
pub mod engine;
pub mod event;
pub mod game;
pub mod generator;
pub mod grid;
pub mod level;
pub mod numbers;
pub mod provider;
pub mod question;
pub mod render;
pub mod rng;
pub mod seed;
pub mod solver;
pub mod visibility;

// Re-export commonly used types
pub use config::{ConfigError, MazeConfig, ScoringConfig, VisibilityConfig};
pub use engine::{
    ChallengeError, ChallengeResolution, ChallengeTicket, GameState, GameStatus, MazeSession,
    MoveError, MoveOutcome,
};
pub use event::{BlockReason, EventLog, EventSink, MazeEvent, NullSink};
pub use game::{MazeGame, Turn};
pub use generator::{
    GenerationError, GeneratorParams, MazeLayout, generate, generate_with, reachable_count,
};
pub use grid::{Cell, CellType, Direction, Grid, GridError, Position, Walls};
pub use level::{Dimensions, GrowthPolicy, SizePolicy};
pub use provider::{
    Fetched, JsonSource, Offline, ProviderError, QuestionOrigin, QuestionSource,
    fetch_or_fallback,
};
#[cfg(feature = "async")]
pub use provider::{AsyncQuestionSource, fetch_with_timeout};
pub use question::{Category, OPTION_COUNT, QuestionData, QuestionError};
pub use render::{render_ascii, render_fogged};
pub use rng::{CountingRng, RngBundle};
pub use seed::{code_from_entropy, decode_share_code, encode_share_code, parse_seed};
pub use solver::{path_directions, shortest_path};
pub use visibility::{FogView, Visibility, classify};
