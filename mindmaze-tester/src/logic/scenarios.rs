//! Named QA scenarios. Each one runs against a single seed and either passes or returns
//! the first broken expectation.
use mindmaze_game::numbers::floor_fraction;
use mindmaze_game::question::offline_question;
use mindmaze_game::{
    CellType, ChallengeError, Direction, GameStatus, Grid, MazeConfig, MazeSession, MoveOutcome,
    SizePolicy, path_directions, reachable_count, shortest_path,
};
use std::time::Duration;
use thiserror::Error;

use super::autopilot::{Autopilot, AutopilotError, AutopilotPlan, RunSummary, ScriptedProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioKind {
    Smoke,
    PerfectMazes,
    GateDensity,
    Determinism,
    StaleContent,
    FullRun,
    ProviderTimeout,
}

#[derive(Debug, Clone, Copy)]
pub struct Scenario {
    pub key: &'static str,
    pub description: &'static str,
    pub kind: ScenarioKind,
}

const SCENARIOS: [Scenario; 7] = [
    Scenario {
        key: "smoke",
        description: "Start a game and take one legal step",
        kind: ScenarioKind::Smoke,
    },
    Scenario {
        key: "perfect-mazes",
        description: "Every level is a spanning tree with symmetric walls",
        kind: ScenarioKind::PerfectMazes,
    },
    Scenario {
        key: "gate-density",
        description: "Locked gate count matches the configured fraction",
        kind: ScenarioKind::GateDensity,
    },
    Scenario {
        key: "determinism",
        description: "Identical seeds generate identical levels",
        kind: ScenarioKind::Determinism,
    },
    Scenario {
        key: "stale-content",
        description: "Question content for an abandoned level is discarded",
        kind: ScenarioKind::StaleContent,
    },
    Scenario {
        key: "full-run",
        description: "Autopilot clears consecutive levels with a consistent score",
        kind: ScenarioKind::FullRun,
    },
    Scenario {
        key: "provider-timeout",
        description: "A provider slower than the timeout falls back to the offline bank",
        kind: ScenarioKind::ProviderTimeout,
    },
];

#[must_use]
pub fn list_scenarios() -> impl Iterator<Item = (&'static str, &'static str)> {
    SCENARIOS.iter().map(|s| (s.key, s.description))
}

#[must_use]
pub fn get_scenario(key: &str) -> Option<Scenario> {
    SCENARIOS.iter().copied().find(|s| s.key == key)
}

/// Every scenario key, in registry order.
#[must_use]
pub fn all_keys() -> Vec<String> {
    SCENARIOS.iter().map(|s| s.key.to_string()).collect()
}

/// Inputs shared by every scenario run.
#[derive(Debug, Clone)]
pub struct ScenarioCtx {
    pub cfg: MazeConfig,
    pub levels: u32,
    pub accuracy: f64,
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("expectation failed: {0}")]
    Expectation(String),
    #[error(transparent)]
    Autopilot(#[from] AutopilotError),
    #[error(transparent)]
    Generation(#[from] mindmaze_game::GenerationError),
    #[error(transparent)]
    Config(#[from] mindmaze_game::ConfigError),
}

fn expect(condition: bool, message: impl FnOnce() -> String) -> Result<(), ScenarioError> {
    if condition {
        Ok(())
    } else {
        Err(ScenarioError::Expectation(message()))
    }
}

impl Scenario {
    /// Run once for `seed`. The returned summary is present for autopilot scenarios.
    pub async fn run(
        &self,
        ctx: &ScenarioCtx,
        seed: u64,
    ) -> Result<Option<RunSummary>, ScenarioError> {
        match self.kind {
            ScenarioKind::Smoke => smoke(ctx, seed).map(|()| None),
            ScenarioKind::PerfectMazes => perfect_mazes(ctx, seed).map(|()| None),
            ScenarioKind::GateDensity => gate_density(ctx, seed).map(|()| None),
            ScenarioKind::Determinism => determinism(ctx, seed).map(|()| None),
            ScenarioKind::StaleContent => stale_content(ctx, seed).map(|()| None),
            ScenarioKind::FullRun => full_run(ctx, seed).await.map(Some),
            ScenarioKind::ProviderTimeout => provider_timeout(ctx, seed).await.map(Some),
        }
    }
}

/// Walk the session through `levels` freshly generated levels, handing each grid to `check`.
fn for_each_level<F>(ctx: &ScenarioCtx, seed: u64, mut check: F) -> Result<(), ScenarioError>
where
    F: FnMut(u32, &MazeSession) -> Result<(), ScenarioError>,
{
    let mut session = MazeSession::new(seed, ctx.cfg.clone())?;
    for level in 1..=ctx.levels.max(1) {
        session.start_level(level)?;
        check(level, &session)?;
    }
    Ok(())
}

fn grid_of(session: &MazeSession) -> Result<&Grid, ScenarioError> {
    session
        .grid()
        .ok_or_else(|| ScenarioError::Expectation("no level loaded".to_string()))
}

fn smoke(ctx: &ScenarioCtx, seed: u64) -> Result<(), ScenarioError> {
    let mut session = MazeSession::new(seed, ctx.cfg.clone())?;
    session.start_game()?;
    let dims = ctx.cfg.sizing.dimensions(1);
    expect(session.status() == GameStatus::Playing, || {
        format!("status {:?} after start", session.status())
    })?;
    expect(
        (session.state().cols, session.state().rows) == (dims.cols, dims.rows),
        || format!("level 1 is {}x{}", session.state().cols, session.state().rows),
    )?;
    let start = session.player();
    let step = Direction::ALL
        .into_iter()
        .find(|&dir| session.grid().is_some_and(|grid| grid.is_open(start, dir)));
    let Some(dir) = step else {
        return Err(ScenarioError::Expectation(
            "start cell has no open side".to_string(),
        ));
    };
    match session.step(dir) {
        Ok(MoveOutcome::Moved { .. } | MoveOutcome::ChallengeRequested(_)) => Ok(()),
        other => Err(ScenarioError::Expectation(format!(
            "first step produced {other:?}"
        ))),
    }
}

fn perfect_mazes(ctx: &ScenarioCtx, seed: u64) -> Result<(), ScenarioError> {
    for_each_level(ctx, seed, |level, session| {
        let grid = grid_of(session)?;
        let cells = grid.len();
        expect(grid.passage_count() == cells - 1, || {
            format!(
                "level {level}: {} passages for {cells} cells",
                grid.passage_count()
            )
        })?;
        let start = session.player();
        expect(reachable_count(grid, start) == cells, || {
            format!("level {level}: not every cell reachable")
        })?;
        for cell in grid.cells() {
            let pos = cell.position();
            for (dir, next) in grid.neighbors(pos) {
                expect(
                    grid.is_open(pos, dir) == grid.is_open(next, dir.opposite()),
                    || format!("level {level}: asymmetric wall at {pos:?} {dir:?}"),
                )?;
            }
        }
        Ok(())
    })
}

fn gate_density(ctx: &ScenarioCtx, seed: u64) -> Result<(), ScenarioError> {
    for_each_level(ctx, seed, |level, session| {
        let grid = grid_of(session)?;
        let expected = floor_fraction(grid.len(), ctx.cfg.locked_fraction);
        let locked = grid.count_kind(CellType::Locked);
        expect(locked == expected, || {
            format!("level {level}: {locked} gates, expected {expected}")
        })?;
        let layout = session
            .layout()
            .ok_or_else(|| ScenarioError::Expectation("no layout".to_string()))?;
        let ends_untouched = grid.get(layout.start).map(|c| c.kind) == Some(CellType::Start)
            && grid.get(layout.end).map(|c| c.kind) == Some(CellType::End);
        expect(ends_untouched, || {
            format!("level {level}: gate placed on start or end")
        })
    })
}

fn determinism(ctx: &ScenarioCtx, seed: u64) -> Result<(), ScenarioError> {
    let mut first = Vec::new();
    for_each_level(ctx, seed, |_, session| {
        first.push(grid_of(session)?.clone());
        Ok(())
    })?;
    let mut level_index = 0;
    for_each_level(ctx, seed, |level, session| {
        let same = first.get(level_index) == Some(grid_of(session)?);
        level_index += 1;
        expect(same, || format!("level {level} differs on replay"))
    })
}

fn stale_content(ctx: &ScenarioCtx, seed: u64) -> Result<(), ScenarioError> {
    let mut session = MazeSession::new(seed, ctx.cfg.clone())?;
    session.start_game()?;
    let gate_path = session.layout().and_then(|layout| {
        layout
            .grid
            .cells()
            .filter(|cell| cell.is_locked())
            .find_map(|cell| shortest_path(&layout.grid, layout.start, cell.position()))
    });
    let Some(path) = gate_path else {
        // no gates at this size and fraction; nothing to go stale
        return Ok(());
    };

    let mut ticket = None;
    for dir in path_directions(&path) {
        match session.step(dir) {
            Ok(MoveOutcome::ChallengeRequested(requested)) => {
                ticket = Some(requested);
                break;
            }
            Ok(_) => {}
            Err(err) => return Err(ScenarioError::Expectation(format!("walk failed: {err}"))),
        }
    }
    let Some(ticket) = ticket else {
        return Err(ScenarioError::Expectation(
            "walking to a gate raised no challenge".to_string(),
        ));
    };

    session.reset();
    session.start_game()?;
    let question = offline_question(0)
        .ok_or_else(|| ScenarioError::Expectation("offline bank empty".to_string()))?;
    let result = session.deliver_challenge(ticket, question);
    expect(matches!(result, Err(ChallengeError::Stale { .. })), || {
        format!("stale delivery returned {result:?}")
    })?;
    expect(session.status() == GameStatus::Playing, || {
        format!("status {:?} after stale delivery", session.status())
    })
}

async fn full_run(ctx: &ScenarioCtx, seed: u64) -> Result<RunSummary, ScenarioError> {
    let plan = AutopilotPlan {
        levels: ctx.levels,
        accuracy: ctx.accuracy,
        ..AutopilotPlan::default()
    };
    let summary = Autopilot::new(plan, ctx.cfg.clone())?.run(seed).await?;
    expect(summary.levels_cleared == ctx.levels, || {
        format!("cleared {} of {} levels", summary.levels_cleared, ctx.levels)
    })?;
    expect(summary.score == summary.expected_score, || {
        format!(
            "score {} but answers imply {}",
            summary.score, summary.expected_score
        )
    })?;
    expect(summary.blocked_moves == 0, || {
        format!("{} moves blocked on a solved route", summary.blocked_moves)
    })?;
    Ok(summary)
}

async fn provider_timeout(ctx: &ScenarioCtx, seed: u64) -> Result<RunSummary, ScenarioError> {
    let plan = AutopilotPlan {
        levels: 1,
        accuracy: ctx.accuracy,
        provider: ScriptedProvider {
            delay: Duration::from_millis(200),
        },
        provider_timeout: Duration::from_millis(2),
    };
    let summary = Autopilot::new(plan, ctx.cfg.clone())?.run(seed).await?;
    expect(summary.offline_questions == summary.challenges, || {
        format!(
            "{} of {} questions came from the slow provider",
            summary.challenges - summary.offline_questions,
            summary.challenges
        )
    })?;
    Ok(summary)
}
