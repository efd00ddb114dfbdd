use mindmaze_game::{
    BlockReason, CellType, ChallengeError, Direction, EventLog, GameStatus, GeneratorParams, Grid,
    MazeConfig, MazeEvent, MazeLayout, MazeSession, MoveError, MoveOutcome, Position,
    QuestionData, generate_with, path_directions, shortest_path,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn question() -> QuestionData {
    QuestionData::from_json(
        r#"{
            "question": "Which source is most reliable for a medical claim?",
            "options": ["A viral post", "A peer-reviewed study", "A celebrity", "A forum"],
            "correctIndex": 1,
            "explanation": "Peer review checks methods and evidence.",
            "category": "source_analysis"
        }"#,
    )
    .unwrap()
}

/// 3x3 level whose only route to the exit is right, right, down, down.
fn corridor() -> MazeLayout {
    let mut grid = Grid::new(3, 3);
    grid.carve(Position::new(0, 0), Direction::Right);
    grid.carve(Position::new(1, 0), Direction::Right);
    grid.carve(Position::new(2, 0), Direction::Down);
    grid.carve(Position::new(2, 1), Direction::Down);
    grid.carve(Position::new(0, 0), Direction::Down);
    grid.carve(Position::new(0, 1), Direction::Right);
    grid.carve(Position::new(0, 1), Direction::Down);
    grid.carve(Position::new(0, 2), Direction::Right);
    grid.set_kind(Position::new(0, 0), CellType::Start);
    grid.set_kind(Position::new(2, 2), CellType::End);
    MazeLayout {
        grid,
        start: Position::new(0, 0),
        end: Position::new(2, 2),
    }
}

fn session(layout: MazeLayout) -> MazeSession<EventLog> {
    let mut session = MazeSession::with_sink(1, MazeConfig::default(), EventLog::new()).unwrap();
    session.load_level(1, layout);
    session
}

#[test]
fn generated_three_by_three_is_walked_to_the_exit() {
    let params = GeneratorParams {
        locked_fraction: 0.0,
        ..GeneratorParams::default()
    };
    let layout = generate_with(3, 3, params, &mut ChaCha20Rng::seed_from_u64(2024)).unwrap();
    let replay = generate_with(3, 3, params, &mut ChaCha20Rng::seed_from_u64(2024)).unwrap();
    assert_eq!(layout, replay);
    assert_eq!(layout.grid.passage_count(), 8);
    assert_eq!(layout.grid.count_kind(CellType::Locked), 0);

    let route = shortest_path(&layout.grid, layout.start, layout.end).unwrap();
    let steps = path_directions(&route);
    assert_eq!(steps.len(), route.len() - 1);
    assert!(steps.len() >= 4);

    let mut session = session(layout);
    let mut last = None;
    for dir in steps {
        last = Some(session.step(dir).unwrap());
    }
    assert_eq!(
        last,
        Some(MoveOutcome::Won {
            at: Position::new(2, 2)
        })
    );
    assert_eq!(session.status(), GameStatus::Won);
    assert_eq!(session.state().score, 0);
    assert_eq!(session.player(), Position::new(2, 2));
}

#[test]
fn walking_the_corridor_wins_without_bonus() {
    let mut session = session(corridor());
    assert_eq!(session.player(), Position::new(0, 0));
    let moves = [(1, 0), (1, 0), (0, 1), (0, 1)];
    let mut last = None;
    for (dx, dy) in moves {
        last = Some(session.attempt_move(dx, dy).unwrap());
    }
    assert_eq!(
        last,
        Some(MoveOutcome::Won {
            at: Position::new(2, 2)
        })
    );
    assert_eq!(session.status(), GameStatus::Won);
    assert_eq!(session.state().score, 0);
    let visited: Vec<_> = session
        .grid()
        .unwrap()
        .cells()
        .filter(|cell| cell.visited)
        .map(|cell| cell.position())
        .collect();
    assert_eq!(visited.len(), 5);

    // further input is ignored once won
    assert_eq!(
        session.attempt_move(-1, 0),
        Err(MoveError::NotPlaying {
            status: GameStatus::Won
        })
    );
    assert_eq!(session.player(), Position::new(2, 2));
}

#[test]
fn blocked_moves_are_idempotent() {
    let mut session = session(corridor());
    session.attempt_move(1, 0).unwrap();
    let grid = session.grid().unwrap().clone();
    let state = session.state().clone();

    for _ in 0..5 {
        // (1,0) has walls above (border) and below
        assert_eq!(session.attempt_move(0, -1).unwrap_err().reason(), BlockReason::OutOfBounds);
        assert_eq!(session.attempt_move(0, 1).unwrap_err().reason(), BlockReason::Wall);
    }
    assert_eq!(session.grid().unwrap(), &grid);
    assert_eq!(session.state(), &state);
    assert_eq!(session.player(), Position::new(1, 0));
    assert_eq!(session.sink().count_blocked(), 10);
}

#[test]
fn locked_neighbour_walks_through_generating_and_challenge() {
    let mut layout = corridor();
    layout.grid.set_kind(Position::new(1, 0), CellType::Locked);
    let mut session = session(layout);

    let outcome = session.attempt_move(1, 0).unwrap();
    let MoveOutcome::ChallengeRequested(ticket) = outcome else {
        panic!("expected challenge, got {outcome:?}");
    };
    assert_eq!(session.status(), GameStatus::Generating);
    assert_eq!(session.challenge_target(), Some(Position::new(1, 0)));
    assert_eq!(session.player(), Position::new(0, 0));

    session.deliver_challenge(ticket, question()).unwrap();
    assert_eq!(session.status(), GameStatus::Challenge);

    let resolution = session.answer(1).unwrap();
    assert!(resolution.correct);
    assert_eq!(resolution.score, 20);
    assert_eq!(session.player(), Position::new(1, 0));
    assert_eq!(
        session.grid().unwrap().get(Position::new(1, 0)).unwrap().kind,
        CellType::Open
    );

    let kinds: Vec<&str> = session
        .sink()
        .events()
        .iter()
        .map(|event| match event {
            MazeEvent::LevelStarted { .. } => "level",
            MazeEvent::ChallengeRequested { .. } => "requested",
            MazeEvent::ChallengeReady { .. } => "ready",
            MazeEvent::ChallengeResolved { .. } => "resolved",
            MazeEvent::Moved { .. } => "moved",
            MazeEvent::MoveBlocked { .. } => "blocked",
            MazeEvent::Won { .. } => "won",
        })
        .collect();
    assert_eq!(kinds, ["level", "requested", "ready", "resolved"]);
}

#[test]
fn scoring_across_answers() {
    let mut layout = corridor();
    layout.grid.set_kind(Position::new(1, 0), CellType::Locked);
    layout.grid.set_kind(Position::new(2, 0), CellType::Locked);
    let mut session = session(layout);

    let challenge = |session: &mut MazeSession<EventLog>, dir: Direction| {
        let Ok(MoveOutcome::ChallengeRequested(ticket)) = session.step(dir) else {
            panic!("expected challenge");
        };
        session.deliver_challenge(ticket, question()).unwrap();
    };

    challenge(&mut session, Direction::Right);
    session.answer(0);
    assert_eq!(session.state().score, 0, "score never goes negative");

    challenge(&mut session, Direction::Right);
    session.answer(1);
    assert_eq!(session.state().score, 20);

    challenge(&mut session, Direction::Right);
    session.answer(3);
    assert_eq!(session.state().score, 10);

    challenge(&mut session, Direction::Right);
    session.answer(1);
    assert_eq!(session.state().score, 30);
    assert_eq!(session.player(), Position::new(2, 0));
}

#[test]
fn content_for_abandoned_level_is_dropped() {
    let mut layout = corridor();
    layout.grid.set_kind(Position::new(1, 0), CellType::Locked);
    let mut session = session(layout.clone());
    let Ok(MoveOutcome::ChallengeRequested(ticket)) = session.step(Direction::Right) else {
        panic!("expected challenge");
    };

    session.reset();
    session.load_level(1, layout);
    assert_eq!(
        session.deliver_challenge(ticket, question()),
        Err(ChallengeError::Stale {
            ticket_epoch: ticket.epoch,
            current_epoch: session.epoch(),
        })
    );
    assert_eq!(session.status(), GameStatus::Playing);
    assert_eq!(session.challenge_target(), None);
}

#[test]
fn autopilot_clears_generated_levels() {
    let mut session = MazeSession::new(0x5EED, MazeConfig::default()).unwrap();
    session.start_game().unwrap();
    for level in 1..=4 {
        let grid = session.grid().unwrap().clone();
        let end = session.layout().unwrap().end;
        let path = shortest_path(&grid, session.player(), end).unwrap();
        for pair in path.windows(2) {
            let dx = pair[1].x as i32 - pair[0].x as i32;
            let dy = pair[1].y as i32 - pair[0].y as i32;
            match session.attempt_move(dx, dy).unwrap() {
                MoveOutcome::ChallengeRequested(ticket) => {
                    session.deliver_challenge(ticket, question()).unwrap();
                    session.answer(1).unwrap();
                }
                MoveOutcome::Moved { .. } | MoveOutcome::Won { .. } => {}
            }
        }
        assert_eq!(session.status(), GameStatus::Won, "level {level}");
        assert_eq!(session.player(), end);
        assert!(session.next_level().unwrap());
    }
    assert_eq!(session.state().level, 5);
}
