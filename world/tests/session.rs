use beam_maze_core::{
    BoundaryRef, BoundarySide, CellCoord, CellKind, Command, Event, FireError, GridDimension,
    Outcome, SessionMode,
};
use beam_maze_world::{apply, query, World};

fn drain(world: &mut World, commands: Vec<Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        apply(world, command, &mut events);
    }
    events
}

#[test]
fn full_session_round_from_authoring_to_replay() {
    let mut world = World::new();

    // Author a level: 8 cells, one deflector steering the beam to the top.
    let _ = drain(
        &mut world,
        vec![
            Command::ConfigureLevel {
                dimension: GridDimension::new(8),
                entry: BoundaryRef::new(BoundarySide::Left, 3),
                exit: BoundaryRef::new(BoundarySide::Top, 4),
                fixed: vec![CellCoord::new(4, 3)],
            },
            Command::SetSessionMode {
                mode: SessionMode::Play,
            },
        ],
    );
    assert_eq!(query::session_mode(&world), SessionMode::Play);

    // The player drops an obstacle off the beam's path, then fires.
    let events = drain(
        &mut world,
        vec![
            Command::ToggleCell {
                cell: CellCoord::new(6, 6),
            },
            Command::FireRay,
        ],
    );

    let result = match events.as_slice() {
        [Event::CellChanged { kind, .. }, Event::RayTraced { result }] => {
            assert_eq!(*kind, CellKind::PlayerObstacle);
            result.clone()
        }
        other => panic!("expected a toggle and a trace, got {other:?}"),
    };
    assert_eq!(result.outcome, Outcome::Win);
    assert_eq!(result.exit, Some(BoundaryRef::new(BoundarySide::Top, 4)));
    assert!(query::playback_active(&world));

    // A second fire during playback is refused, not queued.
    let events = drain(&mut world, vec![Command::FireRay]);
    assert_eq!(
        events,
        vec![Event::FireRejected {
            reason: FireError::PlaybackActive,
        }],
    );

    // The animator reports completion, the player clears their obstacles
    // and the grid is ready for another round.
    let events = drain(
        &mut world,
        vec![Command::FinishPlayback, Command::ResetPlayerObstacles],
    );
    assert_eq!(
        events,
        vec![
            Event::PlaybackFinished,
            Event::PlayerObstaclesReset { cleared: 1 },
        ],
    );
    assert_eq!(
        query::kind_at(&world, CellCoord::new(6, 6)),
        Some(CellKind::Empty)
    );
    assert_eq!(
        query::kind_at(&world, CellCoord::new(4, 3)),
        Some(CellKind::FixedObstacle),
        "the level's deflector must survive the player reset",
    );
    assert_eq!(query::last_result(&world), Some(&result));
}

#[test]
fn reconfiguring_mid_session_resets_mode_lock_and_result() {
    let mut world = World::new();
    let _ = drain(
        &mut world,
        vec![
            Command::SetSessionMode {
                mode: SessionMode::Play,
            },
            Command::FireRay,
        ],
    );
    assert!(query::playback_active(&world));
    assert!(query::last_result(&world).is_some());

    let events = drain(
        &mut world,
        vec![Command::ConfigureLevel {
            dimension: GridDimension::new(4),
            entry: BoundaryRef::new(BoundarySide::Top, 1),
            exit: BoundaryRef::new(BoundarySide::Bottom, 1),
            fixed: Vec::new(),
        }],
    );

    assert_eq!(
        events,
        vec![Event::LevelConfigured {
            dimension: GridDimension::new(4),
            entry: BoundaryRef::new(BoundarySide::Top, 1),
            exit: BoundaryRef::new(BoundarySide::Bottom, 1),
        }],
    );
    assert_eq!(query::session_mode(&world), SessionMode::Edit);
    assert!(!query::playback_active(&world));
    assert!(query::last_result(&world).is_none());
    assert_eq!(query::dimension(&world), GridDimension::new(4));
}
