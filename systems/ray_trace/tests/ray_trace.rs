use beam_maze_core::{
    BoundaryRef, BoundarySide, CellCoord, CellKind, Direction, GridDimension, GridView, Outcome,
    TraceEnd,
};
use beam_maze_system_ray_trace::{trace, DEFAULT_STEP_CEILING};

fn cells_with_obstacles(dimension: GridDimension, obstacles: &[(u32, u32)]) -> Vec<CellKind> {
    let side = dimension.get() as usize;
    let mut cells = vec![CellKind::Empty; side * side];
    for &(column, row) in obstacles {
        let index = row as usize * side + column as usize;
        cells[index] = CellKind::FixedObstacle;
    }
    cells
}

#[test]
fn straight_crossing_wins_at_the_opposite_boundary() {
    let dimension = GridDimension::new(8);
    let cells = cells_with_obstacles(dimension, &[]);
    let grid = GridView::new(&cells, dimension);

    let result = trace(
        grid,
        BoundaryRef::new(BoundarySide::Left, 3),
        BoundaryRef::new(BoundarySide::Right, 3),
        DEFAULT_STEP_CEILING,
    );

    assert_eq!(result.outcome, Outcome::Win);
    assert_eq!(result.end, TraceEnd::Exited);
    assert_eq!(
        result.exit,
        Some(BoundaryRef::new(BoundarySide::Right, 3)),
        "exit classification must use the last in-grid row",
    );
    assert_eq!(result.path.len(), 8);
    assert!(result
        .path
        .iter()
        .all(|step| step.entered_heading == Direction::East));
}

#[test]
fn straight_crossing_loses_when_exit_differs() {
    let dimension = GridDimension::new(8);
    let cells = cells_with_obstacles(dimension, &[]);
    let grid = GridView::new(&cells, dimension);

    let result = trace(
        grid,
        BoundaryRef::new(BoundarySide::Top, 2),
        BoundaryRef::new(BoundarySide::Bottom, 5),
        DEFAULT_STEP_CEILING,
    );

    assert_eq!(result.outcome, Outcome::Lose);
    assert_eq!(result.end, TraceEnd::Exited);
    assert_eq!(result.exit, Some(BoundaryRef::new(BoundarySide::Bottom, 2)));
}

#[test]
fn every_side_crosses_to_its_opposite_on_an_empty_grid() {
    let dimension = GridDimension::new(5);
    let cells = cells_with_obstacles(dimension, &[]);
    let grid = GridView::new(&cells, dimension);

    let crossings = [
        (BoundarySide::Left, BoundarySide::Right),
        (BoundarySide::Right, BoundarySide::Left),
        (BoundarySide::Top, BoundarySide::Bottom),
        (BoundarySide::Bottom, BoundarySide::Top),
    ];

    for (entry_side, exit_side) in crossings {
        for index in 0..dimension.get() {
            let result = trace(
                grid,
                BoundaryRef::new(entry_side, index),
                BoundaryRef::new(exit_side, index),
                DEFAULT_STEP_CEILING,
            );
            assert_eq!(result.outcome, Outcome::Win, "{entry_side} {index}");
            assert_eq!(result.exit, Some(BoundaryRef::new(exit_side, index)));
        }
    }
}

#[test]
fn obstacle_deflects_the_beam_counter_clockwise() {
    let dimension = GridDimension::new(8);
    let cells = cells_with_obstacles(dimension, &[(4, 3)]);
    let grid = GridView::new(&cells, dimension);

    let result = trace(
        grid,
        BoundaryRef::new(BoundarySide::Left, 3),
        BoundaryRef::new(BoundarySide::Top, 4),
        DEFAULT_STEP_CEILING,
    );

    assert_eq!(result.outcome, Outcome::Win);
    assert_eq!(result.exit, Some(BoundaryRef::new(BoundarySide::Top, 4)));

    let deflection = result
        .path
        .iter()
        .find(|step| step.cell == CellCoord::new(4, 3))
        .expect("beam visits the obstacle cell");
    assert_eq!(deflection.entered_heading, Direction::East);
    assert_eq!(deflection.kind, CellKind::FixedObstacle);

    let after = result
        .path
        .iter()
        .find(|step| step.cell == CellCoord::new(4, 2))
        .expect("beam continues north after the deflection");
    assert_eq!(after.entered_heading, Direction::North);
}

#[test]
fn revisiting_a_cell_under_a_new_heading_is_not_a_loop() {
    // Four deflectors steer the beam across its own earlier path: the cell
    // at (1, 3) is crossed heading east first and heading south later.
    let dimension = GridDimension::new(6);
    let cells = cells_with_obstacles(dimension, &[(5, 3), (5, 0), (1, 0), (1, 4)]);
    let grid = GridView::new(&cells, dimension);

    let result = trace(
        grid,
        BoundaryRef::new(BoundarySide::Left, 3),
        BoundaryRef::new(BoundarySide::Right, 4),
        DEFAULT_STEP_CEILING,
    );

    assert_eq!(result.end, TraceEnd::Exited);
    assert_eq!(result.outcome, Outcome::Win);
    assert_eq!(result.exit, Some(BoundaryRef::new(BoundarySide::Right, 4)));

    let headings: Vec<Direction> = result
        .path
        .iter()
        .filter(|step| step.cell == CellCoord::new(1, 3))
        .map(|step| step.entered_heading)
        .collect();
    assert_eq!(
        headings,
        vec![Direction::East, Direction::South],
        "the crossing cell must appear once per heading",
    );
}

#[test]
fn player_obstacles_deflect_like_fixed_ones() {
    let dimension = GridDimension::new(8);
    let side = dimension.get() as usize;
    let mut cells = vec![CellKind::Empty; side * side];
    cells[3 * side + 4] = CellKind::PlayerObstacle;
    let grid = GridView::new(&cells, dimension);

    let result = trace(
        grid,
        BoundaryRef::new(BoundarySide::Left, 3),
        BoundaryRef::new(BoundarySide::Top, 4),
        DEFAULT_STEP_CEILING,
    );

    assert_eq!(result.outcome, Outcome::Win);
    assert_eq!(result.exit, Some(BoundaryRef::new(BoundarySide::Top, 4)));
}

#[test]
fn misconfigured_entry_reports_never_entered() {
    let dimension = GridDimension::new(4);
    let cells = cells_with_obstacles(dimension, &[]);
    let grid = GridView::new(&cells, dimension);

    // Row 7 does not exist in a 4-cell grid; the beam starts outside and
    // stays outside. This must classify, not panic.
    let result = trace(
        grid,
        BoundaryRef::new(BoundarySide::Left, 7),
        BoundaryRef::new(BoundarySide::Right, 1),
        DEFAULT_STEP_CEILING,
    );

    assert_eq!(result.outcome, Outcome::Lose);
    assert_eq!(result.end, TraceEnd::NeverEntered);
    assert_eq!(result.exit, None);
    assert!(result.path.is_empty());
}

#[test]
fn step_ceiling_bounds_the_traversal() {
    let dimension = GridDimension::new(8);
    let cells = cells_with_obstacles(dimension, &[]);
    let grid = GridView::new(&cells, dimension);

    let result = trace(
        grid,
        BoundaryRef::new(BoundarySide::Left, 0),
        BoundaryRef::new(BoundarySide::Right, 0),
        3,
    );

    assert_eq!(result.outcome, Outcome::Lose);
    assert_eq!(result.end, TraceEnd::StepLimitReached);
    assert_eq!(result.path.len(), 3);
}

#[test]
fn dense_obstacle_fields_terminate_within_the_ceiling() {
    // A checkerboard of deflectors is the most rotation-heavy grid there
    // is; the traversal must still classify an ending within the ceiling.
    let dimension = GridDimension::new(8);
    let side = dimension.get();
    let obstacles: Vec<(u32, u32)> = (0..side)
        .flat_map(|row| (0..side).map(move |column| (column, row)))
        .filter(|(column, row)| (column + row) % 2 == 0)
        .collect();
    let cells = cells_with_obstacles(dimension, &obstacles);
    let grid = GridView::new(&cells, dimension);

    for index in 0..side {
        let result = trace(
            grid,
            BoundaryRef::new(BoundarySide::Left, index),
            BoundaryRef::new(BoundarySide::Right, index),
            DEFAULT_STEP_CEILING,
        );
        assert!(
            result.path.len() <= DEFAULT_STEP_CEILING as usize,
            "traversal from row {index} exceeded the ceiling",
        );
        assert_ne!(result.end, TraceEnd::NeverEntered);
    }
}
