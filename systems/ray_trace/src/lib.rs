#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure beam traversal system for the Beam Maze engine.
//!
//! [`trace`] is a deterministic function of an immutable grid snapshot and
//! the level's boundary configuration. It never mutates world state; the
//! authoritative world invokes it when a fire command is accepted and
//! broadcasts the produced [`SimulationResult`] as an event.

use std::collections::HashSet;

use beam_maze_core::{
    BoundaryRef, BoundarySide, CellCoord, CellKind, Direction, GridDimension, GridView, Outcome,
    PathStep, SimulationResult, TraceEnd,
};

/// Step ceiling applied by callers that do not override it.
///
/// Guarantees termination even under pathological grid configurations.
pub const DEFAULT_STEP_CEILING: u32 = 512;

/// Position on the unbounded plane containing the grid.
///
/// Signed so the beam can occupy the one-cell margin outside the perimeter
/// where every traversal starts and ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PlanePosition {
    column: i64,
    row: i64,
}

impl PlanePosition {
    const fn advanced(self, heading: Direction) -> Self {
        Self {
            column: self.column + heading.column_delta(),
            row: self.row + heading.row_delta(),
        }
    }

    fn in_grid(self, dimension: GridDimension) -> Option<CellCoord> {
        let side = i64::from(dimension.get());
        if self.column >= 0 && self.column < side && self.row >= 0 && self.row < side {
            let column = u32::try_from(self.column).ok()?;
            let row = u32::try_from(self.row).ok()?;
            Some(CellCoord::new(column, row))
        } else {
            None
        }
    }
}

/// Simulates a single beam traversal through the provided grid snapshot.
///
/// The beam starts one cell outside the grid on the entry side, travels
/// inward, and deflects 90° counter-clockwise whenever it enters an obstacle
/// cell. The traversal ends when the beam crosses the perimeter, revisits a
/// cell under an identical heading, or exhausts `step_ceiling` steps.
/// Anomalous endings are classified results, never errors.
#[must_use]
pub fn trace(
    grid: GridView<'_>,
    entry: BoundaryRef,
    exit: BoundaryRef,
    step_ceiling: u32,
) -> SimulationResult {
    let dimension = grid.dimension();
    let mut position = start_position(entry, dimension);
    let mut heading = entry.side().inward_heading();

    let mut visited: HashSet<(CellCoord, Direction)> = HashSet::new();
    let mut path: Vec<PathStep> = Vec::new();
    let mut last_inside: Option<CellCoord> = None;

    for _ in 0..step_ceiling {
        position = position.advanced(heading);

        let Some(cell) = position.in_grid(dimension) else {
            return match last_inside {
                Some(last) => classified_exit(last, position, dimension, exit, path),
                // Entry configurations that never touch the grid are a
                // level-authoring mistake; report them instead of panicking.
                None => SimulationResult {
                    outcome: Outcome::Lose,
                    exit: None,
                    path,
                    end: TraceEnd::NeverEntered,
                },
            };
        };

        // The heading is part of the key: crossing the same cell straight
        // through under a different heading is a legitimate traversal.
        if !visited.insert((cell, heading)) {
            return SimulationResult {
                outcome: Outcome::Lose,
                exit: None,
                path,
                end: TraceEnd::LoopDetected,
            };
        }

        let kind = grid.kind_at(cell).unwrap_or_default();
        path.push(PathStep {
            cell,
            entered_heading: heading,
            kind,
        });

        if kind.is_obstacle() {
            heading = heading.rotated_counter_clockwise();
        }
        last_inside = Some(cell);
    }

    SimulationResult {
        outcome: Outcome::Lose,
        exit: None,
        path,
        end: TraceEnd::StepLimitReached,
    }
}

/// Resolves the entry boundary to the beam's starting position, one cell
/// outside the grid on the entry side.
fn start_position(entry: BoundaryRef, dimension: GridDimension) -> PlanePosition {
    let side = i64::from(dimension.get());
    let index = i64::from(entry.index());
    match entry.side() {
        BoundarySide::Left => PlanePosition {
            column: -1,
            row: index,
        },
        BoundarySide::Right => PlanePosition {
            column: side,
            row: index,
        },
        BoundarySide::Top => PlanePosition {
            column: index,
            row: -1,
        },
        BoundarySide::Bottom => PlanePosition {
            column: index,
            row: side,
        },
    }
}

/// Classifies the boundary crossed by a beam leaving the grid.
///
/// The side comes from the out-of-grid position while the index comes from
/// the last in-grid cell, so the reported boundary always names a real
/// perimeter cell.
fn classified_exit(
    last: CellCoord,
    outside: PlanePosition,
    dimension: GridDimension,
    exit: BoundaryRef,
    path: Vec<PathStep>,
) -> SimulationResult {
    let side = i64::from(dimension.get());
    let crossed = if outside.column < 0 {
        BoundaryRef::new(BoundarySide::Left, last.row())
    } else if outside.column >= side {
        BoundaryRef::new(BoundarySide::Right, last.row())
    } else if outside.row < 0 {
        BoundaryRef::new(BoundarySide::Top, last.column())
    } else {
        BoundaryRef::new(BoundarySide::Bottom, last.column())
    };

    let outcome = if crossed == exit {
        Outcome::Win
    } else {
        Outcome::Lose
    };

    SimulationResult {
        outcome,
        exit: Some(crossed),
        path,
        end: TraceEnd::Exited,
    }
}
