#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state management for Beam Maze.
//!
//! The world owns the obstacle grid, the level's boundary configuration,
//! the session mode and the playback lock. Adapters mutate it exclusively
//! through [`apply`], which executes one [`Command`] atomically and
//! broadcasts [`Event`] values describing what happened. Systems read it
//! exclusively through the [`query`] module.

use beam_maze_core::{
    BoundaryRef, BoundarySide, CellCoord, CellKind, ClearError, Command, Event, FireError,
    GridDimension, GridView, SessionMode, SimulationResult, ToggleError,
};
use beam_maze_system_ray_trace::{trace, DEFAULT_STEP_CEILING};

const DEFAULT_DIMENSION: GridDimension = GridDimension::new(8);
const DEFAULT_ENTRY: BoundaryRef = BoundaryRef::new(BoundarySide::Left, 3);
const DEFAULT_EXIT: BoundaryRef = BoundaryRef::new(BoundarySide::Right, 3);

/// Represents the authoritative Beam Maze session state.
#[derive(Debug)]
pub struct World {
    dimension: GridDimension,
    entry: BoundaryRef,
    exit: BoundaryRef,
    cells: Vec<CellKind>,
    mode: SessionMode,
    playback_active: bool,
    last_result: Option<SimulationResult>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Creates a new session using the reference level configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
            entry: DEFAULT_ENTRY,
            exit: DEFAULT_EXIT,
            cells: empty_cells(DEFAULT_DIMENSION),
            mode: SessionMode::Edit,
            playback_active: false,
            last_result: None,
        }
    }

    fn cell_index(&self, cell: CellCoord) -> Option<usize> {
        if !self.dimension.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.dimension.get()).ok()?;
        Some(row * width + column)
    }

    fn set_cell(&mut self, cell: CellCoord, kind: CellKind) {
        if let Some(index) = self.cell_index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = kind;
            }
        }
    }

    fn kind_at(&self, cell: CellCoord) -> Option<CellKind> {
        self.cell_index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Replaces every cell of the provided kind with empty, returning the
    /// number of cells that changed.
    fn clear_kind(&mut self, kind: CellKind) -> u32 {
        let mut cleared: u32 = 0;
        for slot in self.cells.iter_mut() {
            if *slot == kind {
                *slot = CellKind::Empty;
                cleared = cleared.saturating_add(1);
            }
        }
        cleared
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureLevel {
            dimension,
            entry,
            exit,
            fixed,
        } => {
            world.dimension = dimension;
            world.entry = entry;
            world.exit = exit;
            world.cells = empty_cells(dimension);
            world.mode = SessionMode::Edit;
            world.playback_active = false;
            world.last_result = None;

            // Out-of-range seed coordinates are skipped rather than refused;
            // the adapter validates levels before submitting them.
            for cell in fixed {
                world.set_cell(cell, CellKind::FixedObstacle);
            }

            out_events.push(Event::LevelConfigured {
                dimension,
                entry,
                exit,
            });
        }
        Command::SetSessionMode { mode } => {
            if world.mode != mode {
                world.mode = mode;
                out_events.push(Event::SessionModeChanged { mode });
            }
        }
        Command::ToggleCell { cell } => {
            toggle_cell(world, cell, out_events);
        }
        Command::FireRay => {
            if world.playback_active {
                out_events.push(Event::FireRejected {
                    reason: FireError::PlaybackActive,
                });
                return;
            }

            let result = trace(
                GridView::new(&world.cells, world.dimension),
                world.entry,
                world.exit,
                DEFAULT_STEP_CEILING,
            );
            world.playback_active = true;
            world.last_result = Some(result.clone());
            out_events.push(Event::RayTraced { result });
        }
        Command::FinishPlayback => {
            if world.playback_active {
                world.playback_active = false;
                out_events.push(Event::PlaybackFinished);
            }
        }
        Command::ResetPlayerObstacles => {
            if world.playback_active {
                out_events.push(Event::ResetRejected {
                    reason: ClearError::PlaybackActive,
                });
                return;
            }

            let cleared = world.clear_kind(CellKind::PlayerObstacle);
            out_events.push(Event::PlayerObstaclesReset { cleared });
        }
        Command::ClearFixedObstacles => {
            if world.playback_active {
                out_events.push(Event::ClearRejected {
                    reason: ClearError::PlaybackActive,
                });
                return;
            }
            if world.mode != SessionMode::Edit {
                out_events.push(Event::ClearRejected {
                    reason: ClearError::EditOnly,
                });
                return;
            }

            let cleared = world.clear_kind(CellKind::FixedObstacle);
            out_events.push(Event::FixedObstaclesCleared { cleared });
        }
    }
}

fn toggle_cell(world: &mut World, cell: CellCoord, out_events: &mut Vec<Event>) {
    if world.playback_active {
        out_events.push(Event::ToggleRejected {
            cell,
            reason: ToggleError::PlaybackActive,
        });
        return;
    }

    let Some(kind) = world.kind_at(cell) else {
        out_events.push(Event::ToggleRejected {
            cell,
            reason: ToggleError::OutOfBounds,
        });
        return;
    };

    let next = match (world.mode, kind) {
        // Edit mode cycles through three states asymmetrically: a player
        // obstacle empties first and only a later toggle makes it fixed.
        (SessionMode::Edit, CellKind::Empty) => CellKind::FixedObstacle,
        (SessionMode::Edit, CellKind::FixedObstacle) => CellKind::Empty,
        (SessionMode::Edit, CellKind::PlayerObstacle) => CellKind::Empty,
        (SessionMode::Play, CellKind::Empty) => CellKind::PlayerObstacle,
        (SessionMode::Play, CellKind::PlayerObstacle) => CellKind::Empty,
        (SessionMode::Play, CellKind::FixedObstacle) => {
            out_events.push(Event::ToggleRejected {
                cell,
                reason: ToggleError::FixedDuringPlay,
            });
            return;
        }
    };

    world.set_cell(cell, next);
    out_events.push(Event::CellChanged { cell, kind: next });
}

fn empty_cells(dimension: GridDimension) -> Vec<CellKind> {
    let side = u64::from(dimension.get());
    let capacity = usize::try_from(side * side).unwrap_or(0);
    vec![CellKind::Empty; capacity]
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use beam_maze_core::{BoundaryRef, CellCoord, CellKind, GridDimension, GridView, SessionMode, SimulationResult};

    /// Side length of the configured grid.
    #[must_use]
    pub fn dimension(world: &World) -> GridDimension {
        world.dimension
    }

    /// Boundary cell where the beam enters the grid.
    #[must_use]
    pub fn entry(world: &World) -> BoundaryRef {
        world.entry
    }

    /// Boundary cell the beam must cross to win.
    #[must_use]
    pub fn exit(world: &World) -> BoundaryRef {
        world.exit
    }

    /// Mode the session is currently in.
    #[must_use]
    pub fn session_mode(world: &World) -> SessionMode {
        world.mode
    }

    /// Reports whether a beam playback currently locks the grid.
    #[must_use]
    pub fn playback_active(world: &World) -> bool {
        world.playback_active
    }

    /// Captures a read-only view of the obstacle grid.
    #[must_use]
    pub fn grid_view(world: &World) -> GridView<'_> {
        GridView::new(&world.cells, world.dimension)
    }

    /// Kind held by the provided cell, if it lies in the grid.
    #[must_use]
    pub fn kind_at(world: &World, cell: CellCoord) -> Option<CellKind> {
        world.kind_at(cell)
    }

    /// Result of the most recent accepted fire request, if any.
    #[must_use]
    pub fn last_result(world: &World) -> Option<&SimulationResult> {
        world.last_result.as_ref()
    }
}
