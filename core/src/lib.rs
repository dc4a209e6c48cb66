#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Beam Maze engine.
//!
//! This crate defines the message surface that connects the controller
//! adapter, the authoritative session world, and the pure systems. Adapters
//! and systems submit [`Command`] values describing desired mutations, the
//! world executes those commands via its `apply` entry point, and then
//! broadcasts [`Event`] values describing what actually happened. Systems
//! consume immutable snapshots and respond exclusively with new command
//! batches.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Replaces the level configuration and resets the session.
    ConfigureLevel {
        /// Side length of the square obstacle grid.
        dimension: GridDimension,
        /// Boundary cell where the beam enters the grid.
        entry: BoundaryRef,
        /// Boundary cell the beam must cross to win.
        exit: BoundaryRef,
        /// Cells seeded with permanent obstacles; out-of-range entries are skipped.
        fixed: Vec<CellCoord>,
    },
    /// Requests a transition to the provided session mode.
    SetSessionMode {
        /// Mode the session should activate.
        mode: SessionMode,
    },
    /// Cycles the cell at the provided coordinate per the active mode's policy.
    ToggleCell {
        /// Coordinate of the cell to cycle.
        cell: CellCoord,
    },
    /// Fires the beam through the current grid from the configured entry.
    FireRay,
    /// Reports that the playback collaborator finished animating the beam.
    FinishPlayback,
    /// Clears every player-placed obstacle from the grid.
    ResetPlayerObstacles,
    /// Clears every permanent obstacle; only honored in edit mode.
    ClearFixedObstacles,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a new level configuration became active.
    LevelConfigured {
        /// Side length of the freshly configured grid.
        dimension: GridDimension,
        /// Boundary cell where the beam enters the grid.
        entry: BoundaryRef,
        /// Boundary cell the beam must cross to win.
        exit: BoundaryRef,
    },
    /// Announces that the session entered a new mode.
    SessionModeChanged {
        /// Mode that became active after processing commands.
        mode: SessionMode,
    },
    /// Confirms that a cell transitioned to a new kind.
    CellChanged {
        /// Coordinate of the cell that changed.
        cell: CellCoord,
        /// Kind the cell holds after the change.
        kind: CellKind,
    },
    /// Reports that a toggle request was refused.
    ToggleRejected {
        /// Coordinate provided in the toggle request.
        cell: CellCoord,
        /// Specific reason the toggle was refused.
        reason: ToggleError,
    },
    /// Confirms that player obstacles were cleared from the grid.
    PlayerObstaclesReset {
        /// Number of cells that transitioned back to empty.
        cleared: u32,
    },
    /// Reports that a player-obstacle reset was refused.
    ResetRejected {
        /// Specific reason the reset was refused.
        reason: ClearError,
    },
    /// Confirms that permanent obstacles were cleared from the grid.
    FixedObstaclesCleared {
        /// Number of cells that transitioned back to empty.
        cleared: u32,
    },
    /// Reports that a fixed-obstacle clear was refused.
    ClearRejected {
        /// Specific reason the clear was refused.
        reason: ClearError,
    },
    /// Carries the simulation result produced by an accepted fire request.
    RayTraced {
        /// Immutable outcome of the beam traversal.
        result: SimulationResult,
    },
    /// Reports that a fire request was refused.
    FireRejected {
        /// Specific reason the fire request was refused.
        reason: FireError,
    },
    /// Confirms that the playback lock was released.
    PlaybackFinished,
}

/// Side length of the square obstacle grid measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridDimension(u32);

impl GridDimension {
    /// Creates a new grid dimension wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying side length.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether the provided cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.0 && cell.row() < self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Contents of a single grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// The cell holds nothing; the beam passes straight through.
    #[default]
    Empty,
    /// Obstacle placed by the player during live play.
    PlayerObstacle,
    /// Permanent obstacle defined by the level.
    FixedObstacle,
}

impl CellKind {
    /// Reports whether the cell deflects the beam.
    #[must_use]
    pub const fn is_obstacle(&self) -> bool {
        matches!(self, Self::PlayerObstacle | Self::FixedObstacle)
    }
}

/// Cardinal headings available to the traveling beam.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Travel toward decreasing row indices.
    North,
    /// Travel toward increasing column indices.
    East,
    /// Travel toward increasing row indices.
    South,
    /// Travel toward decreasing column indices.
    West,
}

impl Direction {
    /// Returns the heading after a single 90° counter-clockwise turn.
    ///
    /// Every obstacle contact applies exactly this permutation:
    /// North→West→South→East→North.
    #[must_use]
    pub const fn rotated_counter_clockwise(self) -> Self {
        match self {
            Self::North => Self::West,
            Self::West => Self::South,
            Self::South => Self::East,
            Self::East => Self::North,
        }
    }

    /// Signed column displacement of a single step along the heading.
    #[must_use]
    pub const fn column_delta(self) -> i64 {
        match self {
            Self::East => 1,
            Self::West => -1,
            Self::North | Self::South => 0,
        }
    }

    /// Signed row displacement of a single step along the heading.
    #[must_use]
    pub const fn row_delta(self) -> i64 {
        match self {
            Self::South => 1,
            Self::North => -1,
            Self::East | Self::West => 0,
        }
    }
}

/// Perimeter side of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundarySide {
    /// Side adjacent to row zero.
    Top,
    /// Side adjacent to the final row.
    Bottom,
    /// Side adjacent to column zero.
    Left,
    /// Side adjacent to the final column.
    Right,
}

impl BoundarySide {
    /// Heading that carries the beam from this side into the grid.
    #[must_use]
    pub const fn inward_heading(self) -> Direction {
        match self {
            Self::Top => Direction::South,
            Self::Bottom => Direction::North,
            Self::Left => Direction::East,
            Self::Right => Direction::West,
        }
    }
}

impl fmt::Display for BoundarySide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        };
        write!(f, "{name}")
    }
}

/// Designated boundary cell on the grid perimeter.
///
/// The index counts rows for the left and right sides and columns for the
/// top and bottom sides. Indices are zero-based internally and rendered
/// one-based for players.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundaryRef {
    side: BoundarySide,
    index: u32,
}

impl BoundaryRef {
    /// Creates a new boundary reference.
    #[must_use]
    pub const fn new(side: BoundarySide, index: u32) -> Self {
        Self { side, index }
    }

    /// Perimeter side holding the boundary cell.
    #[must_use]
    pub const fn side(&self) -> BoundarySide {
        self.side
    }

    /// Zero-based row or column index along the side.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Reports whether the index fits the provided grid dimension.
    #[must_use]
    pub const fn fits(&self, dimension: GridDimension) -> bool {
        self.index < dimension.get()
    }
}

impl fmt::Display for BoundaryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.side, self.index.saturating_add(1))
    }
}

/// Describes the active gameplay mode for the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionMode {
    /// Level-authoring mode in which permanent obstacles may be edited.
    Edit,
    /// Live gameplay in which only player obstacles may be toggled.
    Play,
}

/// Instant on the external feed clock measured in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Creates a timestamp from milliseconds on the feed clock.
    #[must_use]
    pub const fn from_millis(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the raw millisecond value.
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Duration elapsed since `earlier`, or `None` when `earlier` is later.
    #[must_use]
    pub fn checked_since(&self, earlier: Timestamp) -> Option<Duration> {
        self.0.checked_sub(earlier.0).map(Duration::from_millis)
    }

    /// Timestamp advanced by the provided duration, saturating on overflow.
    #[must_use]
    pub fn saturating_add(&self, duration: Duration) -> Self {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(millis))
    }
}

/// Validated sensor mat number carried by the external feed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatNumber(u8);

impl MatNumber {
    /// Mat number reserved for the fire/reset command track.
    pub const COMMAND: Self = Self(9);

    /// Creates a mat number, rejecting values outside 1..=9.
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value >= 1 && value <= 9 {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Retrieves the raw mat number.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Reports whether the mat belongs to the command track.
    #[must_use]
    pub const fn is_command(&self) -> bool {
        self.0 == Self::COMMAND.0
    }

    /// Zero-based grid index selected by a coordinate-track mat.
    ///
    /// Returns `None` for the command mat.
    #[must_use]
    pub const fn coordinate_index(&self) -> Option<u32> {
        if self.is_command() {
            None
        } else {
            Some((self.0 - 1) as u32)
        }
    }
}

/// Single sensor activation delivered by the external feed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RawSignal {
    /// Mat that was activated.
    pub mat: MatNumber,
    /// Instant of the activation on the feed clock.
    pub timestamp: Timestamp,
}

/// Final verdict of a beam traversal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The beam left the grid through the configured exit boundary.
    Win,
    /// The beam failed to reach the exit.
    Lose,
}

/// Classifies how a beam traversal ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TraceEnd {
    /// The beam crossed the grid perimeter after traveling inside.
    Exited,
    /// The beam left without ever occupying an in-grid cell.
    NeverEntered,
    /// The beam revisited a cell under an identical heading.
    LoopDetected,
    /// The step ceiling elapsed before the beam left the grid.
    StepLimitReached,
}

impl fmt::Display for TraceEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Exited => "exited",
            Self::NeverEntered => "never entered",
            Self::LoopDetected => "loop detected",
            Self::StepLimitReached => "step limit reached",
        };
        write!(f, "{reason}")
    }
}

/// Single in-grid cell visited by the beam.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PathStep {
    /// Cell the beam occupied.
    pub cell: CellCoord,
    /// Heading the beam carried while entering the cell.
    pub entered_heading: Direction,
    /// Kind the cell held at trace time.
    pub kind: CellKind,
}

/// Immutable outcome of a single beam traversal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationResult {
    /// Final verdict of the traversal.
    pub outcome: Outcome,
    /// Boundary the beam crossed on the way out, when it exited at all.
    pub exit: Option<BoundaryRef>,
    /// Ordered in-grid cells visited by the beam.
    pub path: Vec<PathStep>,
    /// Classification of how the traversal ended.
    pub end: TraceEnd,
}

/// Read-only view into the dense obstacle grid.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    cells: &'a [CellKind],
    dimension: GridDimension,
}

impl<'a> GridView<'a> {
    /// Captures a new grid view backed by the provided cell slice.
    ///
    /// The slice is expected to hold `dimension²` cells in row-major order.
    #[must_use]
    pub const fn new(cells: &'a [CellKind], dimension: GridDimension) -> Self {
        Self { cells, dimension }
    }

    /// Side length of the viewed grid.
    #[must_use]
    pub const fn dimension(&self) -> GridDimension {
        self.dimension
    }

    /// Returns the kind held by the provided cell, if it lies in the grid.
    #[must_use]
    pub fn kind_at(&self, cell: CellCoord) -> Option<CellKind> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.dimension.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.dimension.get()).ok()?;
        Some(row * width + column)
    }
}

/// Reasons a cell toggle request may be refused by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToggleError {
    /// The requested coordinate lies outside the configured grid.
    OutOfBounds,
    /// Permanent obstacles are immutable during live play.
    FixedDuringPlay,
    /// Grid edits are locked while beam playback is in progress.
    PlaybackActive,
}

impl fmt::Display for ToggleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds => write!(f, "cell lies outside the grid"),
            Self::FixedDuringPlay => write!(f, "fixed obstacles cannot change during play"),
            Self::PlaybackActive => write!(f, "grid is locked while the beam is in flight"),
        }
    }
}

/// Reasons a bulk obstacle clear may be refused by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClearError {
    /// Permanent obstacles may only be cleared in edit mode.
    EditOnly,
    /// Grid edits are locked while beam playback is in progress.
    PlaybackActive,
}

impl fmt::Display for ClearError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EditOnly => write!(f, "fixed obstacles can only be cleared in edit mode"),
            Self::PlaybackActive => write!(f, "grid is locked while the beam is in flight"),
        }
    }
}

/// Reasons a fire request may be refused by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FireError {
    /// A previous beam is still being played back.
    PlaybackActive,
}

impl fmt::Display for FireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlaybackActive => write!(f, "a beam is already in flight"),
        }
    }
}
