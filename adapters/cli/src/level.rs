//! Level configuration loading and validation.

use beam_maze_core::{BoundaryRef, BoundarySide, CellCoord, GridDimension};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// External level description loaded once at startup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct LevelConfig {
    /// Side length of the square obstacle grid.
    pub dimension: GridDimension,
    /// Boundary cell where the beam enters the grid.
    pub entry: BoundaryRef,
    /// Boundary cell the beam must cross to win.
    pub exit: BoundaryRef,
    /// Cells seeded with permanent obstacles.
    #[serde(default)]
    pub fixed: Vec<CellCoord>,
}

impl LevelConfig {
    /// The reference level: an 8×8 grid with a single deflector that steers
    /// the beam from the left entry up through the top exit.
    pub(crate) fn reference() -> Self {
        Self {
            dimension: GridDimension::new(8),
            entry: BoundaryRef::new(BoundarySide::Left, 3),
            exit: BoundaryRef::new(BoundarySide::Top, 4),
            fixed: vec![CellCoord::new(4, 3)],
        }
    }

    /// Parses and validates a level from its JSON representation.
    pub(crate) fn from_json(json: &str) -> Result<Self, LevelError> {
        let level: Self = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    /// Checks that every boundary and obstacle fits the grid.
    ///
    /// A level that fails validation must abort startup; firing a beam at a
    /// meaningless configuration helps nobody.
    pub(crate) fn validate(&self) -> Result<(), LevelError> {
        if self.dimension.get() == 0 {
            return Err(LevelError::ZeroDimension);
        }
        if !self.entry.fits(self.dimension) {
            return Err(LevelError::EntryOutOfRange {
                entry: self.entry,
                dimension: self.dimension,
            });
        }
        if !self.exit.fits(self.dimension) {
            return Err(LevelError::ExitOutOfRange {
                exit: self.exit,
                dimension: self.dimension,
            });
        }
        if let Some(cell) = self
            .fixed
            .iter()
            .find(|cell| !self.dimension.contains(**cell))
        {
            return Err(LevelError::ObstacleOutOfRange {
                column: cell.column(),
                row: cell.row(),
                dimension: self.dimension,
            });
        }
        Ok(())
    }
}

/// Errors that make a level configuration unusable.
#[derive(Debug, Error)]
pub(crate) enum LevelError {
    /// The level could not be parsed at all.
    #[error("could not parse level: {0}")]
    Parse(#[from] serde_json::Error),
    /// A grid without cells cannot host a beam.
    #[error("grid dimension must be at least 1")]
    ZeroDimension,
    /// The entry boundary names a row or column beyond the grid.
    #[error("entry {entry} does not fit a grid of {} cells", dimension.get())]
    EntryOutOfRange {
        /// Entry boundary provided by the level.
        entry: BoundaryRef,
        /// Configured grid dimension.
        dimension: GridDimension,
    },
    /// The exit boundary names a row or column beyond the grid.
    #[error("exit {exit} does not fit a grid of {} cells", dimension.get())]
    ExitOutOfRange {
        /// Exit boundary provided by the level.
        exit: BoundaryRef,
        /// Configured grid dimension.
        dimension: GridDimension,
    },
    /// A seeded obstacle lies outside the grid.
    #[error("fixed obstacle ({column}, {row}) does not fit a grid of {} cells", dimension.get())]
    ObstacleOutOfRange {
        /// Column of the offending obstacle.
        column: u32,
        /// Row of the offending obstacle.
        row: u32,
        /// Configured grid dimension.
        dimension: GridDimension,
    },
}
