//! Single-line level codes for sharing grids between players.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use beam_maze_core::{BoundaryRef, CellCoord, GridDimension};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::level::LevelConfig;

const CODE_DOMAIN: &str = "beam";
const CODE_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded level payload.
pub(crate) const CODE_HEADER: &str = "beam:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableLevel {
    entry: BoundaryRef,
    exit: BoundaryRef,
    fixed: Vec<CellCoord>,
}

/// Encodes the level into a single-line string suitable for clipboard transfer.
pub(crate) fn encode(level: &LevelConfig) -> String {
    let payload = SerializableLevel {
        entry: level.entry,
        exit: level.exit,
        fixed: level.fixed.clone(),
    };
    let json = serde_json::to_vec(&payload).expect("level payload serialization never fails");
    let encoded = STANDARD_NO_PAD.encode(json);
    let side = level.dimension.get();
    format!("{CODE_HEADER}:{side}x{side}:{encoded}")
}

/// Decodes a level from the provided code string.
pub(crate) fn decode(value: &str) -> Result<LevelConfig, LevelTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LevelTransferError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(LevelTransferError::MissingPrefix)?;
    let version = parts.next().ok_or(LevelTransferError::MissingVersion)?;
    let dimensions = parts.next().ok_or(LevelTransferError::MissingDimensions)?;
    let payload = parts.next().ok_or(LevelTransferError::MissingPayload)?;

    if domain != CODE_DOMAIN {
        return Err(LevelTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != CODE_VERSION {
        return Err(LevelTransferError::UnsupportedVersion(version.to_owned()));
    }

    let dimension = parse_dimensions(dimensions)?;
    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(LevelTransferError::InvalidEncoding)?;
    let decoded: SerializableLevel =
        serde_json::from_slice(&bytes).map_err(LevelTransferError::InvalidPayload)?;

    let level = LevelConfig {
        dimension,
        entry: decoded.entry,
        exit: decoded.exit,
        fixed: decoded.fixed,
    };
    level
        .validate()
        .map_err(|error| LevelTransferError::InvalidLevel(error.to_string()))?;
    Ok(level)
}

/// Errors that can occur while decoding level transfer codes.
#[derive(Debug, Error)]
pub(crate) enum LevelTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("level code was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the encoded level.
    #[error("level code is missing the prefix")]
    MissingPrefix,
    /// The encoded level did not contain a version segment.
    #[error("level code is missing the version")]
    MissingVersion,
    /// The encoded level did not include grid dimensions.
    #[error("level code is missing the grid dimensions")]
    MissingDimensions,
    /// The encoded level did not include the payload segment.
    #[error("level code is missing the payload")]
    MissingPayload,
    /// The encoded level used an unexpected prefix segment.
    #[error("level prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded level used an unsupported version identifier.
    #[error("level version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the encoded level.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode level payload: {0}")]
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload could not be deserialised.
    #[error("could not parse level payload: {0}")]
    InvalidPayload(serde_json::Error),
    /// The decoded level failed validation.
    #[error("level code decodes to an unusable level: {0}")]
    InvalidLevel(String),
}

fn parse_dimensions(dimensions: &str) -> Result<GridDimension, LevelTransferError> {
    let (columns, rows) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| LevelTransferError::InvalidDimensions(dimensions.to_owned()))?;

    let columns = columns
        .trim()
        .parse::<u32>()
        .map_err(|_| LevelTransferError::InvalidDimensions(dimensions.to_owned()))?;
    let rows = rows
        .trim()
        .parse::<u32>()
        .map_err(|_| LevelTransferError::InvalidDimensions(dimensions.to_owned()))?;

    // The grid is square by contract; a code claiming otherwise is corrupt.
    if columns == 0 || columns != rows {
        return Err(LevelTransferError::InvalidDimensions(
            dimensions.to_owned(),
        ));
    }

    Ok(GridDimension::new(columns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use beam_maze_core::BoundarySide;

    #[test]
    fn round_trip_reference_level() {
        let level = LevelConfig::reference();

        let encoded = encode(&level);
        assert!(encoded.starts_with(&format!("{CODE_HEADER}:8x8:")));

        let decoded = decode(&encoded).expect("level decodes");
        assert_eq!(level, decoded);
    }

    #[test]
    fn round_trip_obstacle_free_level() {
        let level = LevelConfig {
            dimension: GridDimension::new(12),
            entry: BoundaryRef::new(BoundarySide::Bottom, 7),
            exit: BoundaryRef::new(BoundarySide::Top, 7),
            fixed: Vec::new(),
        };

        let encoded = encode(&level);
        assert!(encoded.starts_with(&format!("{CODE_HEADER}:12x12:")));

        let decoded = decode(&encoded).expect("level decodes");
        assert_eq!(level, decoded);
    }

    #[test]
    fn rejects_foreign_prefixes_and_rectangles() {
        assert!(matches!(
            decode("maze:v1:8x8:e30"),
            Err(LevelTransferError::InvalidPrefix(_))
        ));
        assert!(matches!(
            decode("beam:v1:8x6:e30"),
            Err(LevelTransferError::InvalidDimensions(_))
        ));
        assert!(matches!(
            decode("   "),
            Err(LevelTransferError::EmptyPayload)
        ));
    }

    #[test]
    fn rejects_codes_that_decode_to_unusable_levels() {
        let level = LevelConfig {
            dimension: GridDimension::new(4),
            entry: BoundaryRef::new(BoundarySide::Left, 9),
            exit: BoundaryRef::new(BoundarySide::Right, 0),
            fixed: Vec::new(),
        };

        let encoded = encode(&level);
        assert!(matches!(
            decode(&encoded),
            Err(LevelTransferError::InvalidLevel(_))
        ));
    }
}
