use crate::grid::Coord;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FieldMapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Malformed header at line {line}: {message}")]
    Header { line: usize, message: String },

    #[error("Malformed row at line {line}: {message}")]
    Row { line: usize, message: String },

    #[error("Row at line {line} addresses {coord} index {index}, axis has {points} points")]
    IndexOutOfRange {
        line: usize,
        coord: Coord,
        index: i64,
        points: usize,
    },

    #[error("Row at line {line} has {coord} = {value} which is not on a grid line")]
    OffGrid { line: usize, coord: Coord, value: f64 },

    #[error("Row at line {line} fills cell (r={ir}, phi={iphi}, z={iz}) a second time")]
    DuplicateCell {
        line: usize,
        ir: usize,
        iphi: usize,
        iz: usize,
    },

    #[error("Field table under-supplied: {filled} of {expected} cells filled")]
    MissingCells { expected: usize, filled: usize },

    #[error("Field map not initialized: {0}")]
    NotInitialized(String),

    #[error("Unknown field map: {0}")]
    UnknownField(String),
}

pub type FieldMapResult<T> = Result<T, FieldMapError>;
