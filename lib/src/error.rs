use crate::board::Position;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// No consistent 15 x 15 grid could be located in the image
    #[error("Grid not found (confidence {confidence:.2}): {reason}")]
    GridNotFound { confidence: f32, reason: String },
    /// One or more cells were classified below the acceptance threshold
    #[error("Uncertain cells: board {board:?}, rack slots {rack:?}")]
    UncertainCells {
        board: Vec<Position>,
        rack: Vec<usize>,
    },
    /// The occupied cells do not form a single connected group through the center
    #[error("Invalid board geometry: {reason} {cells:?}")]
    InvalidBoardGeometry {
        reason: String,
        cells: Vec<Position>,
    },
    /// Error reading the wordlist
    #[error("Wordlist {path} could not be read")]
    DictionaryLoad { path: PathBuf, source: io::Error },
    /// Error reading a glyph template
    #[error("Template {path} could not be read")]
    TemplateRead {
        path: PathBuf,
        source: image::error::ImageError,
    },
    /// Error decoding image
    #[error("Image {path} could not be decoded")]
    ImageError {
        path: PathBuf,
        source: image::error::ImageError,
    },
    #[error("Image could not be decoded")]
    Image(#[from] image::error::ImageError),
    #[error("Invalid board string: {0}")]
    InvalidBoardString(String),
    #[error("Invalid rack: {0}")]
    InvalidRack(String),
    /// The board is not a single valid move away from the previous capture
    #[error("Capture is inconsistent with the previous board: {0}")]
    InconsistentCapture(String),
}
