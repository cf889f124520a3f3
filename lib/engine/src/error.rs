//! Error types for the engine crate

use thiserror::Error;

use crate::board::Position;
use crate::piece::Color;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The board lost the king of this color. Never a legal game state.
    #[error("no {0} king on the board")]
    KingNotFound(Color),

    #[error("position {0} is outside the board")]
    OffBoard(Position),

    #[error("invalid FEN placement: {0}")]
    InvalidFen(String),
}

pub type Result<T> = std::result::Result<T, Error>;
