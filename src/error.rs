//! Error types for engine operations.

use std::fmt;

/// Error type for the search engine's public surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// `next_move` was called on an engine that already produced its move
    SearchFinished,
    /// The root position has no legal moves to choose from
    NoLegalMoves { fen: String },
    /// FEN string rejected by the board collaborator
    InvalidFen { fen: String, reason: String },
    /// Move is not legal in the current position
    IllegalMove { notation: String },
    /// Opening book could not be read
    BookIo { path: String, message: String },
    /// Opening book data is not a whole number of entries
    BookFormat { len: usize },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::SearchFinished => {
                write!(f, "search engine already finished; create a new one per move")
            }
            EngineError::NoLegalMoves { fen } => {
                write!(f, "no legal moves in position '{fen}'")
            }
            EngineError::InvalidFen { fen, reason } => {
                write!(f, "invalid FEN '{fen}': {reason}")
            }
            EngineError::IllegalMove { notation } => {
                write!(f, "illegal move '{notation}'")
            }
            EngineError::BookIo { path, message } => {
                write!(f, "cannot read opening book '{path}': {message}")
            }
            EngineError::BookFormat { len } => {
                write!(f, "opening book size {len} is not a multiple of 16 bytes")
            }
        }
    }
}

impl std::error::Error for EngineError {}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_offending_input() {
        let err = EngineError::InvalidFen {
            fen: "8/8 w".to_string(),
            reason: "too few fields".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("8/8 w"), "{text}");
        assert!(text.contains("too few fields"), "{text}");
    }

    #[test]
    fn book_format_reports_length() {
        let err = EngineError::BookFormat { len: 17 };
        assert_eq!(
            err.to_string(),
            "opening book size 17 is not a multiple of 16 bytes"
        );
    }
}
