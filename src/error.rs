use thiserror::Error;

/// Errors surfaced by the opponent core and its Rules Engine adapter.
///
/// A finished game is not an error: `MoveSelector::choose_move` reports it as
/// `Decision::GameOver`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The FEN could not be turned into a playable position.
    #[error("invalid position `{fen}`: {reason}")]
    InvalidPosition { fen: String, reason: String },

    /// A move that is not legal in the given position.
    #[error("illegal move {mv} in position `{fen}`")]
    IllegalMove { mv: String, fen: String },

    /// Configuration that does not parse or is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The background search thread went away without reporting a result.
    #[error("search worker exited without a result")]
    WorkerDisconnected,
}

pub type EngineResult<T> = Result<T, EngineError>;
