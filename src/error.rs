use std::path::PathBuf;

/// Errors raised by the board engine and the turn orchestrator.
///
/// All of these are recoverable conditions reported to the caller; none of
/// them corrupt session state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("column {column} is out of range")]
    InvalidColumn { column: usize },

    #[error("column {column} is full")]
    ColumnFull { column: usize },

    #[error("the game is over")]
    GameOver,

    #[error("it is the remote player's turn")]
    RemoteTurn,

    #[error("the remote player is not to move")]
    NotRemoteTurn,

    #[error("a remote move request is already pending")]
    MovePending,

    #[error("no remote move request is pending")]
    NoPendingMove,

    #[error("the mode can only change before the first move or after the game ends")]
    ModeLocked,
}

/// Errors from the remote move provider.
///
/// A failed or invalid response never applies a move; the session keeps the
/// turn with the remote player and the caller decides whether to retry.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("move service unreachable: {reason}")]
    Unavailable { reason: String },

    #[error("move service returned HTTP {status}: {message}")]
    Service { status: u16, message: String },

    #[error("malformed response from move service: {reason}")]
    Protocol { reason: String },

    #[error("move service chose unplayable column {column}")]
    IllegalColumn { column: usize },

    #[error(transparent)]
    Game(#[from] GameError),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
