//! Error types shared by the world loader, save system and configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("no curriculum found for world '{0}'")]
    CurriculumNotFound(String),

    #[error("no map found for world '{0}'")]
    MapNotFound(String),

    #[error("question {id} is invalid: {reason}")]
    InvalidQuestion { id: u32, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("save encoding error: {0}")]
    Encode(#[from] bincode::Error),

    #[error("invalid save version: expected 0x{expected:016X}, got 0x{found:016X}")]
    InvalidSaveVersion { expected: u64, found: u64 },

    #[error("save checksum verification failed")]
    ChecksumMismatch,

    #[error("invalid value for {key}: '{value}'")]
    Config { key: &'static str, value: String },

    #[error("could not determine a save directory")]
    NoSaveDirectory,
}

pub type GameResult<T> = Result<T, GameError>;
