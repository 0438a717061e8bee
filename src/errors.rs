use chrono::NaiveDate;
use thiserror::Error;

/// All errors that can occur in JournalBear.
#[derive(Debug, Error)]
pub enum JournalError {
    // --- Container errors ---
    /// Every decryption scheme was tried and none produced a usable payload.
    /// A wrong password and a damaged file look identical from here.
    #[error("Wrong password. Try again.")]
    WrongPasswordOrCorrupt,

    #[error("Corrupt archive: {0}")]
    CorruptArchive(String),

    #[error("Corrupt journal file: {0}")]
    CorruptFile(String),

    #[error("Unsupported journal format: {0}")]
    UnsupportedFormat(String),

    #[error("Journal already exists at {0}")]
    JournalExists(std::path::PathBuf),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- Journal errors ---
    #[error("An entry for {0} already exists")]
    EntryExists(NaiveDate),

    #[error("No entry for {0}")]
    EntryNotFound(NaiveDate),

    #[error("Password is too weak: {}", .0.join(" "))]
    WeakPassword(Vec<String>),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,
}

/// Convenience type alias for JournalBear results.
pub type Result<T> = std::result::Result<T, JournalError>;
