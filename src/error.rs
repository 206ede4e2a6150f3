use thiserror::Error;

/// Any failure talking to the assistant backend. Callers treat every variant
/// the same way: the backend is unavailable.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("question and answer must both be filled in")]
    InvalidFaq,
    #[error("background task failed: {0}")]
    Runtime(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("could not encode value: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("no data directory available")]
    NoDataDir,
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("could not run speech command: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("speech command exited with {0}")]
    Exit(std::process::ExitStatus),
    #[error("background task failed: {0}")]
    Runtime(String),
}
