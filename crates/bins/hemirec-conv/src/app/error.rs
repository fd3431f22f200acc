use std::path::PathBuf;

/// Error type for runtime errors of the converter.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The current working directory cannot be accessed.
    #[error("Failed to get current working directory")]
    CurrentDir(#[source] std::io::Error),

    /// The user configuration file cannot be read.
    #[error("Failed to read user configuration file: {}", .0.display())]
    ReadConfig(PathBuf, #[source] std::io::Error),

    /// The user configuration file is malformed.
    #[error("Failed to parse user configuration file: {}", .0.display())]
    ParseConfig(PathBuf, #[source] toml::de::Error),

    /// The user configuration file does not exist.
    #[error("User configuration not found: {}", .0.display())]
    UserConfigNotFound(PathBuf),

    /// The output directory is invalid.
    #[error("Invalid output directory: {}", .0.display())]
    InvalidOutputDir(PathBuf),

    /// Command line parameters are inconsistent.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Error raised by the reconstruction engine.
    #[error("Conversion of {} failed", .0.display())]
    Conversion(PathBuf, #[source] base::error::Error),

    /// Error raised while loading measurements.
    #[error(transparent)]
    Base(#[from] base::error::Error),
}
