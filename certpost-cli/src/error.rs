//! CLI-specific error types and exit code mapping

use certpost_core::error::{CertpostError, ScanError};
use certpost_scanner::ScannerError;
use certpost_scanner::scanner::user_message;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// No matching certificate files under the root.
    #[error("{0}")]
    NothingFound(String),

    /// Files were found but none could be parsed.
    #[error("{0}")]
    NothingParsed(String),

    /// The report could not be written.
    #[error("{0}")]
    SaveFailed(String),

    /// The scan session stopped before aggregation (missing root, worker failure).
    #[error("{0}")]
    ScanFailed(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from certpost-core.
    #[error("{0}")]
    Core(#[from] CertpostError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                         |
    /// |------|---------------------------------|
    /// | 0    | Success (or cancelled)          |
    /// | 1    | General / command error         |
    /// | 2    | Configuration error             |
    /// | 3    | No certificate files found      |
    /// | 4    | No certificate could be parsed  |
    /// | 5    | Report could not be saved       |
    /// | 10   | IO error                        |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::NothingFound(_) => 3,
            Self::NothingParsed(_) => 4,
            Self::SaveFailed(_) => 5,
            Self::Io(_) => 10,
            Self::Core(e) => match e {
                CertpostError::Config(_) => 2,
                CertpostError::Scan(ScanError::EmptyDiscovery { .. }) => 3,
                CertpostError::Scan(ScanError::EmptyResult { .. }) => 4,
                CertpostError::Report(_) => 5,
                CertpostError::Io(_) => 10,
                CertpostError::Discovery(_) => 1,
            },
            Self::JsonSerialize(_) | Self::Command(_) | Self::ScanFailed(_) => 1,
        }
    }

    /// Whether the scan session already showed this error to the user.
    pub fn already_reported(&self) -> bool {
        matches!(
            self,
            Self::NothingFound(_)
                | Self::NothingParsed(_)
                | Self::SaveFailed(_)
                | Self::ScanFailed(_)
        )
    }
}

impl From<ScannerError> for CliError {
    fn from(e: ScannerError) -> Self {
        let message = user_message(&e);
        match e {
            ScannerError::EmptyDiscovery { .. } => Self::NothingFound(message),
            ScannerError::EmptyResult { .. } => Self::NothingParsed(message),
            ScannerError::Report { .. } => Self::SaveFailed(message),
            ScannerError::Config { field, reason } => {
                Self::Config(format!("invalid value for '{field}': {reason}"))
            }
            ScannerError::Discovery(_) | ScannerError::Channel(_) => Self::ScanFailed(message),
        }
    }
}
