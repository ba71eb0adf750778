use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the call-log statistics crates.
#[derive(Error, Debug)]
pub enum CallStatsError {
    /// The export file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input has no usable header row (for example an empty file).
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A filtered call's `date_started` is not shaped `YYYY-MM-DD HH:MM...`.
    #[error("Malformed timestamp in row {row}: {value:?}")]
    MalformedTimestamp { row: usize, value: String },

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the callstats crates.
pub type Result<T> = std::result::Result<T, CallStatsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = CallStatsError::FileRead {
            path: PathBuf::from("/exports/calls.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/exports/calls.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_malformed_input() {
        let err = CallStatsError::MalformedInput("missing header row".to_string());
        assert_eq!(err.to_string(), "Malformed input: missing header row");
    }

    #[test]
    fn test_error_display_malformed_timestamp() {
        let err = CallStatsError::MalformedTimestamp {
            row: 4,
            value: "2024-01-02".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed timestamp in row 4: \"2024-01-02\""
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: CallStatsError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }
}
