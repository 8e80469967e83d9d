use thiserror::Error;

/// labtally error types
#[derive(Error, Debug)]
pub enum LabtallyError {
    /// Failed to parse JSON or a date/department value
    #[error("parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Local cache operation failed
    #[error("cache error: {0}")]
    Cache(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// No cached report has the requested id
    #[error("no cached report with id {0}")]
    NotFound(String),

    /// CSV/JSON export failed
    #[error("export error: {0}")]
    Export(String),
}

/// Result type alias for labtally
pub type Result<T> = std::result::Result<T, LabtallyError>;

/// Why a report store call did not succeed.
///
/// Store failures are soft: the local cache stays authoritative and callers
/// decide whether to show the reason. Nothing retries automatically.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreFailure {
    /// No store URL configured
    #[error("report store is not configured")]
    NotConfigured,

    /// Network error, DNS failure, timeout
    #[error("report store unreachable: {0}")]
    Unreachable(String),

    /// Store answered with a non-success HTTP status
    #[error("report store rejected the request (HTTP {status})")]
    Rejected { status: u16 },

    /// Response body could not be parsed
    #[error("report store sent an unreadable payload: {0}")]
    BadPayload(String),

    /// Store answered but reported a non-success status field
    #[error("report store returned status '{0}'")]
    Remote(String),
}

/// Result type alias for report store calls
pub type StoreResult<T> = std::result::Result<T, StoreFailure>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LabtallyError::Parse("invalid json".into());
        assert_eq!(err.to_string(), "parse error: invalid json");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: LabtallyError = io_err.into();
        assert!(err.to_string().contains("io error"));
    }

    #[test]
    fn test_store_failure_distinguishes_reasons() {
        let unreachable = StoreFailure::Unreachable("connection refused".into());
        let rejected = StoreFailure::Rejected { status: 500 };
        assert_ne!(unreachable, rejected);
        assert_eq!(
            rejected.to_string(),
            "report store rejected the request (HTTP 500)"
        );
    }
}
