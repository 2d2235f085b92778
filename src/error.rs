use thiserror::Error;
use tracing::{error, warn};

/// Error severity for shell display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,     // informational
    Warning,  // recoverable
    Error,    // operation failed
    Critical, // requires user action
}

/// Domain-specific errors for the notes panel
#[derive(Error, Debug)]
pub enum NotesError {
    #[error("Failed to parse snapshot: {0}")]
    SnapshotParse(#[from] serde_json::Error),

    #[error("Snapshot I/O failed for '{path}': {source}")]
    SnapshotIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No API key configured for provider '{provider}'")]
    MissingApiKey { provider: String },

    #[error("Host operation failed: {0}")]
    Host(String),
}

impl NotesError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::SnapshotParse(_) => ErrorSeverity::Error,
            Self::SnapshotIo { .. } => ErrorSeverity::Error,
            Self::MissingApiKey { .. } => ErrorSeverity::Warning,
            Self::Host(_) => ErrorSeverity::Warning,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::SnapshotParse(e) => format!("Notes data is unreadable: {}", e),
            Self::SnapshotIo { path, .. } => format!("Could not access notes data at {}", path),
            Self::MissingApiKey { provider } => {
                format!("Please add a {} API key in settings", provider)
            }
            Self::Host(msg) => msg.clone(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NotesError>;

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and the user doesn't need to know.
///
/// # Examples
///
/// ```ignore
/// use quicknotes::error::ResultExt;
///
/// // Silently log and continue if the config fails to load
/// let config = load_config().log_err().unwrap_or_default();
///
/// // Log as warning for expected failures
/// let visible = host.screen_sharing_visible().warn_on_err();
/// ```
pub trait ResultExt<T> {
    /// Log error with caller location and return None. Use for recoverable failures.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}

/// Panic in debug mode, log error in release mode.
///
/// Use for "impossible" states that should crash during development
/// but gracefully degrade in production.
#[macro_export]
macro_rules! debug_panic {
    ( $($fmt_arg:tt)* ) => {
        if cfg!(debug_assertions) {
            panic!( $($fmt_arg)* );
        } else {
            tracing::error!("IMPOSSIBLE STATE: {}", format_args!($($fmt_arg)*));
        }
    };
}
