use std::fmt;
use thiserror::Error;

/// Unified error type for the river crossing simulation
#[derive(Debug, Error)]
pub enum CrossingError {
    /// Wrong number of positional arguments
    #[error("Too many / Not enough arguments: expected {expected}, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },

    /// A positional argument is not a base-10 integer
    #[error("Unexpected argument: {name} = {value:?} is not an integer")]
    ArgumentFormat { name: &'static str, value: String },

    /// A positional argument parsed but lies outside its allowed range
    #[error("Argument out of allowed range: {name} = {value} (expected {expected})")]
    ArgumentRange {
        name: &'static str,
        value: i64,
        expected: String,
    },

    /// The runtime or a worker could not be created
    #[error("Worker creation failed: {message}")]
    WorkerCreation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Transcript file could not be opened, written or flushed
    #[error("Transcript I/O failed: {operation}")]
    Transcript {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// A wait was attempted on a signal that has already been torn down
    #[error("Signal closed: {signal}")]
    SignalClosed { signal: SignalKind },

    /// A worker task panicked or was aborted
    #[error("Worker failed: {0}")]
    WorkerJoin(#[from] tokio::task::JoinError),
}

/// Names of the counting signals, used in diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    HackerPermit,
    SerfPermit,
    OnboardComplete,
    CruiseFinished,
    CaptainLast,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignalKind::HackerPermit => "hacker permit",
            SignalKind::SerfPermit => "serf permit",
            SignalKind::OnboardComplete => "onboard complete",
            SignalKind::CruiseFinished => "cruise finished",
            SignalKind::CaptainLast => "captain last",
        };
        f.write_str(name)
    }
}

impl CrossingError {
    /// Create an argument count error
    pub fn argument_count(expected: usize, actual: usize) -> Self {
        Self::ArgumentCount { expected, actual }
    }

    /// Create an argument format error
    pub fn argument_format<S: Into<String>>(name: &'static str, value: S) -> Self {
        Self::ArgumentFormat {
            name,
            value: value.into(),
        }
    }

    /// Create an argument range error
    pub fn argument_range<S: Into<String>>(name: &'static str, value: i64, expected: S) -> Self {
        Self::ArgumentRange {
            name,
            value,
            expected: expected.into(),
        }
    }

    /// Create a worker creation error with its underlying cause
    pub fn worker_creation<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WorkerCreation {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a transcript I/O error
    pub fn transcript<S: Into<String>>(operation: S, source: std::io::Error) -> Self {
        Self::Transcript {
            operation: operation.into(),
            source,
        }
    }

    /// Whether the error was caused by the command line rather than the runtime
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            Self::ArgumentCount { .. } | Self::ArgumentFormat { .. } | Self::ArgumentRange { .. }
        )
    }

    /// Process exit status for this error. Every failure is fatal.
    pub fn exit_code(&self) -> u8 {
        1
    }
}

/// Result type alias for CrossingError
pub type Result<T> = std::result::Result<T, CrossingError>;
