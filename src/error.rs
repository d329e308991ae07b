//! Error types for runoff

use std::fmt;

/// Result type alias for runoff operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for runoff
#[derive(Debug)]
pub enum Error {
    /// Configuration errors (missing or invalid settings)
    Config(String),
    /// Object store errors (client construction, upload)
    ObjectStore(object_store::Error),
    /// CSV encoding errors
    Csv(csv::Error),
    /// IO errors
    Io(std::io::Error),
    /// Unrecognized tag name passed to the tag selector
    UnknownTag(String),
    /// Row whose cell count does not match the header
    MalformedRow { expected: usize, actual: usize },
    /// Output started twice
    AlreadyStarted,
    /// Output stopped twice
    AlreadyStopped,
    /// Lifecycle call that requires a started output
    NotStarted,
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ObjectStore(e) => Some(e),
            Error::Csv(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::ObjectStore(e) => write!(f, "Object store error: {}", e),
            Error::Csv(e) => write!(f, "CSV error: {}", e),
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::UnknownTag(name) => write!(f, "Unknown system tag: {}", name),
            Error::MalformedRow { expected, actual } => {
                write!(f, "Malformed row: expected {} cells, got {}", expected, actual)
            }
            Error::AlreadyStarted => write!(f, "Output is already started"),
            Error::AlreadyStopped => write!(f, "Output is already stopped"),
            Error::NotStarted => write!(f, "Output has not been started"),
        }
    }
}

impl From<object_store::Error> for Error {
    fn from(e: object_store::Error) -> Self {
        Error::ObjectStore(e)
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Csv(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
