use std::fmt;
use std::path::PathBuf;

/// Coarse classification of everything that can go wrong in the store.
///
/// Every variant maps to a section of the error taxonomy: configuration
/// mistakes never retry, lookups that miss never create, and conflicts /
/// lock timeouts / IO failures are surfaced verbatim to the caller.
#[derive(Debug)]
pub enum ErrorKind {
    /// Invalid dimension schema, or a filter/update against an unknown
    /// dimension or out-of-range value.
    Config,
    /// A short ID or UUID did not resolve to a document.
    NotFound,
    /// A hierarchy cycle, or a non-cascading delete on a non-empty parent.
    Conflict,
    /// The cross-process file lock was not acquired within the budget.
    LockTimeout,
    /// Any file read/write/rename failure.
    Io,
    /// Corrupted JSON on load.
    Decode,
    /// State that could not be serialized back to JSON.
    Encode,
    /// Illegal characters, unknown prefix, or malformed where-expression.
    Input,
}

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub context: String,
}

impl Error {
    pub fn new(kind: ErrorKind, context: impl Into<String>) -> Self {
        Error { kind, context: context.into() }
    }

    pub fn config(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::Config, context)
    }

    pub fn not_found(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::NotFound, context)
    }

    pub fn conflict(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::Conflict, context)
    }

    pub fn lock_timeout(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::LockTimeout, context)
    }

    pub fn input(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::Input, context)
    }

    pub fn io_at(path: &PathBuf, err: std::io::Error) -> Self {
        Error::new(ErrorKind::Io, format!("{}: {}", path.display(), err))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.context)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::new(ErrorKind::Io, err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Error::new(ErrorKind::Io, err.to_string())
        } else {
            Error::new(ErrorKind::Decode, err.to_string())
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::new(ErrorKind::Io, format!("zip: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
