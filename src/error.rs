use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Result type alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// The kind of failure, inspected by callers to decide how far an error reaches.
///
/// - [`ErrorKind::ParseError`] aborts the whole invocation.
/// - [`ErrorKind::NotFound`] and [`ErrorKind::InvalidDestination`] abort one
///   operation before anything is written.
/// - [`ErrorKind::ReadError`] and [`ErrorKind::WriteError`] are scoped to a
///   single file; a batch keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidDestination,
    ReadError,
    WriteError,
    ParseError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::InvalidDestination => "invalid destination",
            ErrorKind::ReadError => "read error",
            ErrorKind::WriteError => "write error",
            ErrorKind::ParseError => "parse error",
        };
        f.write_str(name)
    }
}

/// A failure tagged with its [`ErrorKind`], the path it concerns and a one-line message.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    path: Option<PathBuf>,
    message: String,
    #[source]
    source: Option<io::Error>,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: None,
            message: message.into(),
            source: None,
        }
    }

    pub fn not_found(path: &Path) -> Self {
        Self::new(
            ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )
        .with_path(path)
    }

    pub fn invalid_destination(path: &Path) -> Self {
        Self::new(ErrorKind::InvalidDestination, "destination file is no directory").with_path(path)
    }

    pub fn read(path: &Path, reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::ReadError,
            format!("Can not convert or read file {}: {reason}", path.display()),
        )
        .with_path(path)
    }

    pub fn write(path: &Path, reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::WriteError,
            format!("Unable to remove EXIF data from {}: {reason}", path.display()),
        )
        .with_path(path)
    }

    /// Wrap an I/O error that happened while reading `path`.
    pub fn read_io(err: io::Error, path: &Path) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            return Self::not_found(path);
        }
        let mut e = Self::read(path, &err);
        e.source = Some(err);
        e
    }

    /// Wrap an I/O error that happened while writing `path`.
    pub fn write_io(err: io::Error, path: &Path) -> Self {
        let mut e = Self::write(path, &err);
        e.source = Some(err);
        e
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
