//! Source classification and destination resolution.
//!
//! A source is either a single file or a directory. Where the results go
//! depends on that classification:
//!
//! - single file, no destination: the file is overwritten in place
//! - directory, no destination (or the destination is the source itself):
//!   results go into the reserved [`TEMP_DIR`](crate::config::TEMP_DIR)
//!   subdirectory so a folder of originals is never overwritten by mistake
//! - directory, destination is an existing regular file: the operation is
//!   refused before anything is written

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Error, ErrorKind, Result};

/// A classified source path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceTarget {
    SingleFile(PathBuf),
    Directory(PathBuf),
}

impl SourceTarget {
    pub fn path(&self) -> &Path {
        match self {
            SourceTarget::SingleFile(p) | SourceTarget::Directory(p) => p,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, SourceTarget::Directory(_))
    }
}

/// Where the cleaned output of one operation is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationTarget {
    /// Output file for a single-file source, output folder for a directory source.
    pub path: PathBuf,
    /// `true` when the reserved temp subdirectory was substituted for the source folder.
    pub redirected: bool,
}

/// Classify `path` as a file or a directory.
pub fn classify(path: &Path) -> Result<SourceTarget> {
    let meta = fs::metadata(path).map_err(|e| Error::read_io(e, path))?;
    if meta.is_dir() {
        Ok(SourceTarget::Directory(path.to_path_buf()))
    } else {
        Ok(SourceTarget::SingleFile(path.to_path_buf()))
    }
}

/// Resolve the destination for `source`, creating the destination folder when needed.
///
/// For a directory source the returned folder is the top-level destination or
/// its reserved temp subdirectory; the latter is created by the batch run.
pub fn resolve_destination(
    source: &SourceTarget,
    dest: Option<&Path>,
    config: &Config,
) -> Result<DestinationTarget> {
    let dest = dest.unwrap_or_else(|| source.path());

    match source {
        SourceTarget::Directory(src) => {
            if dest.exists() && !dest.is_dir() {
                return Err(Error::invalid_destination(dest));
            }
            if !dest.exists() {
                fs::create_dir_all(dest).map_err(|e| Error::write_io(e, dest))?;
                log::debug!("Created destination folder {}", dest.display());
            }

            if same_path(src, dest) {
                let redirected = dest.join(config.temp_dir);
                log::debug!(
                    "Destination equals source, redirecting to {}",
                    redirected.display()
                );
                Ok(DestinationTarget {
                    path: redirected,
                    redirected: true,
                })
            } else {
                Ok(DestinationTarget {
                    path: dest.to_path_buf(),
                    redirected: false,
                })
            }
        }
        SourceTarget::SingleFile(src) => {
            // A folder given as destination receives the file under its own name.
            let path = if dest.is_dir() {
                let name = src.file_name().ok_or_else(|| {
                    Error::new(
                        ErrorKind::InvalidDestination,
                        format!("{} has no file name", src.display()),
                    )
                    .with_path(src)
                })?;
                dest.join(name)
            } else {
                if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
                    if !parent.exists() {
                        fs::create_dir_all(parent).map_err(|e| Error::write_io(e, parent))?;
                    }
                }
                dest.to_path_buf()
            };
            Ok(DestinationTarget {
                path,
                redirected: false,
            })
        }
    }
}

/// Compare two existing paths by their canonical form, falling back to a lexical comparison.
fn same_path(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Absolute form of `path` for user-facing messages.
pub fn display_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
