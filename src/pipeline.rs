use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, ErrorKind, Result};
use crate::exif::{self, MetadataEngine, StripSummary};

/// How a single file of a batch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Success,
    ReadError,
    WriteError,
}

/// The result of processing one regular file of a batch.
#[derive(Debug, Serialize)]
pub struct FileOutcome {
    /// Source file.
    pub path: PathBuf,
    /// File written, when processing succeeded.
    pub destination: Option<PathBuf>,
    pub status: OutcomeStatus,
    pub summary: Option<StripSummary>,
    /// One-line failure reason.
    pub error: Option<String>,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

/// Outcomes of a batch, in processing order.
#[derive(Debug, Default, Serialize)]
pub struct BatchResult {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchResult {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// List the regular files directly inside `dir`, sorted by name. Subdirectories are skipped.
///
/// # Example
///
/// ```rust,no_run
/// use exif_remover::pipeline::list_files;
///
/// let files = list_files("./photos".as_ref()).unwrap();
/// println!("{} files to clean", files.len());
/// ```
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(Error::not_found(dir));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            Error::read(&path, e)
        })?;
        let path = entry.path();
        // Follow symlinks so a link to a folder is skipped like a folder.
        if path.is_file() {
            files.push(path.to_path_buf());
        } else {
            log::debug!("Skipping {}", path.display());
        }
    }
    Ok(files)
}

/// Strip every regular file directly inside `source_dir` into `dest_dir`.
///
/// `dest_dir` is created if missing. A file that cannot be read or written is
/// recorded and the batch moves on; `on_outcome` sees each outcome as soon as
/// the file is done. Only problems with the folders themselves abort the run.
pub fn run_batch(
    engine: &dyn MetadataEngine,
    source_dir: &Path,
    dest_dir: &Path,
    mut on_outcome: impl FnMut(&FileOutcome),
) -> Result<BatchResult> {
    let files = list_files(source_dir)?;

    if dest_dir.exists() && !dest_dir.is_dir() {
        return Err(Error::invalid_destination(dest_dir));
    }
    fs::create_dir_all(dest_dir).map_err(|e| Error::write_io(e, dest_dir))?;

    log::debug!(
        "Cleaning {} file(s) from {} into {}",
        files.len(),
        source_dir.display(),
        dest_dir.display()
    );

    let mut result = BatchResult::default();
    for path in files {
        let outcome = process_file(engine, &path, dest_dir);
        on_outcome(&outcome);
        result.outcomes.push(outcome);
    }

    log::debug!(
        "Batch done: {} succeeded, {} failed",
        result.succeeded(),
        result.failed()
    );
    Ok(result)
}

fn process_file(engine: &dyn MetadataEngine, path: &Path, dest_dir: &Path) -> FileOutcome {
    // list_files only yields entries with a file name.
    let dest = match path.file_name() {
        Some(name) => dest_dir.join(name),
        None => dest_dir.to_path_buf(),
    };

    match exif::strip_and_save_with(engine, path, &dest) {
        Ok(summary) => FileOutcome {
            path: path.to_path_buf(),
            destination: Some(dest),
            status: OutcomeStatus::Success,
            summary: Some(summary),
            error: None,
        },
        Err(e) => {
            log::debug!("{}: {e}", path.display());
            let status = match e.kind() {
                ErrorKind::WriteError | ErrorKind::InvalidDestination => OutcomeStatus::WriteError,
                _ => OutcomeStatus::ReadError,
            };
            FileOutcome {
                path: path.to_path_buf(),
                destination: None,
                status,
                summary: None,
                error: Some(e.to_string()),
            }
        }
    }
}
