//! Converting every SOR file under a directory.
//!
//! The walk is recursive and visits files in name order. A file that fails to
//! decode is logged and recorded in the report; the walk carries on with the
//! next one.

use crate::{
    Error, Result,
    dump::{self, DumpOptions},
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

const SOR_EXTENSION: &str = "sor";

/// A file that could not be converted.
#[derive(Debug)]
pub struct BatchFailure {
    pub input: PathBuf,
    pub error: Error,
}

/// Outcome of [`dump_directory`].
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Dumps written, in walk order.
    pub written: Vec<PathBuf>,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    /// Whether every file found was converted.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

fn is_sor_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(SOR_EXTENSION))
}

/// Dump every `*.sor` file under `input_dir` into `output_dir`.
///
/// Output names follow [`dump::dump_file_name`]; files with the same stem in
/// different subdirectories overwrite each other, the last one walked wins.
///
/// # Errors
/// Only when `input_dir` is not a directory or `output_dir` cannot be created.
/// Per-file failures are returned in the report.
pub fn dump_directory<P: AsRef<Path>, Q: AsRef<Path>>(
    input_dir: P,
    output_dir: Q,
    options: &DumpOptions,
) -> Result<BatchReport> {
    let input_dir = input_dir.as_ref();
    let output_dir = output_dir.as_ref();
    if !input_dir.is_dir() {
        return Err(Error::IOError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} is not a directory", input_dir.display()),
        )));
    }
    std::fs::create_dir_all(output_dir)?;

    let mut report = BatchReport::default();
    for entry in WalkDir::new(input_dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {e}");
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_sor_file(entry.path()) {
            continue;
        }

        let input = entry.path();
        info!("Processing {}", input.display());
        match dump::dump_to_dir(input, output_dir, options) {
            Ok(path) => report.written.push(path),
            Err(error) => {
                warn!("Error processing {}: {error}", input.display());
                report.failed.push(BatchFailure {
                    input: input.to_path_buf(),
                    error,
                });
            }
        }
    }

    info!(
        "{} files converted, {} failed",
        report.written.len(),
        report.failed.len()
    );
    Ok(report)
}
