//! Materializing an [`ArchivePlan`] on disk.
//!
//! Stage 5 of the pipeline. Buckets are visited in ascending `(year, month)`
//! order and images in planned order. Every copy gets the next run-wide
//! sequence number:
//!
//! ```text
//! output/
//! ├── 2020/
//! │   └── 03/
//! │       ├── 000000_A.jpg
//! │       └── 000001_IMG_0001.JPG
//! └── 2021/
//!     └── 11/
//!         └── 000002_IMG_0001.JPG     # same base name, no collision
//! ```
//!
//! Content, permissions, and modification/access times are copied. The first
//! failure aborts the stage; files already written stay where they are.

use crate::events::{PipelineEvent, emit};
use crate::plan::ArchivePlan;
use std::ffi::{OsStr, OsString};
use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Digits in the zero-padded sequence prefix.
pub const SEQUENCE_WIDTH: usize = 6;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Unable to make directory {path}: {source}")]
    DirectoryCreateFailed { path: PathBuf, source: io::Error },
    #[error("Error copying {from} to {to}: {source}")]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
}

/// Destination paths written, in sequence order.
#[derive(Debug, Default)]
pub struct ArchiveSummary {
    pub copied: Vec<PathBuf>,
}

/// `NNNNNN_<original>` output file name. The original bytes are kept as-is.
pub fn archive_name(sequence: usize, original: &OsStr) -> OsString {
    let mut name = OsString::from(format!("{:0width$}_", sequence, width = SEQUENCE_WIDTH));
    name.push(original);
    name
}

/// Create bucket directories and copy every planned image into them.
pub fn copy_plan(
    plan: &ArchivePlan,
    output_root: &Path,
    events: Option<&Sender<PipelineEvent>>,
) -> Result<ArchiveSummary, ArchiveError> {
    let total = plan.image_count();
    let mut copied = Vec::with_capacity(total);

    for (key, images) in plan.buckets() {
        let dir = output_root.join(key.relative_dir());
        ensure_dir(&dir)?;

        for record in images {
            let sequence = copied.len();
            let destination = dir.join(archive_name(sequence, record.base_name()));
            copy_with_metadata(&record.path, &destination).map_err(|source| {
                ArchiveError::CopyFailed {
                    from: record.path.clone(),
                    to: destination.clone(),
                    source,
                }
            })?;

            emit(
                events,
                PipelineEvent::FileCopied {
                    completed: sequence + 1,
                    total,
                    source: record.path.clone(),
                    destination: destination.clone(),
                },
            );
            copied.push(destination);
        }
    }

    Ok(ArchiveSummary { copied })
}

/// Create `dir` and its parents. Succeeds if it already exists.
pub fn ensure_dir(dir: &Path) -> Result<(), ArchiveError> {
    fs::create_dir_all(dir).map_err(|source| ArchiveError::DirectoryCreateFailed {
        path: dir.to_path_buf(),
        source,
    })
}

/// Copy bytes, then timestamps, then permissions (last, so a read-only
/// source does not block setting the times).
fn copy_with_metadata(from: &Path, to: &Path) -> io::Result<()> {
    let metadata = fs::metadata(from)?;
    let mut reader = File::open(from)?;
    let mut writer = File::create(to)?;
    io::copy(&mut reader, &mut writer)?;

    let mut times = FileTimes::new().set_modified(metadata.modified()?);
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    writer.set_times(times)?;
    writer.set_permissions(metadata.permissions())
}
