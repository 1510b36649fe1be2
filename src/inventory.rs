//! Image discovery, stat, and free-space preflight.
//!
//! Stage 1 of the pipeline. Walks the input root recursively, keeps regular
//! files with an image extension, stats each one, and refuses to continue
//! when the output volume cannot hold a full copy of everything found.
//!
//! ## Discovery order
//!
//! Directories are walked depth-first with entries sorted by file name, and
//! paths are absolute. The resulting order is the component-wise order of the
//! paths themselves, which is what later stages rely on for tie-breaking.
//!
//! ## Accepted extensions
//!
//! `jpg`, `jpeg`, `png`, matched case-insensitively. Nothing else is
//! inspected; a text file named `notes.JPG` is still inventoried and simply
//! fails to decode later.
//!
//! ## Preflight
//!
//! ```text
//! required  = sum of inventoried file sizes
//! available = free bytes on the volume holding the output root
//! required > available  →  InsufficientSpace
//! ```

use crate::disk::SpaceProbe;
use crate::events::{PipelineEvent, emit};
use crate::types::{ImageRecord, TimestampSource};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("There are no images in {0}")]
    NoImagesFound(PathBuf),
    #[error("{required} free bytes on disk are needed to work, only {available} bytes are available")]
    InsufficientSpace { required: u64, available: u64 },
    #[error("Unable to stat {path} ({source_kind} time): {source}")]
    Stat {
        path: PathBuf,
        source_kind: TimestampSource,
        source: io::Error,
    },
    #[error("Unable to resolve {path}: {source}")]
    Resolve { path: PathBuf, source: io::Error },
    #[error("Unable to query free space for {path}: {source}")]
    FreeSpace { path: PathBuf, source: io::Error },
}

/// Every inventoried image plus the preflight numbers.
#[derive(Debug)]
pub struct Inventory {
    pub records: Vec<ImageRecord>,
    pub required_bytes: u64,
    pub available_bytes: u64,
}

/// Whether `path` carries one of the [`IMAGE_EXTENSIONS`].
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Walk `root` and return image paths in discovery order.
///
/// `exclude` prunes a subtree (the output root when it sits inside the input).
/// Entries the walk cannot read are skipped.
pub fn discover(root: &Path, exclude: Option<&Path>) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| exclude != Some(entry.path()))
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && is_image_path(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

/// Stat each path into an [`ImageRecord`] keyed on the chosen timestamp.
pub fn stat_records(
    paths: Vec<PathBuf>,
    source: TimestampSource,
) -> Result<Vec<ImageRecord>, InventoryError> {
    paths
        .into_iter()
        .map(|path| {
            let stat = fs::metadata(&path).and_then(|m| Ok((m.len(), source.read(&m)?)));
            match stat {
                Ok((size, timestamp)) => Ok(ImageRecord::new(path, size, timestamp)),
                Err(err) => Err(InventoryError::Stat {
                    path,
                    source_kind: source,
                    source: err,
                }),
            }
        })
        .collect()
}

/// Fail with [`InventoryError::InsufficientSpace`] when `required` exceeds free space.
///
/// Returns the available byte count on success.
pub fn preflight(
    required: u64,
    output_root: &Path,
    probe: &impl SpaceProbe,
) -> Result<u64, InventoryError> {
    let available = probe
        .free_bytes(output_root)
        .map_err(|source| InventoryError::FreeSpace {
            path: output_root.to_path_buf(),
            source,
        })?;
    if required > available {
        return Err(InventoryError::InsufficientSpace {
            required,
            available,
        });
    }
    Ok(available)
}

/// Build the inventory for `input_root`, checking space on `output_root`.
///
/// Both roots must exist. Records carry canonical absolute paths.
pub fn build_inventory(
    input_root: &Path,
    output_root: &Path,
    source: TimestampSource,
    probe: &impl SpaceProbe,
    events: Option<&Sender<PipelineEvent>>,
) -> Result<Inventory, InventoryError> {
    let root = canonical(input_root)?;
    let output = canonical(output_root)?;

    let paths = discover(&root, Some(&output));
    if paths.is_empty() {
        return Err(InventoryError::NoImagesFound(input_root.to_path_buf()));
    }
    emit(events, PipelineEvent::ImagesFound { count: paths.len() });

    let records = stat_records(paths, source)?;
    let required_bytes = records.iter().map(|r| r.size).sum();
    let available_bytes = preflight(required_bytes, &output, probe)?;
    emit(
        events,
        PipelineEvent::SpaceChecked {
            required: required_bytes,
            available: available_bytes,
        },
    );

    Ok(Inventory {
        records,
        required_bytes,
        available_bytes,
    })
}

fn canonical(path: &Path) -> Result<PathBuf, InventoryError> {
    path.canonicalize()
        .map_err(|source| InventoryError::Resolve {
            path: path.to_path_buf(),
            source,
        })
}
