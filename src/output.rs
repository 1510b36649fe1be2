//! CLI output formatting for all pipeline stages.
//!
//! # Output Format
//!
//! ```text
//! ==> Inventory
//! Found 3 images
//! 982374912 bytes of free disk space are available, 18 bytes needed
//! ==> Signatures
//! [ 33%] /photos/A.jpg
//! [ 66%] /photos/B.jpg
//! Skipping /photos/broken.jpg: Decode failed: ...
//! ==> Grouping
//! Identical photos (3fa81c0b22de):
//!     Keeping   /photos/A.jpg
//!     Duplicate /photos/B.jpg
//! ==> Planning
//! 2 photos to process in 2 folders
//! ==> Copying
//! [ 50%] A.jpg → /archive/2020/03/000000_A.jpg
//! [100%] C.png → /archive/2021/11/000001_C.png
//!
//! Found 3 images, skipped 1 unreadable, dropped 1 duplicate in 1 set, archived 2
//! ```
//!
//! # Architecture
//!
//! [`format_event`] and [`format_summary`] are pure and return lines for
//! testability. [`print_summary`] writes to stdout; event printing happens
//! on the binary's listener thread.

use crate::events::{PipelineEvent, Stage};
use crate::pipeline::RunSummary;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Integer percentage of `completed` out of `total`. An empty total is 100%.
pub fn percent(completed: usize, total: usize) -> usize {
    if total == 0 {
        return 100;
    }
    completed.saturating_mul(100) / total
}

/// `[ 42%]` progress prefix, right-aligned to three digits.
fn progress_prefix(completed: usize, total: usize) -> String {
    format!("[{:>3}%]", percent(completed, total))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

fn stage_title(stage: Stage) -> &'static str {
    match stage {
        Stage::Inventory => "Inventory",
        Stage::Signatures => "Signatures",
        Stage::Grouping => "Grouping",
        Stage::Planning => "Planning",
        Stage::Copying => "Copying",
    }
}

// ============================================================================
// Events
// ============================================================================

/// Format a single pipeline event as display lines.
pub fn format_event(event: &PipelineEvent) -> Vec<String> {
    match event {
        PipelineEvent::StageStarted(stage) => vec![format!("==> {}", stage_title(*stage))],
        PipelineEvent::ImagesFound { count } => {
            vec![format!("Found {}", plural(*count, "image", "images"))]
        }
        PipelineEvent::SpaceChecked {
            required,
            available,
        } => vec![format!(
            "{available} bytes of free disk space are available, {required} bytes needed"
        )],
        PipelineEvent::SignatureComputed {
            completed,
            total,
            path,
        } => vec![format!(
            "{} {}",
            progress_prefix(*completed, *total),
            path.display()
        )],
        PipelineEvent::DecodeSkipped { path, reason, .. } => {
            vec![format!("Skipping {}: {}", path.display(), reason)]
        }
        PipelineEvent::DuplicateSet {
            signature,
            kept,
            duplicates,
        } => {
            let mut lines = vec![format!("Identical photos ({}):", signature.short())];
            lines.push(format!("    Keeping   {}", kept.display()));
            for dup in duplicates {
                lines.push(format!("    Duplicate {}", dup.display()));
            }
            lines
        }
        PipelineEvent::PlanReady { images, buckets } => vec![format!(
            "{} to process in {}",
            plural(*images, "photo", "photos"),
            plural(*buckets, "folder", "folders")
        )],
        PipelineEvent::FileCopied {
            completed,
            total,
            source,
            destination,
        } => vec![format!(
            "{} {} → {}",
            progress_prefix(*completed, *total),
            file_name(source),
            destination.display()
        )],
    }
}

// ============================================================================
// Summary
// ============================================================================

pub fn format_summary(summary: &RunSummary) -> Vec<String> {
    vec![
        String::new(),
        format!(
            "Found {}, skipped {} unreadable, dropped {} in {}, archived {}",
            plural(summary.images_found, "image", "images"),
            summary.skipped,
            plural(summary.duplicates, "duplicate", "duplicates"),
            plural(summary.duplicate_sets, "set", "sets"),
            summary.copied
        ),
    ]
}

/// Print the run summary to stdout.
pub fn print_summary(summary: &RunSummary) {
    for line in format_summary(summary) {
        println!("{}", line);
    }
}
