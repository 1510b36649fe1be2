//! # Photocleaner
//!
//! One-off photo-library cleanup: find images whose decoded content is
//! identical, keep one copy of each, and re-archive the survivors into a fresh
//! tree organized by year and month.
//!
//! # Architecture: Five-Stage Pipeline
//!
//! Each stage fully consumes the previous stage's output before the next one
//! starts. Nothing re-enters an earlier stage.
//!
//! ```text
//! 1. Inventory   input/        →  Vec<ImageRecord>      (walk, stat, free-space preflight)
//! 2. Signatures  records       →  signed + skipped      (decode histogram, SHA-256)
//! 3. Grouping    signed        →  representatives       (exact signature equality)
//! 4. Planning    representatives → ArchivePlan          (YYYY/MM buckets)
//! 5. Copying     plan          →  output/YYYY/MM/NNNNNN_name.ext
//! ```
//!
//! Only stage 2 runs in parallel. Its per-file results are collected in input
//! order, so the set of signatures never depends on which worker finished first.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`inventory`] | Stage 1: walks the input root, stats images, checks free space |
//! | [`signature`] | Stage 2: histogram signatures, per-file decode failures skipped |
//! | [`grouping`] | Stage 3: groups by signature, picks one representative per group |
//! | [`plan`] | Stage 4: buckets representatives by (year, month) |
//! | [`archive`] | Stage 5: creates bucket directories and copies with sequence prefixes |
//! | [`pipeline`] | Runs the stages in order and reports a [`pipeline::RunSummary`] |
//! | [`types`] | Records shared by every stage (`ImageRecord`, `Signature`) |
//! | [`imaging`] | Decode service: [`imaging::HistogramDecoder`] + pure-Rust implementation |
//! | [`disk`] | Free-space service: [`disk::SpaceProbe`] backed by `sysinfo` |
//! | [`paths`] | Input validation and output directory preparation |
//! | [`events`] | Progress events streamed from the stages to the CLI |
//! | [`output`] | CLI output formatting |
//! | [`config`] | `photocleaner.toml` loading, merging, and validation |
//!
//! # Design Decisions
//!
//! ## Exact Histograms, Not Perceptual Hashes
//!
//! Two images are duplicates when their decoded per-channel histograms
//! serialize to the same bytes. That is deliberately strict: re-encoded or
//! resized copies are not merged. The histogram is hashed with SHA-256 so a
//! signature is a fixed 32-byte key that sorts and compares cheaply.
//!
//! ## Deterministic Representatives
//!
//! The inventory walks directories in sorted order and every group orders its
//! members by path, so the survivor of a duplicate set is always the member
//! with the smallest path. Runs over the same tree keep the same files.
//!
//! ## Sequence-Prefixed Output Names
//!
//! Output files are named `NNNNNN_<original name>` with a run-wide sequence
//! starting at zero. Two kept photos called `IMG_0001.JPG` from different
//! cameras can land in the same month without colliding.
//!
//! ## No Rollback
//!
//! A failed copy aborts the run and leaves what was already written. The
//! output tree is a fresh archive, never the only copy of a photo.

pub mod archive;
pub mod config;
pub mod disk;
pub mod events;
pub mod grouping;
pub mod imaging;
pub mod inventory;
pub mod output;
pub mod paths;
pub mod pipeline;
pub mod plan;
pub mod signature;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
