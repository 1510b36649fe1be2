//! Shared test utilities for the photocleaner test suite.
//!
//! Provides fixture writers (plain files, small PNGs), timestamp builders,
//! record constructors for the pure stages, and a fixed-size [`SpaceProbe`].
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = tmp.path().join("2020/a.png");
//! write_png(&path, [255, 0, 0]);
//! set_modified(&path, local_time(2020, 3, 15));
//!
//! let records = vec![signed("/p/a.jpg", 1), signed("/p/b.jpg", 1)];
//! ```

use crate::disk::SpaceProbe;
use crate::imaging::backend::tests::shade_histogram;
use crate::signature::signature_of;
use crate::types::ImageRecord;
use chrono::{Local, TimeZone, Utc};
use image::{Rgb, RgbImage};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

// =========================================================================
// Files on disk
// =========================================================================

/// Write `bytes` to `path`, creating parent directories.
pub fn write_file(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, bytes).unwrap();
}

/// Write a 16x16 single-color RGB PNG, creating parent directories.
pub fn write_png(path: &Path, rgb: [u8; 3]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    RgbImage::from_pixel(16, 16, Rgb(rgb))
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

/// Set the modification time of an existing file.
pub fn set_modified(path: &Path, time: SystemTime) {
    fs::OpenOptions::new()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

/// Write `bytes` with modification time `time` and return the matching record.
pub fn record_file(path: &Path, bytes: &[u8], time: SystemTime) -> ImageRecord {
    write_file(path, bytes);
    set_modified(path, time);
    ImageRecord::new(path.to_path_buf(), bytes.len() as u64, time)
}

// =========================================================================
// Timestamps
// =========================================================================

/// Noon local time on the given date.
pub fn local_time(year: i32, month: u32, day: u32) -> SystemTime {
    Local
        .with_ymd_and_hms(year, month, day, 12, 0, 0)
        .single()
        .unwrap_or_else(|| panic!("ambiguous local time {year}-{month}-{day}"))
        .into()
}

/// `hour`:00 UTC on the given date.
pub fn utc_time(year: i32, month: u32, day: u32, hour: u32) -> SystemTime {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .unwrap()
        .into()
}

// =========================================================================
// Records for the pure stages
// =========================================================================

/// Unsigned record with size 1 and a fixed timestamp.
pub fn record(path: &str) -> ImageRecord {
    record_at(path, utc_time(2020, 1, 1, 12))
}

/// Unsigned record with size 1 at `time`.
pub fn record_at(path: &str, time: SystemTime) -> ImageRecord {
    ImageRecord::new(PathBuf::from(path), 1, time)
}

/// Record signed as if its histogram were a single `shade`.
pub fn signed(path: &str, shade: u8) -> ImageRecord {
    record(path).with_signature(signature_of(&shade_histogram(shade)))
}

// =========================================================================
// Services
// =========================================================================

/// Probe that reports the same free space for every path.
pub struct FixedSpace(pub u64);

impl SpaceProbe for FixedSpace {
    fn free_bytes(&self, _path: &Path) -> io::Result<u64> {
        Ok(self.0)
    }
}
