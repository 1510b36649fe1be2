//! Year/month bucketing of representatives.
//!
//! Stage 4 of the pipeline. Pure: no I/O.
//!
//! Each representative's timestamp is placed on the calendar of a time zone
//! (the local zone in production) and keyed by `(year, month)`. Within a
//! bucket images are ordered by timestamp, then by path. Buckets exist only
//! for months that actually contain an image.
//!
//! ```text
//! 2020/03  →  [A.jpg (2020-03-01), D.jpg (2020-03-17)]
//! 2021/11  →  [C.png (2021-11-30)]
//! ```

use crate::types::ImageRecord;
use chrono::{DateTime, Datelike, Local, TimeZone, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Timestamp of {0} does not fall on a four-digit year")]
    InvalidTimestamp(PathBuf),
}

/// `(year, month)` archive bucket. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketKey {
    pub year: i32,
    pub month: u32,
}

impl BucketKey {
    /// `YYYY/MM` relative directory for this bucket.
    pub fn relative_dir(&self) -> PathBuf {
        PathBuf::from(format!("{:04}", self.year)).join(format!("{:02}", self.month))
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}/{:02}", self.year, self.month)
    }
}

/// Representatives keyed by bucket, each bucket in copy order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchivePlan {
    buckets: BTreeMap<BucketKey, Vec<ImageRecord>>,
}

impl ArchivePlan {
    /// Buckets in ascending `(year, month)` order.
    pub fn buckets(&self) -> impl Iterator<Item = (&BucketKey, &[ImageRecord])> {
        self.buckets.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn bucket(&self, key: &BucketKey) -> Option<&[ImageRecord]> {
        self.buckets.get(key).map(Vec::as_slice)
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn image_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Plan against the local time zone.
pub fn build_plan(representatives: Vec<ImageRecord>) -> Result<ArchivePlan, PlanError> {
    build_plan_in(representatives, &Local)
}

/// Plan against an explicit time zone.
pub fn build_plan_in<Tz: TimeZone>(
    representatives: Vec<ImageRecord>,
    tz: &Tz,
) -> Result<ArchivePlan, PlanError> {
    let mut buckets: BTreeMap<BucketKey, Vec<ImageRecord>> = BTreeMap::new();
    for record in representatives {
        let key = bucket_key(record.timestamp, tz)
            .ok_or_else(|| PlanError::InvalidTimestamp(record.path.clone()))?;
        buckets.entry(key).or_default().push(record);
    }

    for images in buckets.values_mut() {
        images.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.path.cmp(&b.path)));
    }

    Ok(ArchivePlan { buckets })
}

/// Calendar bucket of `timestamp` in `tz`, or `None` outside years 0000-9999.
pub fn bucket_key<Tz: TimeZone>(timestamp: SystemTime, tz: &Tz) -> Option<BucketKey> {
    let local = to_utc(timestamp)?.with_timezone(tz);
    let year = local.year();
    if !(0..=9999).contains(&year) {
        return None;
    }
    Some(BucketKey {
        year,
        month: local.month(),
    })
}

/// Checked `SystemTime` → `DateTime<Utc>`, including instants before 1970.
fn to_utc(timestamp: SystemTime) -> Option<DateTime<Utc>> {
    match timestamp.duration_since(UNIX_EPOCH) {
        Ok(after) => DateTime::from_timestamp(i64::try_from(after.as_secs()).ok()?, after.subsec_nanos()),
        Err(before) => {
            let before = before.duration();
            let secs = i64::try_from(before.as_secs()).ok()?;
            match before.subsec_nanos() {
                0 => DateTime::from_timestamp(-secs, 0),
                nanos => DateTime::from_timestamp(-secs - 1, 1_000_000_000 - nanos),
            }
        }
    }
}
