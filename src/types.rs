//! Records shared by all pipeline stages.
//!
//! An [`ImageRecord`] is created by the inventory, gains its [`Signature`]
//! exactly once in the signature stage, and is read-only from then on.

use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fmt;
use std::fs::Metadata;
use std::io;
use std::path::PathBuf;
use std::time::SystemTime;

/// Which filesystem timestamp dates an image.
///
/// One source is used for the whole run; the two are never mixed.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TimestampSource {
    /// Last modification time (`mtime`).
    #[default]
    Modified,
    /// Creation (birth) time. Not every filesystem records it.
    Created,
}

impl TimestampSource {
    /// Read the selected timestamp from file metadata.
    pub fn read(self, metadata: &Metadata) -> io::Result<SystemTime> {
        match self {
            TimestampSource::Modified => metadata.modified(),
            TimestampSource::Created => metadata.created(),
        }
    }
}

impl fmt::Display for TimestampSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimestampSource::Modified => f.write_str("modified"),
            TimestampSource::Created => f.write_str("created"),
        }
    }
}

/// Content signature of a decoded image: SHA-256 of its canonical histogram.
///
/// Ordering is byte-wise, which is what the grouper iterates by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Signature([u8; 32]);

impl Signature {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// First 12 hex digits, enough to tell duplicate sets apart in logs.
    pub fn short(&self) -> String {
        self.to_string()[..12].to_string()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// One discovered image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    /// Absolute path; unique within a run.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// Timestamp from the run's [`TimestampSource`].
    pub timestamp: SystemTime,
    /// Absent until the signature stage assigns it.
    pub signature: Option<Signature>,
}

impl ImageRecord {
    pub fn new(path: PathBuf, size: u64, timestamp: SystemTime) -> Self {
        Self {
            path,
            size,
            timestamp,
            signature: None,
        }
    }

    /// Consume the record and return it carrying `signature`.
    pub fn with_signature(self, signature: Signature) -> Self {
        Self {
            signature: Some(signature),
            ..self
        }
    }

    /// Base file name exactly as stored on disk.
    pub fn base_name(&self) -> &OsStr {
        self.path.file_name().unwrap_or(self.path.as_os_str())
    }

    /// Base file name, lossily converted for display.
    pub fn file_name(&self) -> String {
        self.base_name().to_string_lossy().into_owned()
    }
}
