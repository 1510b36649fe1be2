//! Duplicate detection by exact signature equality.
//!
//! Stage 3 of the pipeline. [`group`] is a pure function from signed records
//! to [`SignatureGroup`]s; [`select`] turns the groups into the set of
//! representatives to archive and the duplicate sets to report.
//!
//! ## Ordering
//!
//! - Groups come out in ascending signature order.
//! - Members inside a group are ordered by path. Because the inventory walks
//!   directories in sorted order, this is also discovery order.
//! - The first member is the representative. The choice is arbitrary but
//!   fixed: the smallest path survives, never the newest or the largest file.
//!
//! A run where no group has a second member has nothing to clean up and stops
//! with [`GroupError::NoDuplicatesFound`].

use crate::types::{ImageRecord, Signature};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GroupError {
    #[error("There are no identical photos, there's nothing to do")]
    NoDuplicatesFound,
}

/// Records sharing one signature. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureGroup {
    signature: Signature,
    members: Vec<ImageRecord>,
}

impl SignatureGroup {
    pub fn signature(&self) -> Signature {
        self.signature
    }

    pub fn members(&self) -> &[ImageRecord] {
        &self.members
    }

    /// The member that survives: the first in path order.
    pub fn representative(&self) -> &ImageRecord {
        &self.members[0]
    }

    /// Every member except the representative.
    pub fn duplicates(&self) -> &[ImageRecord] {
        &self.members[1..]
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn has_duplicates(&self) -> bool {
        self.members.len() > 1
    }
}

/// Partition signed records by signature. Unsigned records are ignored.
pub fn group(records: &[ImageRecord]) -> Vec<SignatureGroup> {
    let mut by_signature: BTreeMap<Signature, Vec<ImageRecord>> = BTreeMap::new();
    for record in records {
        if let Some(signature) = record.signature {
            by_signature.entry(signature).or_default().push(record.clone());
        }
    }

    by_signature
        .into_iter()
        .map(|(signature, mut members)| {
            members.sort_by(|a, b| a.path.cmp(&b.path));
            SignatureGroup { signature, members }
        })
        .collect()
}

/// Representatives to archive plus the duplicate sets that were found.
#[derive(Debug, Clone)]
pub struct Selection {
    /// One record per group, in group (signature) order.
    pub representatives: Vec<ImageRecord>,
    /// Groups with more than one member, in signature order.
    pub duplicate_sets: Vec<SignatureGroup>,
}

impl Selection {
    /// Number of records dropped as duplicates.
    pub fn duplicate_count(&self) -> usize {
        self.duplicate_sets.iter().map(|g| g.duplicates().len()).sum()
    }
}

/// Pick one representative per group.
///
/// Fails with [`GroupError::NoDuplicatesFound`] when every group is a singleton.
pub fn select(groups: Vec<SignatureGroup>) -> Result<Selection, GroupError> {
    if !groups.iter().any(SignatureGroup::has_duplicates) {
        return Err(GroupError::NoDuplicatesFound);
    }

    let representatives = groups.iter().map(|g| g.representative().clone()).collect();
    let duplicate_sets = groups.into_iter().filter(|g| g.has_duplicates()).collect();

    Ok(Selection {
        representatives,
        duplicate_sets,
    })
}
