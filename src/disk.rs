//! Free-space queries for the inventory preflight.

use std::io;
use std::path::{Path, PathBuf};
use sysinfo::Disks;

/// Reports how many bytes can still be written under a path.
pub trait SpaceProbe {
    fn free_bytes(&self, path: &Path) -> io::Result<u64>;
}

/// Probe backed by the mounted-volume list from `sysinfo`.
pub struct SystemDisks;

impl SpaceProbe for SystemDisks {
    fn free_bytes(&self, path: &Path) -> io::Result<u64> {
        let target = path.canonicalize()?;
        let disks = Disks::new_with_refreshed_list();
        let volumes: Vec<(PathBuf, u64)> = disks
            .list()
            .iter()
            .map(|d| (d.mount_point().to_path_buf(), d.available_space()))
            .collect();

        volume_for(&target, &volumes).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no mounted volume contains {}", target.display()),
            )
        })
    }
}

/// Available bytes of the volume whose mount point is the longest prefix of `target`.
fn volume_for(target: &Path, volumes: &[(PathBuf, u64)]) -> Option<u64> {
    volumes
        .iter()
        .filter(|(mount, _)| target.starts_with(mount))
        .max_by_key(|(mount, _)| mount.components().count())
        .map(|(_, available)| *available)
}
