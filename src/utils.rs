use std::fs;
use std::path::Path;

use humansize::{format_size, BINARY};

use crate::error::{Error, Result};

const GIB: f64 = (1u64 << 30) as f64;

/// Format file size in human-readable binary units
pub fn format_file_size(size: u64) -> String {
    format_size(size, BINARY)
}

/// Size in binary gigabytes with two decimals, e.g. `1.50 GiB`
pub fn format_gib(size: u64) -> String {
    format!("{:.2} GiB", size as f64 / GIB)
}

/// What `stat` tells us about one side of a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileIdentity {
    /// `(device, inode)`, where the platform exposes them
    pub inode: Option<(u64, u64)>,
    pub size: u64,
}

impl FileIdentity {
    /// Both entries name the same inode on the same device
    pub fn same_file(&self, other: &FileIdentity) -> bool {
        matches!((self.inode, other.inode), (Some(a), Some(b)) if a == b)
    }

    /// Whether a hardlink between the two is possible; unknown counts as yes
    pub fn same_device(&self, other: &FileIdentity) -> bool {
        match (self.inode, other.inode) {
            (Some((dev_a, _)), Some((dev_b, _))) => dev_a == dev_b,
            _ => true,
        }
    }
}

/// Stat a path, following symlinks
pub fn file_identity(path: &Path) -> Result<FileIdentity> {
    let meta = fs::metadata(path).map_err(|source| Error::IdentityCheck {
        path: path.to_path_buf(),
        source,
    })?;

    #[cfg(unix)]
    let inode = {
        use std::os::unix::fs::MetadataExt;
        Some((meta.dev(), meta.ino()))
    };

    // No stable inode numbers here, so nothing counts as already linked
    #[cfg(not(unix))]
    let inode = None;

    Ok(FileIdentity {
        inode,
        size: meta.len(),
    })
}
