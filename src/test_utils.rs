use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Error, Result};
use crate::probe::{MediaDescriptor, Prober};

/// Prober answering from a fixed table; unknown paths fail like a corrupt file
#[derive(Debug, Default)]
pub struct FakeProber {
    descriptors: HashMap<PathBuf, MediaDescriptor>,
    calls: AtomicUsize,
}

impl FakeProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &Path, descriptor: MediaDescriptor) -> Self {
        self.descriptors.insert(path.to_path_buf(), descriptor);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Prober for FakeProber {
    fn probe(&self, path: &Path) -> Result<MediaDescriptor> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.descriptors
            .get(path)
            .cloned()
            .ok_or_else(|| Error::probe(path, "Invalid data found when processing input"))
    }
}

/// Write a file of `size` zero bytes and return its path
pub fn media_file(dir: &Path, name: &str, size: usize) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, vec![0u8; size]).unwrap();
    path
}
