pub mod error;
pub mod probe;
pub mod quality;
pub mod rewrite;
pub mod resolver;
pub mod script;
pub mod dedup;
pub mod library;
pub mod notify;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;

use std::path::PathBuf;

pub use error::{Error, Result};
pub use probe::{Ffprobe, MediaDescriptor, Prober};
pub use rewrite::{PathRewrites, RewriteRule};
pub use resolver::{resolve, ResolutionOutcome};
pub use script::OperationScript;
pub use dedup::{DedupConfig, Deduplicator};

/// Two paths that the libraries say hold the same movie or episode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePair {
    pub path1: PathBuf,
    pub path2: PathBuf,
}

impl CandidatePair {
    pub fn new(path1: impl Into<PathBuf>, path2: impl Into<PathBuf>) -> Self {
        Self {
            path1: path1.into(),
            path2: path2.into(),
        }
    }

    /// Build a pair from raw library paths, rewriting both through `rewrites`
    pub fn from_library_paths(path1: &str, path2: &str, rewrites: &PathRewrites) -> Self {
        Self::new(rewrites.apply(path1), rewrites.apply(path2))
    }
}

/// A file on disk together with the size it occupies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub path: PathBuf,
    pub size: u64,
}

/// Totals accumulated over one run. Every field only ever grows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStatistics {
    pub files_already_linked: usize,
    pub already_saved_bytes: u64,
    pub files_to_link: usize,
    pub projected_savings_bytes: u64,
    pub failed_pairs: usize,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_already_linked(&mut self, size: u64) {
        self.files_already_linked += 1;
        self.already_saved_bytes += size;
    }

    pub fn record_link(&mut self, discarded_size: u64) {
        self.files_to_link += 1;
        self.projected_savings_bytes += discarded_size;
    }

    pub fn record_failure(&mut self) {
        self.failed_pairs += 1;
    }

    /// Space saved once the generated script has run
    pub fn total_saved_bytes(&self) -> u64 {
        self.already_saved_bytes + self.projected_savings_bytes
    }
}
