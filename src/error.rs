use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Errors produced while matching, probing and linking duplicate media
#[derive(Error, Debug)]
pub enum Error {
    /// The prober could not be run, exited non-zero, or printed something unparseable
    #[error("probe failed for {path}: {reason}")]
    Probe { path: PathBuf, reason: String },

    /// The probe succeeded but the file carries no video stream
    #[error("no video stream in {0}")]
    MissingVideoStream(PathBuf),

    /// Could not stat one side of a pair
    #[error("cannot stat {path}: {source}")]
    IdentityCheck {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The two copies live on different filesystems and cannot be hardlinked
    #[error("{path1} and {path2} are on different devices")]
    CrossDevice { path1: PathBuf, path2: PathBuf },

    /// The alert webhook rejected the summary or could not be reached
    #[error("alert delivery failed: {0}")]
    AlertDelivery(#[from] reqwest::Error),

    #[error("library database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A rewrite rule that is not of the form `prefix:replacement`
    #[error("invalid rewrite rule '{0}', expected PREFIX:REPLACEMENT")]
    InvalidRewrite(String),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn probe(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::Probe {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
