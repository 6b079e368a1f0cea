use std::cmp::Ordering;

use log::debug;

use crate::error::{Error, Result};
use crate::probe::Prober;
use crate::quality::compare;
use crate::utils::{file_identity, FileIdentity};
use crate::{CandidatePair, MediaFile};

/// What one candidate pair turned out to be
#[derive(Debug)]
pub enum ResolutionOutcome {
    /// Both paths already share an inode; `size` is that file's size
    AlreadyLinked { size: u64 },
    /// Distinct files; `tie` is set when neither copy is better
    Ranked {
        better: MediaFile,
        worse: MediaFile,
        tie: bool,
    },
    /// Stat or probe failed; the pair is left alone
    Failed(Error),
}

/// Decide whether a pair is already linked and, if not, which copy to keep.
///
/// The prober is only consulted once both paths are known to be distinct files.
pub fn resolve<P: Prober + ?Sized>(prober: &P, pair: &CandidatePair) -> ResolutionOutcome {
    let identities = file_identity(&pair.path1).and_then(|a| Ok((a, file_identity(&pair.path2)?)));
    let (id1, id2) = match identities {
        Ok(ids) => ids,
        Err(e) => return ResolutionOutcome::Failed(e),
    };

    if id1.same_file(&id2) {
        debug!("already linked: {} = {}", pair.path1.display(), pair.path2.display());
        return ResolutionOutcome::AlreadyLinked { size: id1.size };
    }

    if let Err(e) = check_linkable(pair, &id1, &id2) {
        return ResolutionOutcome::Failed(e);
    }

    let descriptors = prober
        .probe(&pair.path1)
        .and_then(|a| Ok((a, prober.probe(&pair.path2)?)));
    let (d1, d2) = match descriptors {
        Ok(ds) => ds,
        Err(e) => return ResolutionOutcome::Failed(e),
    };

    let first = MediaFile {
        path: pair.path1.clone(),
        size: id1.size,
    };
    let second = MediaFile {
        path: pair.path2.clone(),
        size: id2.size,
    };

    match compare(&d1, &d2) {
        Ordering::Less => ResolutionOutcome::Ranked {
            better: second,
            worse: first,
            tie: false,
        },
        ordering => ResolutionOutcome::Ranked {
            better: first,
            worse: second,
            tie: ordering == Ordering::Equal,
        },
    }
}

/// A hardlink cannot cross filesystems, so `rm` would run and `ln` would fail
fn check_linkable(pair: &CandidatePair, id1: &FileIdentity, id2: &FileIdentity) -> Result<()> {
    if id1.same_device(id2) {
        Ok(())
    } else {
        Err(Error::CrossDevice {
            path1: pair.path1.clone(),
            path2: pair.path2.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::MediaDescriptor;
    use crate::test_utils::{media_file, FakeProber};
    use tempfile::tempdir;

    #[cfg(unix)]
    #[test]
    fn test_hardlinked_pair_skips_probe() {
        let dir = tempdir().unwrap();
        let a = media_file(dir.path(), "radarr/Movie (2020)/movie.mkv", 1234);
        let b = dir.path().join("radarr4k/movie.mkv");
        std::fs::create_dir_all(b.parent().unwrap()).unwrap();
        std::fs::hard_link(&a, &b).unwrap();

        let prober = FakeProber::new();
        let outcome = resolve(&prober, &CandidatePair::new(&a, &b));

        assert!(matches!(outcome, ResolutionOutcome::AlreadyLinked { size: 1234 }));
        assert_eq!(prober.calls(), 0);
    }

    #[test]
    fn test_missing_path_fails_identity_check() {
        let dir = tempdir().unwrap();
        let a = media_file(dir.path(), "a.mkv", 10);
        let prober = FakeProber::new();

        let outcome = resolve(&prober, &CandidatePair::new(&a, dir.path().join("missing.mkv")));

        assert!(matches!(outcome, ResolutionOutcome::Failed(Error::IdentityCheck { .. })));
        assert_eq!(prober.calls(), 0);
    }

    #[test]
    fn test_cross_device_pair_is_not_linkable() {
        let pair = CandidatePair::new("/mnt/disk1/a.mkv", "/mnt/disk2/a.mkv");
        let on = |dev, ino| FileIdentity {
            inode: Some((dev, ino)),
            size: 1,
        };

        let err = check_linkable(&pair, &on(1, 5), &on(2, 5)).unwrap_err();
        assert!(matches!(err, Error::CrossDevice { ref path1, .. } if *path1 == pair.path1));
        assert!(check_linkable(&pair, &on(1, 5), &on(1, 6)).is_ok());
    }

    #[test]
    fn test_probe_failure_fails_pair() {
        let dir = tempdir().unwrap();
        let a = media_file(dir.path(), "a.mkv", 10);
        let b = media_file(dir.path(), "b.mkv", 10);
        let prober = FakeProber::new().with(&a, MediaDescriptor::video(1920, 1080, "h264", 1));

        let outcome = resolve(&prober, &CandidatePair::new(&a, &b));

        assert!(matches!(outcome, ResolutionOutcome::Failed(Error::Probe { .. })));
    }

    #[test]
    fn test_ranks_better_second_path() {
        let dir = tempdir().unwrap();
        let a = media_file(dir.path(), "a.mkv", 500);
        let b = media_file(dir.path(), "b.mkv", 300);
        let prober = FakeProber::new()
            .with(&a, MediaDescriptor::video(1920, 1080, "h264", 5_000_000))
            .with(&b, MediaDescriptor::video(1920, 1080, "hevc", 3_000_000));

        match resolve(&prober, &CandidatePair::new(&a, &b)) {
            ResolutionOutcome::Ranked { better, worse, tie } => {
                assert_eq!(better, MediaFile { path: b, size: 300 });
                assert_eq!(worse, MediaFile { path: a, size: 500 });
                assert!(!tie);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(prober.calls(), 2);
    }

    #[test]
    fn test_equivalent_files_are_a_tie() {
        let dir = tempdir().unwrap();
        let a = media_file(dir.path(), "a.mkv", 1);
        let b = media_file(dir.path(), "b.mkv", 1);
        let same = MediaDescriptor::video(1280, 720, "hevc", 2_000_000);
        let prober = FakeProber::new().with(&a, same.clone()).with(&b, same);

        let outcome = resolve(&prober, &CandidatePair::new(&a, &b));

        assert!(matches!(outcome, ResolutionOutcome::Ranked { tie: true, .. }));
    }
}
