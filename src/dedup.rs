use std::sync::mpsc;
use std::sync::Arc;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use rand::Rng;

use crate::error::Result;
use crate::probe::Prober;
use crate::resolver::{resolve, ResolutionOutcome};
use crate::script::OperationScript;
use crate::{CandidatePair, MediaFile, RunStatistics};

/// Settings for a resolution run
#[derive(Debug, Clone)]
pub struct DedupConfig {
    /// Worker threads; 0 means twice the logical CPU count
    pub jobs: usize,
    pub show_progress: bool,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            jobs: 0,
            show_progress: false,
        }
    }
}

type DiagnosticSink = Box<dyn Fn(&str) + Send + Sync>;

fn stderr_diagnostic(line: &str) {
    eprintln!("{} {}", style("skipped").yellow().bold(), line);
}

/// Resolves candidate pairs in parallel and folds the results into a script
pub struct Deduplicator<P> {
    prober: Arc<P>,
    config: DedupConfig,
    diagnostics: DiagnosticSink,
}

impl<P: Prober + 'static> Deduplicator<P> {
    pub fn new(prober: P) -> Self {
        Self {
            prober: Arc::new(prober),
            config: DedupConfig::default(),
            diagnostics: Box::new(stderr_diagnostic),
        }
    }

    pub fn set_jobs(&mut self, jobs: usize) {
        self.config.jobs = jobs;
    }

    pub fn set_show_progress(&mut self, show: bool) {
        self.config.show_progress = show;
    }

    /// Where per-pair failure lines go; stderr unless replaced
    pub fn set_diagnostics(&mut self, sink: impl Fn(&str) + Send + Sync + 'static) {
        self.diagnostics = Box::new(sink);
    }

    /// Probing waits on a subprocess, so the pool is oversubscribed
    pub fn worker_count(&self) -> usize {
        match self.config.jobs {
            0 => 2 * num_cpus::get(),
            n => n,
        }
    }

    pub fn run(&self, pairs: Vec<CandidatePair>) -> Result<(OperationScript, RunStatistics)> {
        self.run_with_rng(pairs, &mut rand::thread_rng())
    }

    /// Resolve every pair; `rng` settles ties between equivalent copies.
    ///
    /// Results are folded on the calling thread as workers finish them, so the
    /// order of blocks in the script follows completion, not input order.
    pub fn run_with_rng<R: Rng>(
        &self,
        pairs: Vec<CandidatePair>,
        rng: &mut R,
    ) -> Result<(OperationScript, RunStatistics)> {
        let workers = self.worker_count();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("resolve-{}", i))
            .build()?;
        info!("resolving {} pairs on {} workers", pairs.len(), workers);

        let progress = self.progress_bar(pairs.len() as u64);
        let (tx, rx) = mpsc::channel();

        for pair in pairs {
            let tx = tx.clone();
            let prober = Arc::clone(&self.prober);
            pool.spawn(move || {
                let outcome = resolve(prober.as_ref(), &pair);
                // The receiver lives until every sender is gone
                let _ = tx.send((pair, outcome));
            });
        }
        drop(tx);

        let mut script = OperationScript::new();
        let mut stats = RunStatistics::new();

        for (pair, outcome) in rx {
            match outcome {
                ResolutionOutcome::AlreadyLinked { size } => {
                    stats.record_already_linked(size);
                }
                ResolutionOutcome::Failed(err) => {
                    debug!("pair failed: {:?}", err);
                    let line = format!("{} <-> {}: {}", pair.path1.display(), pair.path2.display(), err);
                    progress.suspend(|| (self.diagnostics)(&line));
                    stats.record_failure();
                }
                ResolutionOutcome::Ranked { better, worse, tie } => {
                    let (kept, discarded) = if tie {
                        choose_kept(rng, better, worse)
                    } else {
                        (better, worse)
                    };
                    script.push_link(&kept, &discarded, tie);
                    stats.record_link(discarded.size);
                }
            }
            progress.inc(1);
        }

        progress.finish_and_clear();
        Ok((script, stats))
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }
        let progress = ProgressBar::new(len);
        if let Ok(bar_style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        {
            progress.set_style(bar_style.progress_chars("##-"));
        }
        progress
    }
}

/// Split two equivalent files into `(kept, discarded)` with even odds
pub fn choose_kept<R: Rng>(rng: &mut R, a: MediaFile, b: MediaFile) -> (MediaFile, MediaFile) {
    if rng.gen::<bool>() {
        (a, b)
    } else {
        (b, a)
    }
}
