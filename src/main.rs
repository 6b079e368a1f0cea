use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use log::LevelFilter;
use media_dedup::library::{candidate_paths, LibraryKind};
use media_dedup::utils::format_gib;
use media_dedup::{notify, CandidatePair, Deduplicator, Ffprobe, PathRewrites, RewriteRule, RunStatistics};

#[derive(Parser)]
#[command(
    name = "media-dedup",
    version,
    about = "Replace duplicate media shared by two libraries with hardlinks",
    long_about = "Match the files of two movie or TV library databases, rank each duplicate pair by resolution, codec and bit rate, and write a shell script that replaces the worse copy with a hardlink to the better one."
)]
struct Cli {
    /// Two movie-library databases to match against each other
    #[arg(
        long,
        num_args = 2,
        value_names = ["DB_A", "DB_B"],
        value_delimiter = ',',
        env = "MEDIA_DEDUP_RADARR",
        help = "Movie library databases (sqlite) to compare"
    )]
    radarr: Option<Vec<PathBuf>>,

    /// Two TV-library databases to match against each other
    #[arg(
        long,
        num_args = 2,
        value_names = ["DB_A", "DB_B"],
        value_delimiter = ',',
        env = "MEDIA_DEDUP_SONARR",
        help = "TV library databases (sqlite) to compare"
    )]
    sonarr: Option<Vec<PathBuf>>,

    /// Path prefix rewrites, tried in the order given
    #[arg(
        short,
        long,
        value_name = "PREFIX:REPLACEMENT",
        value_delimiter = ',',
        env = "MEDIA_DEDUP_REWRITE",
        help = "Rewrite library paths to local paths (can be specified multiple times)"
    )]
    rewrite: Vec<RewriteRule>,

    /// Where to write the script
    #[arg(
        short,
        long,
        value_name = "PATH",
        help = "Write the script here instead of stdout ('-' for stdout)"
    )]
    output: Option<PathBuf>,

    /// Webhook that receives the run summary
    #[arg(long, value_name = "URL", env = "MEDIA_DEDUP_WEBHOOK", help = "Post a summary to this webhook")]
    webhook: Option<String>,

    /// Prober executable
    #[arg(
        long,
        value_name = "PATH",
        default_value = "ffprobe",
        env = "MEDIA_DEDUP_FFPROBE",
        help = "ffprobe binary used to read stream metadata"
    )]
    ffprobe: PathBuf,

    /// Number of resolver threads
    #[arg(
        short,
        long,
        default_value = "0",
        help = "Number of threads (0 = twice the CPU count)"
    )]
    jobs: usize,

    /// Hide the progress bar
    #[arg(long, help = "Do not show a progress bar")]
    no_progress: bool,

    /// Verbose output
    #[arg(short, long, help = "Enable verbose output")]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if args.verbose { LevelFilter::Debug } else { LevelFilter::Warn })
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .init();

    if args.radarr.is_none() && args.sonarr.is_none() {
        eprintln!("{}", style("Error: at least one of --radarr or --sonarr must be given").red());
        std::process::exit(1);
    }

    let rewrites = PathRewrites::from_rules(args.rewrite);

    let mut pairs = Vec::new();
    for (kind, dbs) in [(LibraryKind::Movies, &args.radarr), (LibraryKind::Episodes, &args.sonarr)] {
        if let Some(dbs) = dbs {
            pairs.extend(library_pairs(kind, dbs, &rewrites)?);
        }
    }

    eprintln!(
        "{}",
        style(format!("🔍 Resolving {} candidate pairs...", pairs.len())).cyan().bold()
    );

    let mut dedup = Deduplicator::new(Ffprobe::new(&args.ffprobe));
    dedup.set_jobs(args.jobs);
    dedup.set_show_progress(!args.no_progress);
    let (script, stats) = dedup.run(pairs)?;

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) if path.as_os_str() != "-" => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        _ => Box::new(BufWriter::new(io::stdout().lock())),
    };
    script.write_to(&mut out, &stats).context("Failed to write script")?;
    drop(out);

    print_summary(&stats);

    if let Some(url) = &args.webhook {
        notify::send_alert(url, &stats).context("Failed to deliver alert")?;
    }

    Ok(())
}

fn library_pairs(kind: LibraryKind, dbs: &[PathBuf], rewrites: &PathRewrites) -> Result<Vec<CandidatePair>> {
    let [db_a, db_b] = dbs else {
        anyhow::bail!("expected two {} databases, got {}", kind, dbs.len());
    };
    let raw = candidate_paths(kind, db_a, db_b)
        .with_context(|| format!("Failed to read {} from {} and {}", kind, db_a.display(), db_b.display()))?;

    Ok(raw
        .iter()
        .map(|(p1, p2)| CandidatePair::from_library_paths(p1, p2, rewrites))
        .collect())
}

fn print_summary(stats: &RunStatistics) {
    eprintln!();
    eprintln!("{}", style("📈 Summary").green().bold());
    eprintln!("{}", style("-".repeat(20)).green());
    eprintln!(
        "Already linked: {} files ({})",
        stats.files_already_linked,
        format_gib(stats.already_saved_bytes)
    );
    eprintln!(
        "To link: {} files ({})",
        stats.files_to_link,
        format_gib(stats.projected_savings_bytes)
    );
    if stats.failed_pairs > 0 {
        eprintln!("{}", style(format!("Skipped pairs: {}", stats.failed_pairs)).yellow());
    }
}
