use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use marquee_core::{resolve_library, AppConfig, BatchReport, ExactTierPick, MarqueeError, Resolver};
use marquee_parse::ParsedName;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "marquee", version, about = "Match video files to movie and show titles")]
struct Cli {
    /// Log debug output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve every video file in a library folder.
    Scan {
        /// Library folder. Defaults to the folder scanned last time.
        dir: Option<PathBuf>,

        /// Resolution cache file to use instead of the configured one.
        #[arg(long)]
        results: Option<PathBuf>,

        /// Which exact match wins when several score above 0.9.
        #[arg(long)]
        pick: Option<ExactTierPick>,
    },
    /// Show what the normalizer extracts from file names.
    Parse {
        #[arg(required = true)]
        filenames: Vec<String>,

        /// Print JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },
    /// Print the config file location.
    ConfigPath,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.verbose);

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Stderr plus a daily log file in the data directory. The returned guard
/// flushes the file writer on drop.
fn init_logging(verbose: bool) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let default_filter = if verbose { "marquee=debug" } else { "marquee=info" };
    // "marquee" prefixes every crate target (marquee_core, marquee_api, ...).
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
    };

    let log_dir = AppConfig::data_dir().join("logs");
    let file_writer = std::fs::create_dir_all(&log_dir).ok().map(|_| {
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&log_dir, "marquee.log"))
    });

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    match file_writer {
        Some((writer, guard)) => {
            tracing_subscriber::registry()
                .with(filter())
                .with(stderr_layer)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false),
                )
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter())
                .with(stderr_layer)
                .init();
            None
        }
    }
}

async fn run(command: Command) -> Result<(), MarqueeError> {
    match command {
        Command::Scan { dir, results, pick } => scan(dir, results, pick).await,
        Command::Parse { filenames, json } => parse(&filenames, json),
        Command::ConfigPath => {
            println!("{}", AppConfig::config_path().display());
            Ok(())
        }
    }
}

async fn scan(
    dir: Option<PathBuf>,
    results: Option<PathBuf>,
    pick: Option<ExactTierPick>,
) -> Result<(), MarqueeError> {
    let mut config = AppConfig::load()?;
    if let Some(results) = results {
        config.library.results_file = Some(results);
    }
    if let Some(pick) = pick {
        config.matching.exact_tier_pick = pick;
    }

    let root = dir
        .or_else(|| config.library.last_dir.clone())
        .ok_or_else(|| {
            MarqueeError::Config("no library folder given and none scanned before".into())
        })?;

    let search = config.tmdb_client()?;
    let posters = config.poster_downloader()?;
    let resolver = Resolver::from_config(&config, search, posters)?;
    tracing::info!(
        path = %root.display(),
        results = %resolver.store().path().display(),
        "Starting scan"
    );

    let report = resolve_library(&resolver, &root, &config.library).await?;
    print_report(&report);

    config.library.last_dir = Some(root);
    if let Err(e) = config.save() {
        tracing::warn!(error = %e, "Failed to remember library folder");
    }
    Ok(())
}

fn print_report(report: &BatchReport) {
    for entry in &report.entries {
        let name = entry
            .path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        match &entry.result {
            Some(result) => {
                let year = result
                    .year()
                    .map(|y| format!(" ({y})"))
                    .unwrap_or_default();
                let marker = if result.year_mismatch { " [year?]" } else { "" };
                println!("{name}\n  -> {}{year}{marker}", result.title);
            }
            None => println!("{name}\n  -> Unknown"),
        }
    }
    println!(
        "\n{} files: {} matched, {} unknown",
        report.entries.len(),
        report.matched,
        report.unmatched
    );
}

fn parse(filenames: &[String], json: bool) -> Result<(), MarqueeError> {
    let normalizer = AppConfig::load()?.normalizer()?;
    let parsed: Vec<ParsedName> = filenames.iter().map(|f| normalizer.parse(f)).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&parsed)?);
        return Ok(());
    }

    for p in &parsed {
        println!("{}", p.original_name);
        println!("  title:      {}", p.clean_title);
        if let Some(year) = p.year {
            println!("  year:       {year}");
        }
        if let Some(part) = &p.part_number {
            println!("  part:       {part}");
        }
        if let Some(group) = &p.release_group {
            println!("  group:      {group}");
        }
        println!("  variations: {}", p.title_variations.join(" | "));
    }
    Ok(())
}
