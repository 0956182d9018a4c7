// followback entry point.
// Parses arguments, sets up logging, runs the analysis, and maps failures to exit codes.

use std::io::{self, Write};
use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use followback::cli::Cli;
use followback::{
    Config, ConsoleSink, CredentialChain, ExportOutcome, Exporter, FollowCache, GitHubClient,
    Report, Result, ResultSink, Retrying, Summary, Tracker, analyze, any_failed,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(cli).await;
    finish(result, &mut io::stderr())
}

/// Exit code for a finished run. Terminal errors are reported on `err`;
/// a run where any export file failed still exits with failure.
fn finish(result: Result<Vec<ExportOutcome>>, err: &mut impl Write) -> ExitCode {
    match result {
        Ok(outcomes) if any_failed(&outcomes) => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            let _ = writeln!(err, "Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("followback={}", level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<Vec<ExportOutcome>> {
    let credentials = CredentialChain::for_cli(&cli);
    let config = Config::from_cli(&cli, &credentials);
    if config.client.token.is_none() {
        info!("No token configured, using unauthenticated requests (60 requests/hour)");
    }

    let cache = FollowCache::new(&config.cache);
    if cli.clear_cache {
        info!(dir = %config.cache.dir.display(), "Clearing cache");
        cache.clear(None)?;
    }

    let client = GitHubClient::new(&config.client)?;
    let tracker = Tracker::new(Retrying::new(client, config.retry), cache);

    info!(username = %cli.username, "Analyzing GitHub user");
    let snapshot = tracker.snapshot(&cli.username).await?;
    let analysis = analyze(&snapshot.followers, &snapshot.following);
    let summary = Summary::new(&snapshot.profile, &analysis.stats, Utc::now());

    let mut sink = ConsoleSink::stdout(config.max_display);
    sink.present(&Report {
        summary: &summary,
        analysis: &analysis,
    })?;

    let mut outcomes = Vec::new();
    if config.export.enabled {
        let exporter = Exporter::new(&config.export);
        println!();
        outcomes = exporter.export_run(
            &cli.username,
            &summary,
            &analysis,
            &snapshot.followers,
            &snapshot.following,
        );
        for outcome in &outcomes {
            sink.exported(outcome)?;
        }
    }

    let rate_limit = tracker.source().inner().rate_limit();
    if rate_limit.limit > 0 {
        info!(
            remaining = rate_limit.remaining,
            limit = rate_limit.limit,
            "GitHub API rate limit"
        );
    }

    println!("\nAnalysis complete!");
    Ok(outcomes)
}
