// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use trackbridge_catalog::{DestinationClient, SourceClient};
use trackbridge_config::AppConfig;
use trackbridge_matching::{MatchResolver, PlaylistSyncService, ProgressEvent, SyncReport};

/// Sync playlists and saved tracks from one streaming catalog to another.
#[derive(Debug, Parser)]
#[command(name = "trackbridge", version)]
struct Cli {
    /// Resolve matches and print a summary without writing anything.
    #[arg(long)]
    dry_run: bool,

    /// Only transfer the named source playlist.
    #[arg(long)]
    playlist: Option<String>,

    /// Sync source playlists to destination playlists.
    #[arg(long)]
    playlists: bool,

    /// Sync saved tracks to destination favorites.
    #[arg(long)]
    saved_tracks: bool,

    /// Enable verbose (debug) logging.
    #[arg(long)]
    verbose: bool,

    /// Path to a TOML configuration file.
    #[arg(long, env = "TRACKBRIDGE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = trackbridge_config::load(cli.config.as_deref())?;
    if config.source.base_url.is_empty() || config.destination.base_url.is_empty() {
        bail!("source and destination base URLs must be configured");
    }

    // --playlist implies playlists-only; with no selection, sync everything.
    let do_playlists = cli.playlists || cli.playlist.is_some();
    let do_saved = cli.saved_tracks && cli.playlist.is_none();
    let (do_playlists, do_saved) = if !do_playlists && !do_saved {
        (true, true)
    } else {
        (do_playlists, do_saved)
    };

    let source = SourceClient::from_config(&config.source)?;
    let destination = Arc::new(DestinationClient::from_config(
        &config.destination,
        &config.search,
    )?);
    let resolver = MatchResolver::from_config(
        destination.clone(),
        &config.matcher,
        &config.search,
    );
    let service = PlaylistSyncService::new(
        resolver,
        destination,
        config.sync.playlist_description.clone(),
    );

    let (progress, receiver) = mpsc::channel(256);
    let printer = tokio::spawn(print_progress(receiver));

    let mut overall_matched = 0usize;
    let mut overall_unmatched = 0usize;

    if do_playlists {
        let mut playlists = source.user_playlists().await?;
        if let Some(wanted) = &cli.playlist {
            playlists.retain(|p| p.title.eq_ignore_ascii_case(wanted));
            if playlists.is_empty() {
                bail!("playlist '{}' not found in the source library", wanted);
            }
        }
        if playlists.is_empty() {
            println!("No source playlists found.");
        }

        for playlist in playlists {
            info!(target: "cli", title = %playlist.title, "processing playlist");
            let tracks = source.playlist_tracks(&playlist.id).await?;
            let report = service
                .sync_playlist(&playlist.title, &tracks, cli.dry_run, Some(&progress))
                .await?;
            print_report(&playlist.title, &report, cli.dry_run);
            overall_matched += report.matched;
            overall_unmatched += report.unmatched;
        }
    }

    if do_saved {
        info!(target: "cli", "processing saved tracks");
        let tracks = source.saved_tracks().await?;
        let report = service
            .sync_favorites(&tracks, cli.dry_run, Some(&progress))
            .await?;
        print_report("Saved Tracks", &report, cli.dry_run);
        overall_matched += report.matched;
        overall_unmatched += report.unmatched;
    }

    drop(progress);
    let _ = printer.await;

    if cli.dry_run {
        println!(
            "Dry run complete: {} matched, {} unmatched.",
            overall_matched, overall_unmatched
        );
    } else {
        println!(
            "Completed: {} tracks added, {} unmatched.",
            overall_matched, overall_unmatched
        );
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let fmt_layer = fmt::layer().with_target(true).with_level(true);
    let default = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

async fn print_progress(mut receiver: mpsc::Receiver<ProgressEvent>) {
    while let Some(event) = receiver.recv().await {
        if let ProgressEvent::TrackResolved { index, total, .. } = event {
            let done = index + 1;
            if done % 50 == 0 || done == total {
                println!("  Resolved {}/{} tracks…", done, total);
            }
        }
    }
}

fn print_report(title: &str, report: &SyncReport, dry_run: bool) {
    println!(
        "{}: {}/{} matched ({} unmatched){}",
        title,
        report.matched,
        report.total,
        report.unmatched,
        if dry_run { ", dry run: nothing written" } else { "" }
    );
}
