//! Autosave inspector - browse and manage persisted state snapshots.
//!
//! Provides both human-friendly and agent-friendly (robot mode) interfaces
//! over the same snapshot log the engine writes.
#![forbid(unsafe_code)]

use chrono::Utc;
use clap::Parser;
use tracing::{debug, info};

use autosave::cli::{Cli, Commands};
use autosave::config::{load_or_default, AutosaveConfig};
use autosave::error::{AutosaveError, Result};
use autosave::logging::init_logging;
use autosave::output::{ConfigView, LogListing, Output, OutputMode, SnapshotView};
use autosave::snapshot::{SnapshotStore, SnapshotSummary};
use autosave::WORKING_ENTRIES;

fn main() {
    let cli = Cli::parse();
    let mode = OutputMode::from_cli(&cli);
    init_logging(mode.is_robot(), cli.verbose, cli.quiet);

    let output = mode.into_output();
    if let Err(e) = run(&cli, output.as_ref()) {
        output.error(&e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli, output: &dyn Output) -> Result<()> {
    let config = effective_config(cli)?;
    debug!(key = %config.key, backend = config.backend.as_str(), "Effective configuration");

    match &cli.command {
        Commands::Config => cmd_config(cli, &config, output),
        Commands::List => cmd_list(&config, output),
        Commands::Slots => cmd_slots(&config, output),
        Commands::Show(args) => cmd_show(&config, args.seq, output),
        Commands::Latest => cmd_latest(&config, output),
        Commands::Clear => cmd_clear(&config, output),
    }
}

fn effective_config(cli: &Cli) -> Result<AutosaveConfig> {
    let mut config = load_or_default(cli.config.as_deref())?;
    if let Some(key) = &cli.key {
        config = config.with_key(key.as_str());
    }
    config.validate()?;
    Ok(config)
}

fn open_store(config: &AutosaveConfig) -> Result<SnapshotStore> {
    let store = SnapshotStore::open(config)?;
    info!(backend = store.backend_name(), key = %config.key, "Snapshot store opened");
    Ok(store)
}

// === Commands ===

fn cmd_config(cli: &Cli, config: &AutosaveConfig, output: &dyn Output) -> Result<()> {
    let data_dir = config.resolved_data_dir()?;
    output.config(&ConfigView::new(config, cli.config.as_deref(), &data_dir));
    Ok(())
}

fn cmd_list(config: &AutosaveConfig, output: &dyn Output) -> Result<()> {
    let store = open_store(config)?;
    let now = Utc::now();
    let entries: Vec<SnapshotSummary> = store
        .try_load_all(&config.key)?
        .iter()
        .map(|s| s.summary(now))
        .collect();

    output.snapshot_list(&LogListing {
        key: &config.key,
        count: entries.len(),
        entries: &entries,
    });
    Ok(())
}

fn cmd_slots(config: &AutosaveConfig, output: &dyn Output) -> Result<()> {
    let store = open_store(config)?;
    let now = Utc::now();
    let entries: Vec<SnapshotSummary> = store
        .try_load_all(&config.key)?
        .iter()
        .skip(WORKING_ENTRIES)
        .map(|s| s.summary(now))
        .collect();

    output.slot_list(&LogListing {
        key: &config.key,
        count: entries.len(),
        entries: &entries,
    });
    Ok(())
}

fn cmd_show(config: &AutosaveConfig, seq: u64, output: &dyn Output) -> Result<()> {
    let store = open_store(config)?;
    let snapshot = store.load(&config.key, seq)?;
    output.snapshot(&SnapshotView {
        key: &config.key,
        summary: snapshot.summary(Utc::now()),
        data: &snapshot.data,
    });
    Ok(())
}

fn cmd_latest(config: &AutosaveConfig, output: &dyn Output) -> Result<()> {
    let store = open_store(config)?;
    let Some(snapshot) = store.try_load_all(&config.key)?.into_iter().next() else {
        return Err(AutosaveError::Other(format!(
            "No snapshots persisted for '{}'",
            config.key
        )));
    };
    output.snapshot(&SnapshotView {
        key: &config.key,
        summary: snapshot.summary(Utc::now()),
        data: &snapshot.data,
    });
    Ok(())
}

fn cmd_clear(config: &AutosaveConfig, output: &dyn Output) -> Result<()> {
    let store = open_store(config)?;
    let removed = store.clear(&config.key)?;
    output.cleared(&config.key, removed);
    Ok(())
}
