// SPDX-FileCopyrightText: Copyright © 2024-2026 hny Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Thin CLI wrapper around the update core: `update [-hb] [-p <prefix>]
//! [-s <snapshots>] <uri>` or `update -C [-hb] [-p <prefix>] [-s <snapshots>]`
//! for a consistency-only run.

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use update::{driver, signal, Error, Result, State};

/// Move a prefix from its current snapshot to a newly fetched one.
#[derive(Debug, Parser)]
#[command(name = "update", version)]
struct Cli {
    /// Block waiting for the prefix lock instead of failing immediately
    #[arg(short = 'b', long)]
    blocking: bool,

    /// Run consistency recovery only; do not fetch a new snapshot
    #[arg(short = 'C', long)]
    consistency: bool,

    /// Prefix directory to update (defaults to $HNY_PREFIX, then /hub)
    #[arg(short = 'p', long, value_name = "PREFIX")]
    prefix: Option<PathBuf>,

    /// Directory holding the `current`/`pending` snapshot files
    #[arg(short = 's', long, value_name = "SNAPSHOTS", default_value = "/data/update")]
    snapshots: PathBuf,

    /// Source URI to fetch the new snapshot and packages from
    uri: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    if cli.consistency && cli.uri.is_some() {
        Cli::command().error(clap::error::ErrorKind::ArgumentConflict, "a URI cannot be given with -C").exit();
    }
    if !cli.consistency && cli.uri.is_none() {
        Cli::command()
            .error(clap::error::ErrorKind::MissingRequiredArgument, "a URI is required unless -C is given")
            .exit();
    }

    let interactive = std::io::stdout().is_terminal();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let should_exit = signal::protect(interactive);

    let prefix = cli
        .prefix
        .clone()
        .or_else(|| std::env::var_os("HNY_PREFIX").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("/hub"));

    match run(&cli, prefix, should_exit) {
        Ok(()) => {}
        Err(Error::Interrupted) => {
            log::info!("termination requested, exiting cleanly");
        }
        Err(error) => {
            log::error!("{error}");
            let mut source = std::error::Error::source(&error);
            while let Some(err) = source {
                log::error!("caused by: {err}");
                source = err.source();
            }
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli, prefix: PathBuf, should_exit: std::sync::Arc<std::sync::atomic::AtomicBool>) -> Result<()> {
    let mut state = State::open(prefix, cli.blocking, &cli.snapshots, should_exit)?;

    driver::update_consistency(&mut state)?;

    if !cli.consistency {
        let uri = cli.uri.as_deref().expect("clap validation guarantees a URI here");
        driver::update_perform(&mut state, uri)?;
    }

    Ok(())
}
