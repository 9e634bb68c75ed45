// SPDX-FileCopyrightText: Copyright © 2024-2026 hny Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Orchestrates consistency-recovery, then an optional fetch+apply pass.
//! `Interrupted` propagates straight up to `main`, which treats it as a
//! clean, successful exit.

use crate::error::Result;
use crate::state::State;
use crate::{annul, apply, check, fetch};

/// Reconcile any interrupted prior run, then clean up stale prefix entries.
///
/// Note the order: `annul_new_geister` always runs before the decision to
/// re-apply. Annul reverses any half-done forward shifts; `apply_new_geister`
/// can then safely redo them because `shift` is idempotent when the current
/// target already matches.
pub fn update_consistency(state: &mut State) -> Result<()> {
    log::info!("consistency check for prefix at {:?}", state.prefix_path());

    if !check::check_pending(state) {
        log::info!("found a previous pending snapshot, attempting recovery");

        let (newgeister, newpackages) = state.diff();

        let all_fetched = check::check_new_geister(state, &newgeister)?;
        annul::annul_new_geister(state, &newgeister, &newpackages)?;

        if all_fetched {
            log::info!("all packages were fetched, applying the previous pending snapshot");
            apply::apply_new_geister(state, &newgeister, &newpackages)?;
            apply::apply_pending(state)?;
        } else {
            log::info!("not all packages were fetched, reverting the pending snapshot");
            annul::annul_pending(state)?;
        }
    }

    apply::apply_cleanup(state)?;

    log::info!("finished consistency check");
    Ok(())
}

/// Fetch a new snapshot from `uri` and apply it.
pub fn update_perform(state: &mut State, uri: &str) -> Result<()> {
    log::info!("fetching update from {uri}");

    let mut fetcher = fetch::open(uri)?;
    fetcher.snapshot(state)?;

    let (newgeister, newpackages) = state.diff();

    fetcher.packages(state, &newpackages)?;
    fetcher.close()?;

    log::info!("fetch finished, applying modifications");

    apply::apply_new_geister(state, &newgeister, &newpackages)?;
    apply::apply_pending(state)?;
    apply::apply_cleanup(state)?;

    log::info!("finished performing update");
    Ok(())
}
