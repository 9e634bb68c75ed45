// SPDX-FileCopyrightText: Copyright © 2024-2026 hny Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Forward-direction reconciliation: shift geister to their new targets,
//! running `clean`/`setup` lifecycle steps, commit the pending snapshot, and
//! remove stale entries.

use prefixlib::Step;

use crate::error::Result;
use crate::set::{PackageSet, PairSet};
use crate::state::State;

/// For each (geist, package) pair in `newgeister`:
/// - clean the geist's previous package first, if the geist pre-existed and
///   the new package is freshly fetched;
/// - shift the geist to its new package unconditionally;
/// - setup the new package, if it was freshly fetched.
pub fn apply_new_geister(state: &State, newgeister: &PairSet, newpackages: &PackageSet) -> Result<()> {
    for (geist, package) in newgeister.iter() {
        state.check_interrupted()?;

        let is_new_package = newpackages.contains(package);

        if is_new_package {
            if let Some(old_package) = state.current().find(geist) {
                state.prefix().spawn(geist, old_package, Step::Clean)?;
            }
        }

        state.prefix().shift(geist, package)?;

        if is_new_package {
            state.prefix().spawn(geist, package, Step::Setup)?;
        }
    }

    state.check_interrupted()
}

/// Commit `pending` as `current`. The rename is the linearization point at
/// which the transition becomes durable.
pub fn apply_pending(state: &mut State) -> Result<()> {
    state.commit_pending()?;
    state.check_interrupted()
}

/// Remove directories no longer referenced by `current` and symlinks not
/// listed in `current`, without ever deleting a package still referenced by
/// a surviving geist.
pub fn apply_cleanup(state: &State) -> Result<()> {
    let prefix_path = state.prefix_path();

    for entry in fs_err::read_dir(prefix_path)? {
        state.check_interrupted()?;

        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();

        if name.starts_with('.') {
            continue;
        }

        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            if !state.packages().contains(&name) {
                state.prefix().remove_package(&name)?;
            }
        } else if file_type.is_symlink() {
            if !state.current().contains(&name) {
                state.prefix().unlink_geist(&name)?;
            }
        } else {
            log::warn!("invalid entry in prefix {prefix_path:?}: {name}");
        }
    }

    state.check_interrupted()
}
