// SPDX-FileCopyrightText: Copyright © 2024-2026 hny Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Backward-direction reconciliation: undo a partially-applied update.
//! Because the forward apply may have progressed arbitrarily by the time
//! annul runs, annul cleans by package name rather than trusting the geist
//! symlink to still exist.

use prefixlib::Step;

use crate::error::Result;
use crate::set::{PackageSet, PairSet};
use crate::state::State;

/// For each (geist, package) pair in `newgeister`:
/// - clean the freshly-fetched package if its directory still exists;
/// - if the geist pre-existed, shift it back to its old package and, if the
///   new package had been fetched, rerun `setup` for the old one;
/// - otherwise the geist is brand new: unlink it without touching the
///   package it may have pointed at (cleanup reclaims true orphans).
pub fn annul_new_geister(state: &State, newgeister: &PairSet, newpackages: &PackageSet) -> Result<()> {
    for (geist, package) in newgeister.iter() {
        state.check_interrupted()?;

        let is_new_package = newpackages.contains(package);

        if is_new_package && state.prefix().has_package(package) {
            // Use the package as the subject: the geist symlink may already
            // have been removed during a partial apply.
            state.prefix().spawn(package, package, Step::Clean)?;
        }

        if let Some(old_package) = state.current().find(geist) {
            state.prefix().shift(geist, old_package)?;

            if is_new_package {
                state.prefix().spawn(geist, old_package, Step::Setup)?;
            }
        } else {
            state.prefix().unlink_geist(geist)?;
        }
    }

    state.check_interrupted()
}

/// Unlink `pending` and empty the in-memory set.
pub fn annul_pending(state: &mut State) -> Result<()> {
    state.discard_pending()?;
    state.check_interrupted()
}
