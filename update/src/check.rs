// SPDX-FileCopyrightText: Copyright © 2024-2026 hny Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Read-only queries deciding which recovery branch the driver takes.

use crate::error::Result;
use crate::set::PairSet;
use crate::state::State;

/// True iff there's no pending snapshot to recover.
pub fn check_pending(state: &State) -> bool {
    state.pending_is_empty()
}

/// True iff at least one pair in `newgeister` is already shifted in the
/// prefix, meaning a prior run got far enough that apply can be completed
/// rather than annulled.
pub fn check_new_geister(state: &State, newgeister: &PairSet) -> Result<bool> {
    for (geist, package) in newgeister.iter() {
        state.check_interrupted()?;

        if let Some(target) = state.prefix().read_geist(geist)? {
            if target == package {
                return Ok(true);
            }
        }
    }

    Ok(false)
}
