// SPDX-FileCopyrightText: Copyright © 2024-2026 hny Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Termination-signal guard: installs a handler for SIGTERM, and for
//! SIGINT when attached to a terminal, which sets a one-shot flag rather
//! than acting directly. Every long loop in apply/annul/cleanup/fetch polls
//! that flag at the top of each iteration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

static SHOULD_EXIT: OnceLock<Arc<AtomicBool>> = OnceLock::new();

extern "C" fn handle_termination(_signo: i32) {
    if let Some(flag) = SHOULD_EXIT.get() {
        flag.store(true, Ordering::SeqCst);
    }
}

/// Install the termination handler, returning the flag it sets. Call once
/// per process; a second call is a no-op and returns the original flag.
pub fn protect(interactive: bool) -> Arc<AtomicBool> {
    let flag = SHOULD_EXIT.get_or_init(|| Arc::new(AtomicBool::new(false))).clone();

    let action = SigAction::new(SigHandler::Handler(handle_termination), SaFlags::SA_RESTART, SigSet::empty());

    // Safety: handle_termination only performs an atomic store, which is
    // async-signal-safe.
    unsafe {
        let _ = sigaction(Signal::SIGTERM, &action);
        if interactive {
            let _ = sigaction(Signal::SIGINT, &action);
        }
    }

    flag
}
