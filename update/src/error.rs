// SPDX-FileCopyrightText: Copyright © 2024-2026 hny Developers
//
// SPDX-License-Identifier: MPL-2.0

use std::path::PathBuf;

/// Every fatal condition the core can report. `Interrupted` is the one
/// exception: the driver translates it into a clean, successful exit rather
/// than an error message.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed snapshot {path:?} at line {line}: {reason}")]
    InvalidSnapshot { path: PathBuf, line: usize, reason: String },

    #[error("prefix io")]
    PrefixIo(#[from] prefixlib::Error),

    #[error("io")]
    Io(#[from] std::io::Error),

    #[error("unsupported scheme for uri '{0}'")]
    UnknownScheme(String),

    #[error("malformed uri '{0}'")]
    MalformedUri(String),

    #[error("http request to {0} failed")]
    Transport(String, #[source] reqwest::Error),

    #[error("termination requested")]
    Interrupted,
}

pub type Result<T> = std::result::Result<T, Error>;
