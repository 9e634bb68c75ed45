// SPDX-FileCopyrightText: Copyright © 2024-2026 hny Developers
//
// SPDX-License-Identifier: MPL-2.0

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("open prefix at {0:?}")]
    Open(PathBuf, #[source] std::io::Error),

    #[error("lock prefix at {0:?}")]
    Lock(PathBuf, #[source] nix::errno::Errno),

    #[error("io")]
    Io(#[from] std::io::Error),

    #[error("spawn {step} step for {subject}")]
    Spawn {
        step: &'static str,
        subject: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{step} step for {subject} was terminated by signal {signal}")]
    Signaled {
        step: &'static str,
        subject: String,
        signal: i32,
    },

    #[error("{step} step for {subject} exited with status {code}")]
    NonZeroExit {
        step: &'static str,
        subject: String,
        code: i32,
    },

    #[error("decompress archive for {0}")]
    ErrorDecompress(String, #[source] std::io::Error),

    #[error("unpack archive for {0}")]
    ErrorArchive(String, #[source] std::io::Error),
}
