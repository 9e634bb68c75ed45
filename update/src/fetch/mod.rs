// SPDX-FileCopyrightText: Copyright © 2024-2026 hny Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Fetch facade: dispatches to a scheme selected by the URI's scheme
//! component, matched case-insensitively against the full table.

mod file;
mod https;

use crate::error::{Error, Result};
use crate::set::PackageSet;
use crate::state::State;

trait Scheme {
    fn open(&mut self, uri: &str) -> Result<()>;
    fn snapshot(&mut self, state: &mut State) -> Result<()>;
    fn packages(&mut self, state: &State, newpackages: &PackageSet) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}

/// A single-shot fetch session against one URI.
pub struct Fetcher {
    scheme: Box<dyn Scheme>,
}

/// Open `uri`, selecting a scheme by its URI scheme component.
pub fn open(uri: &str) -> Result<Fetcher> {
    let parsed = url::Url::parse(uri).map_err(|_| Error::MalformedUri(uri.to_owned()))?;

    let mut scheme: Box<dyn Scheme> = match parsed.scheme().to_ascii_lowercase().as_str() {
        "file" => Box::<file::FileScheme>::default(),
        "https" => Box::<https::HttpsScheme>::default(),
        _ => return Err(Error::UnknownScheme(uri.to_owned())),
    };

    scheme.open(uri)?;

    Ok(Fetcher { scheme })
}

impl Fetcher {
    /// Fetch the remote snapshot and write it as `pending`.
    pub fn snapshot(&mut self, state: &mut State) -> Result<()> {
        self.scheme.snapshot(state)
    }

    /// Fetch and extract every package named in `newpackages`.
    pub fn packages(&mut self, state: &State, newpackages: &PackageSet) -> Result<()> {
        self.scheme.packages(state, newpackages)
    }

    pub fn close(mut self) -> Result<()> {
        self.scheme.close()
    }
}
