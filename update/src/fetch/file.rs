// SPDX-FileCopyrightText: Copyright © 2024-2026 hny Developers
//
// SPDX-License-Identifier: MPL-2.0

//! `file://<path>` scheme: reads a pre-staged snapshot and package archives
//! straight off a local directory.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::set::PackageSet;
use crate::state::State;

use super::Scheme;

const SNAPSHOT_FILE: &str = "snapshot";
const PACKAGES_DIR: &str = "packages";

#[derive(Default)]
pub struct FileScheme {
    root: PathBuf,
}

impl Scheme for FileScheme {
    fn open(&mut self, uri: &str) -> Result<()> {
        let parsed = url::Url::parse(uri).map_err(|_| Error::MalformedUri(uri.to_owned()))?;
        let root = parsed.to_file_path().map_err(|()| Error::MalformedUri(uri.to_owned()))?;

        if !root.is_dir() {
            return Err(Error::MalformedUri(uri.to_owned()));
        }

        self.root = root;
        Ok(())
    }

    fn snapshot(&mut self, state: &mut State) -> Result<()> {
        let bytes = fs_err::read(self.root.join(SNAPSHOT_FILE))?;
        state.write_pending_snapshot(&bytes)?;
        state.reload_pending()?;
        Ok(())
    }

    fn packages(&mut self, state: &State, newpackages: &PackageSet) -> Result<()> {
        let packages_dir = self.root.join(PACKAGES_DIR);

        for package in newpackages.iter() {
            state.check_interrupted()?;
            prefixlib::extract_package(&packages_dir, package, state.prefix_path())?;
        }

        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
