// SPDX-FileCopyrightText: Copyright © 2024-2026 hny Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Owns the prefix handle and the snapshots directory, reconciles
//! `current`/`pending` at startup, and serves as the single source of truth
//! mutated by fetch/apply/annul.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use prefixlib::Prefix;

use crate::dirfd;
use crate::error::{Error, Result};
use crate::set::{PackageSet, PairSet};
use crate::snapshot;

const CURRENT: &str = "current";
const PENDING: &str = "pending";

pub struct State {
    prefix: Prefix,
    snapshots_dir: fs_err::File,
    snapshots_path: PathBuf,
    current: PairSet,
    pending: PairSet,
    packages: PackageSet,
    should_exit: Arc<AtomicBool>,
}

impl State {
    /// Open `prefix_root`, lock it, open the snapshots directory at
    /// `snapshots_path`, and reconcile `current`/`pending` against whatever
    /// an interrupted prior run left behind.
    pub fn open(
        prefix_root: impl Into<PathBuf>,
        blocking: bool,
        snapshots_path: impl Into<PathBuf>,
        should_exit: Arc<AtomicBool>,
    ) -> Result<Self> {
        let snapshots_path = snapshots_path.into();
        fs_err::create_dir_all(&snapshots_path)?;

        let prefix = Prefix::open(prefix_root, blocking)?;
        let snapshots_dir = fs_err::File::open(&snapshots_path)?;

        let mut state = Self {
            prefix,
            snapshots_dir,
            snapshots_path,
            current: PairSet::new(),
            pending: PairSet::new(),
            packages: PackageSet::new(),
            should_exit,
        };

        state.reconcile()?;

        Ok(state)
    }

    fn path_of(&self, name: &str) -> PathBuf {
        self.snapshots_path.join(name)
    }

    fn exists(&self, name: &str) -> bool {
        std::fs::symlink_metadata(self.path_of(name)).is_ok()
    }

    fn reconcile(&mut self) -> Result<()> {
        let has_current = self.exists(CURRENT);
        let has_pending = self.exists(PENDING);

        match (has_current, has_pending) {
            (true, false) => {
                self.parse_current()?;
            }
            (true, true) => {
                self.parse_current()?;

                let pending_size = fs_err::metadata(self.path_of(PENDING))?.len();
                if pending_size > 0 {
                    self.parse_pending()?;
                } else {
                    dirfd::unlink(&self.snapshots_dir, PENDING)?;
                }
            }
            (false, true) => {
                dirfd::rename(&self.snapshots_dir, PENDING, CURRENT)?;
                self.parse_current()?;
            }
            (false, false) => {
                // Blank install: both sets stay empty, fetch fills pending.
            }
        }

        Ok(())
    }

    fn parse_current(&mut self) -> Result<()> {
        let path = self.path_of(CURRENT);
        let bytes = fs_err::read(&path)?;
        self.current = snapshot::parse(&bytes, &path)?;

        self.packages.clear();
        for (_, package) in self.current.iter() {
            self.packages.insert(package.to_owned());
        }

        Ok(())
    }

    fn parse_pending(&mut self) -> Result<()> {
        let path = self.path_of(PENDING);
        let bytes = fs_err::read(&path)?;
        self.pending = snapshot::parse(&bytes, &path)?;
        Ok(())
    }

    /// Write `bytes` to `pending` by first writing a sibling temp file and
    /// renaming it into place, rather than relying on a single `write` call
    /// being atomic.
    pub fn write_pending_snapshot(&self, bytes: &[u8]) -> Result<()> {
        let tmp_name = ".pending.update-tmp";
        fs_err::write(self.path_of(tmp_name), bytes)?;
        dirfd::rename(&self.snapshots_dir, tmp_name, PENDING)?;
        Ok(())
    }

    /// Re-read `pending` from disk after a scheme has written it.
    pub fn reload_pending(&mut self) -> Result<()> {
        self.parse_pending()
    }

    /// Compute `newgeister`/`newpackages` from `pending`.
    pub fn diff(&self) -> (PairSet, PackageSet) {
        let mut newgeister = PairSet::new();
        let mut newpackages = PackageSet::new();

        for (geist, package) in self.pending.iter() {
            newgeister.insert(geist, package);
            if !self.packages.contains(package) {
                newpackages.insert(package.to_owned());
            }
        }

        (newgeister, newpackages)
    }

    /// Unlink `current`, rename `pending` onto it, and reparse.
    ///
    /// The unlink tolerates a missing `current`: a blank install commits its
    /// first snapshot with no prior `current` to remove.
    pub fn commit_pending(&mut self) -> Result<()> {
        match dirfd::unlink(&self.snapshots_dir, CURRENT) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }

        dirfd::rename(&self.snapshots_dir, PENDING, CURRENT)?;

        self.pending.clear();
        self.parse_current()?;

        Ok(())
    }

    /// Unlink `pending` and empty the in-memory set.
    pub fn discard_pending(&mut self) -> Result<()> {
        dirfd::unlink(&self.snapshots_dir, PENDING)?;
        self.pending.clear();
        Ok(())
    }

    pub fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    pub fn current(&self) -> &PairSet {
        &self.current
    }

    pub fn pending(&self) -> &PairSet {
        &self.pending
    }

    pub fn pending_is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn packages(&self) -> &PackageSet {
        &self.packages
    }

    pub fn prefix_path(&self) -> &Path {
        self.prefix.path()
    }

    /// Check the termination flag, returning `Err(Error::Interrupted)` when
    /// it has been set, for use at the top of every long-running loop.
    pub fn check_interrupted(&self) -> Result<()> {
        if self.should_exit.load(Ordering::SeqCst) {
            Err(Error::Interrupted)
        } else {
            Ok(())
        }
    }
}
