// SPDX-FileCopyrightText: Copyright © 2024-2026 hny Developers
//
// SPDX-License-Identifier: MPL-2.0

use std::os::unix::fs::ExitStatusExt;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::process::Command;

use nix::fcntl::{flock, FlockArg};

use crate::error::Error;

/// A lifecycle step a package can define under `<package>/hny/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Clean,
    Setup,
}

impl Step {
    fn name(self) -> &'static str {
        match self {
            Step::Clean => "clean",
            Step::Setup => "setup",
        }
    }
}

/// A locked handle onto a prefix directory.
///
/// Mirrors `hny_open`/`hny_lock` from the prefix library: construction opens
/// and locks the prefix, `Drop` releases the lock, closing the underlying
/// file descriptor (`hny_unlock`/`hny_close`).
#[derive(Debug)]
pub struct Prefix {
    root: PathBuf,
    lock: fs_err::File,
}

impl Prefix {
    /// Open `root` as a prefix and take its exclusive advisory lock.
    ///
    /// `blocking` mirrors the `HNY_FLAGS_BLOCK` flag: when set, waits for the
    /// lock to become available instead of failing immediately.
    pub fn open(root: impl Into<PathBuf>, blocking: bool) -> Result<Self, Error> {
        let root = root.into();

        fs_err::create_dir_all(&root).map_err(|source| Error::Open(root.clone(), source.into()))?;

        let lock = fs_err::File::open(&root).map_err(|source| Error::Open(root.clone(), source.into()))?;

        let arg = if blocking {
            FlockArg::LockExclusive
        } else {
            FlockArg::LockExclusiveNonblock
        };

        flock(lock.as_raw_fd(), arg).map_err(|source| Error::Lock(root.clone(), source))?;

        log::trace!("locked prefix at {root:?}");

        Ok(Self { root, lock })
    }

    /// Absolute path of the prefix directory.
    pub fn path(&self) -> &Path {
        &self.root
    }

    fn entry(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Atomically (re)point the `geist` symlink at `package`.
    ///
    /// A no-op in effect when the link already points at `package`: the
    /// replacement always lands on the same target.
    pub fn shift(&self, geist: &str, package: &str) -> Result<(), Error> {
        let target = self.entry(geist);
        let tmp = self.entry(&format!(".{geist}.update-tmp"));

        let _ = fs_err::remove_file(&tmp);
        std::os::unix::fs::symlink(package, &tmp)?;
        fs_err::rename(&tmp, &target)?;

        Ok(())
    }

    /// Unlink the `geist` symlink without touching whatever it pointed at.
    pub fn unlink_geist(&self, geist: &str) -> Result<(), Error> {
        fs_err::remove_file(self.entry(geist)).map_err(Into::into)
    }

    /// Recursively remove a package directory.
    pub fn remove_package(&self, package: &str) -> Result<(), Error> {
        fs_err::remove_dir_all(self.entry(package)).map_err(Into::into)
    }

    /// True if `package` exists as a directory in the prefix.
    pub fn has_package(&self, package: &str) -> bool {
        self.entry(package).is_dir()
    }

    /// Read the current target of a geist symlink, if it exists.
    ///
    /// A missing symlink (`ENOENT`) is reported as `Ok(None)`, matching the
    /// prefix library's contract that an absent geist isn't an error.
    pub fn read_geist(&self, geist: &str) -> Result<Option<String>, Error> {
        match fs_err::read_link(self.entry(geist)) {
            Ok(target) => Ok(Some(target.to_string_lossy().into_owned())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Fork and exec `package`'s `hny/clean` or `hny/setup` script, passing
    /// `subject` as its sole argument, and await its completion.
    ///
    /// `subject` is usually the geist name, except in annul's orphan-cleanup
    /// path where the geist symlink may already be gone and the package name
    /// is passed instead (see `update::annul`).
    ///
    /// Missing scripts are treated as an absent lifecycle hook, not an error.
    pub fn spawn(&self, subject: &str, package: &str, step: Step) -> Result<(), Error> {
        let script = self.entry(package).join("hny").join(step.name());

        if !script.is_file() {
            return Ok(());
        }

        let status = Command::new(&script)
            .arg(subject)
            .current_dir(&self.root)
            .status()
            .map_err(|source| Error::Spawn {
                step: step.name(),
                subject: subject.to_owned(),
                source,
            })?;

        if let Some(signal) = status.signal() {
            return Err(Error::Signaled {
                step: step.name(),
                subject: subject.to_owned(),
                signal,
            });
        }

        match status.code() {
            Some(0) => Ok(()),
            Some(code) => Err(Error::NonZeroExit {
                step: step.name(),
                subject: subject.to_owned(),
                code,
            }),
            None => Ok(()),
        }
    }
}

impl Drop for Prefix {
    fn drop(&mut self) {
        if let Err(error) = flock(self.lock.as_raw_fd(), FlockArg::Unlock) {
            log::warn!("failed to unlock prefix at {:?}: {error}", self.root);
        }
    }
}
