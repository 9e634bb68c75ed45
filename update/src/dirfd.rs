// SPDX-FileCopyrightText: Copyright © 2024-2026 hny Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Thin `*at` wrappers so snapshot commits rename/unlink relative to a held
//! directory file descriptor rather than a recomputed path, so a rename
//! between `pending` and `current` can never race a concurrent move of the
//! snapshots directory itself.

use std::ffi::CString;
use std::io;
use std::os::unix::io::{AsRawFd, RawFd};

fn cstring(name: &str) -> CString {
    CString::new(name).expect("snapshot file names never contain a NUL byte")
}

fn check(ret: libc::c_int) -> io::Result<()> {
    if ret == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

pub fn rename(dir: &impl AsRawFd, from: &str, to: &str) -> io::Result<()> {
    let fd: RawFd = dir.as_raw_fd();
    let from = cstring(from);
    let to = cstring(to);

    check(unsafe { libc::renameat(fd, from.as_ptr(), fd, to.as_ptr()) })
}

pub fn unlink(dir: &impl AsRawFd, name: &str) -> io::Result<()> {
    let fd: RawFd = dir.as_raw_fd();
    let name = cstring(name);

    check(unsafe { libc::unlinkat(fd, name.as_ptr(), 0) })
}
