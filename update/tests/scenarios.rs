// SPDX-FileCopyrightText: Copyright © 2024-2026 hny Developers
//
// SPDX-License-Identifier: MPL-2.0

//! End-to-end exercises of the update driver: blank install, an unchanged
//! pending snapshot, a new geist/package pair, an upgrade of an existing
//! geist, and the two crash-recovery branches (interrupted commit,
//! interrupted mid-apply).

use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use update::driver;
use update::state::State;

fn should_exit() -> Arc<AtomicBool> {
    Arc::new(AtomicBool::new(false))
}

fn open_state(prefix: &Path, snapshots: &Path) -> State {
    State::open(prefix, false, snapshots, should_exit()).expect("state opens")
}

/// Create an executable shell script at `path` with `body` as its contents.
fn write_script(path: &Path, body: &str) {
    fs_err::create_dir_all(path.parent().unwrap()).unwrap();
    let mut file = fs_err::File::create(path).unwrap();
    file.write_all(body.as_bytes()).unwrap();
    drop(file);
    fs_err::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

/// Build a zstd-compressed tar archive for `package`, with `path` inside the
/// package directory given a `mode` and `contents` (e.g. a lifecycle script).
fn build_package_archive(package: &str, entries: &[(&str, u32, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());

    for (path, mode, contents) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(*mode);
        header.set_cksum();
        builder
            .append_data(&mut header, format!("{package}/{path}"), *contents)
            .unwrap();
    }

    let tar_bytes = builder.into_inner().unwrap();

    let mut encoder = zstd::stream::write::Encoder::new(Vec::new(), 0).unwrap();
    encoder.write_all(&tar_bytes).unwrap();
    encoder.finish().unwrap()
}

fn stage_source(src: &Path, snapshot: &str, packages: &[(&str, &[(&str, u32, &[u8])])]) {
    fs_err::create_dir_all(src.join("packages")).unwrap();
    fs_err::write(src.join("snapshot"), snapshot).unwrap();

    for (package, entries) in packages {
        let archive = build_package_archive(package, entries);
        fs_err::write(src.join("packages").join(package), archive).unwrap();
    }
}

#[test]
fn blank_install() {
    let prefix = tempfile::tempdir().unwrap();
    let snapshots = tempfile::tempdir().unwrap();
    let src = tempfile::tempdir().unwrap();

    stage_source(src.path(), "libc\n1.0\n", &[("1.0", &[("marker", 0o644, b"hi")])]);

    let mut state = open_state(prefix.path(), snapshots.path());
    driver::update_consistency(&mut state).unwrap();

    let uri = format!("file://{}", src.path().display());
    driver::update_perform(&mut state, &uri).unwrap();

    let current_bytes = fs_err::read(snapshots.path().join("current")).unwrap();
    assert_eq!(current_bytes, b"libc\n1.0\n");

    assert!(prefix.path().join("1.0").is_dir());
    assert_eq!(
        fs_err::read_link(prefix.path().join("libc")).unwrap(),
        Path::new("1.0")
    );
}

#[test]
fn geist_retarget_with_unchanged_package_spawns_nothing() {
    let prefix = tempfile::tempdir().unwrap();
    let snapshots = tempfile::tempdir().unwrap();
    let src = tempfile::tempdir().unwrap();

    fs_err::create_dir_all(prefix.path().join("1.0")).unwrap();
    std::os::unix::fs::symlink("1.0", prefix.path().join("libc")).unwrap();
    fs_err::write(snapshots.path().join("current"), "libc\n1.0\n").unwrap();

    write_script(
        &prefix.path().join("1.0").join("hny").join("clean"),
        "#!/bin/sh\ntouch clean-ran\n",
    );
    write_script(
        &prefix.path().join("1.0").join("hny").join("setup"),
        "#!/bin/sh\ntouch setup-ran\n",
    );

    stage_source(src.path(), "libc\n1.0\n", &[]);

    let mut state = open_state(prefix.path(), snapshots.path());
    let uri = format!("file://{}", src.path().display());
    driver::update_perform(&mut state, &uri).unwrap();

    assert!(!prefix.path().join("clean-ran").exists());
    assert!(!prefix.path().join("setup-ran").exists());
    assert_eq!(
        fs_err::read_link(prefix.path().join("libc")).unwrap(),
        Path::new("1.0")
    );
}

#[test]
fn new_package_and_new_geist_runs_setup_and_extracts() {
    let prefix = tempfile::tempdir().unwrap();
    let snapshots = tempfile::tempdir().unwrap();
    let src = tempfile::tempdir().unwrap();

    fs_err::create_dir_all(prefix.path().join("1.0")).unwrap();
    std::os::unix::fs::symlink("1.0", prefix.path().join("libc")).unwrap();
    fs_err::write(snapshots.path().join("current"), "libc\n1.0\n").unwrap();

    stage_source(
        src.path(),
        "libc\n1.0\ntool\nt1\n",
        &[("t1", &[("hny/setup", 0o755, b"#!/bin/sh\ntouch setup-ran\n")])],
    );

    let mut state = open_state(prefix.path(), snapshots.path());
    let uri = format!("file://{}", src.path().display());
    driver::update_perform(&mut state, &uri).unwrap();

    assert!(prefix.path().join("t1").is_dir());
    assert_eq!(
        fs_err::read_link(prefix.path().join("tool")).unwrap(),
        Path::new("t1")
    );
    assert!(prefix.path().join("setup-ran").exists());

    let current_bytes = fs_err::read(snapshots.path().join("current")).unwrap();
    let current = std::str::from_utf8(&current_bytes).unwrap();
    assert!(current.contains("libc\n1.0\n"));
    assert!(current.contains("tool\nt1\n"));
}

#[test]
fn upgrading_an_existing_geist_cleans_then_shifts_then_sets_up() {
    let prefix = tempfile::tempdir().unwrap();
    let snapshots = tempfile::tempdir().unwrap();
    let src = tempfile::tempdir().unwrap();

    fs_err::create_dir_all(prefix.path().join("1.0")).unwrap();
    std::os::unix::fs::symlink("1.0", prefix.path().join("libc")).unwrap();
    fs_err::write(snapshots.path().join("current"), "libc\n1.0\n").unwrap();

    write_script(
        &prefix.path().join("1.0").join("hny").join("clean"),
        "#!/bin/sh\ntouch clean-ran-$1\n",
    );

    stage_source(
        src.path(),
        "libc\n2.0\n",
        &[("2.0", &[("hny/setup", 0o755, b"#!/bin/sh\ntouch setup-ran-$1\n")])],
    );

    let mut state = open_state(prefix.path(), snapshots.path());
    let uri = format!("file://{}", src.path().display());
    driver::update_perform(&mut state, &uri).unwrap();

    assert!(prefix.path().join("clean-ran-libc").exists());
    assert!(prefix.path().join("setup-ran-libc").exists());

    assert_eq!(
        fs_err::read_link(prefix.path().join("libc")).unwrap(),
        Path::new("2.0")
    );
    assert!(prefix.path().join("2.0").is_dir());
    assert!(!prefix.path().join("1.0").exists(), "cleanup should remove the orphaned old package");

    let current_bytes = fs_err::read(snapshots.path().join("current")).unwrap();
    assert_eq!(current_bytes, b"libc\n2.0\n");
}

#[test]
fn interrupted_commit_promotes_pending_to_current() {
    let prefix = tempfile::tempdir().unwrap();
    let snapshots = tempfile::tempdir().unwrap();

    fs_err::create_dir_all(prefix.path().join("1.0")).unwrap();
    std::os::unix::fs::symlink("1.0", prefix.path().join("libc")).unwrap();
    fs_err::write(snapshots.path().join("pending"), "libc\n1.0\n").unwrap();

    let mut state = open_state(prefix.path(), snapshots.path());

    // Reconciliation on open already promoted `pending` to `current`.
    assert!(!snapshots.path().join("pending").exists());
    assert_eq!(fs_err::read(snapshots.path().join("current")).unwrap(), b"libc\n1.0\n");

    driver::update_consistency(&mut state).unwrap();

    assert!(prefix.path().join("1.0").is_dir());
    assert_eq!(
        fs_err::read_link(prefix.path().join("libc")).unwrap(),
        Path::new("1.0")
    );
}

#[test]
fn interrupted_mid_apply_annuls_the_unfinished_upgrade() {
    let prefix = tempfile::tempdir().unwrap();
    let snapshots = tempfile::tempdir().unwrap();

    // libc still points at 1.0 -- the geist was never shifted.
    fs_err::create_dir_all(prefix.path().join("1.0")).unwrap();
    std::os::unix::fs::symlink("1.0", prefix.path().join("libc")).unwrap();
    fs_err::write(snapshots.path().join("current"), "libc\n1.0\n").unwrap();

    // 2.0 was already extracted by the interrupted run.
    fs_err::create_dir_all(prefix.path().join("2.0")).unwrap();
    write_script(
        &prefix.path().join("2.0").join("hny").join("clean"),
        "#!/bin/sh\ntouch annul-clean-ran\n",
    );
    write_script(
        &prefix.path().join("1.0").join("hny").join("setup"),
        "#!/bin/sh\ntouch annul-setup-ran\n",
    );
    fs_err::write(snapshots.path().join("pending"), "libc\n2.0\n").unwrap();

    let mut state = open_state(prefix.path(), snapshots.path());
    driver::update_consistency(&mut state).unwrap();

    assert!(prefix.path().join("annul-clean-ran").exists());
    assert!(prefix.path().join("annul-setup-ran").exists());

    assert!(!snapshots.path().join("pending").exists());
    assert_eq!(fs_err::read(snapshots.path().join("current")).unwrap(), b"libc\n1.0\n");

    assert_eq!(
        fs_err::read_link(prefix.path().join("libc")).unwrap(),
        Path::new("1.0")
    );
    assert!(!prefix.path().join("2.0").exists(), "cleanup should remove the orphaned fetched package");
}
