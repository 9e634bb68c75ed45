// SPDX-FileCopyrightText: Copyright © 2024-2026 hny Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Name classification for the prefix's two kinds of entries.
//!
//! The real prefix library (`hny`) exposes its own grammar for geist and
//! package names via `hny_type_of`; this module stands in for that external
//! classifier. The two grammars are deliberately disjoint so the snapshot
//! parser can use them to drive its state machine: a geist name is a bare
//! identifier, a package name is expected to carry at least one digit
//! (packages are versioned/content-addressed directories).

/// Classification of a name as returned by the prefix library's type oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Geist,
    Package,
    Other,
}

/// Classify `name` the way the prefix library's type oracle would.
pub fn type_of(name: &str) -> NameKind {
    if name.is_empty() {
        return NameKind::Other;
    }

    if is_geist_name(name) {
        NameKind::Geist
    } else if is_package_name(name) {
        NameKind::Package
    } else {
        NameKind::Other
    }
}

fn is_geist_name(name: &str) -> bool {
    let mut chars = name.chars();
    let first = chars.next().expect("checked non-empty");

    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphabetic() || c == '_' || c == '-')
}

fn is_package_name(name: &str) -> bool {
    let first = name.chars().next().expect("checked non-empty");

    (first.is_ascii_alphanumeric() || first == '_')
        && name.contains(|c: char| c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '+' | '-'))
}
