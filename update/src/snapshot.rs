// SPDX-FileCopyrightText: Copyright © 2024-2026 hny Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Textual snapshot format: alternating geist/package lines, LF-terminated.
//! `parse` and `emit` are inverses of each other over valid snapshots.

use std::io::Write;
use std::path::Path;

use prefixlib::NameKind;

use crate::error::{Error, Result};
use crate::set::PairSet;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Parsing {
    Begin,
    ExpectPackage,
    NextGeist,
}

/// Parse a snapshot from `bytes`, read from a file at `path` (used only to
/// make error messages actionable).
pub fn parse(bytes: &[u8], path: &Path) -> Result<PairSet> {
    let mut snapshot = PairSet::new();
    let mut parsing = Parsing::Begin;
    let mut geist: Option<String> = None;

    for (index, raw_line) in split_lines(bytes).enumerate() {
        let line = raw_line.map_err(|_| Error::InvalidSnapshot {
            path: path.to_owned(),
            line: index + 1,
            reason: "line contains an embedded NUL byte".into(),
        })?;

        let kind = prefixlib::type_of(line);

        match parsing {
            Parsing::Begin | Parsing::NextGeist => match kind {
                NameKind::Geist => {
                    if snapshot.contains(line) {
                        return Err(Error::InvalidSnapshot {
                            path: path.to_owned(),
                            line: index + 1,
                            reason: format!("redundant geist {line}"),
                        });
                    }
                    geist = Some(line.to_owned());
                    parsing = Parsing::ExpectPackage;
                }
                _ => {
                    return Err(Error::InvalidSnapshot {
                        path: path.to_owned(),
                        line: index + 1,
                        reason: "expected a geist name".into(),
                    })
                }
            },
            Parsing::ExpectPackage => match kind {
                NameKind::Package => {
                    let geist = geist.take().expect("ExpectPackage implies a pending geist");
                    snapshot.insert(geist, line.to_owned());
                    parsing = Parsing::NextGeist;
                }
                _ => {
                    return Err(Error::InvalidSnapshot {
                        path: path.to_owned(),
                        line: index + 1,
                        reason: "expected a package name".into(),
                    })
                }
            },
        }
    }

    if parsing == Parsing::ExpectPackage {
        return Err(Error::InvalidSnapshot {
            path: path.to_owned(),
            line: snapshot.len() * 2 + 1,
            reason: "snapshot ends with a geist missing its package".into(),
        });
    }

    Ok(snapshot)
}

/// Split `bytes` into lines on LF, with an optional trailing newline
/// stripped first. An empty buffer yields zero lines, matching EOF on an
/// empty file never entering the parser's state machine. A line containing
/// an embedded NUL byte (or non-UTF-8 bytes) is reported as `Err(())`.
fn split_lines(bytes: &[u8]) -> Vec<std::result::Result<&str, ()>> {
    let trimmed = bytes.strip_suffix(b"\n").unwrap_or(bytes);

    if trimmed.is_empty() {
        return Vec::new();
    }

    trimmed
        .split(|&b| b == b'\n')
        .map(|line| {
            if line.contains(&0) {
                Err(())
            } else {
                std::str::from_utf8(line).map_err(|_| ())
            }
        })
        .collect()
}

/// Emit `snapshot` as alternating geist/package lines in iteration order.
pub fn emit(snapshot: &PairSet) -> Vec<u8> {
    let mut buffer = Vec::new();
    for (geist, package) in snapshot.iter() {
        writeln!(buffer, "{geist}").expect("writing to a Vec cannot fail");
        writeln!(buffer, "{package}").expect("writing to a Vec cannot fail");
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn p(s: &str) -> PathBuf {
        PathBuf::from(s)
    }

    #[test]
    fn parses_single_pair() {
        let snapshot = parse(b"libc\n1.0\n", &p("snapshot")).unwrap();
        assert_eq!(snapshot.find("libc"), Some("1.0"));
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn parses_without_trailing_newline() {
        let snapshot = parse(b"libc\n1.0", &p("snapshot")).unwrap();
        assert_eq!(snapshot.find("libc"), Some("1.0"));
    }

    #[test]
    fn rejects_duplicate_geist() {
        let result = parse(b"libc\n1.0\nlibc\n2.0\n", &p("snapshot"));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_missing_geist() {
        let result = parse(b"1.0\n", &p("snapshot"));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_package_after_package() {
        let result = parse(b"libc\n1.0\n2.0\n", &p("snapshot"));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_trailing_geist_without_package() {
        let result = parse(b"libc\n1.0\ntool\n", &p("snapshot"));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_embedded_nul() {
        let result = parse(b"li\0c\n1.0\n", &p("snapshot"));
        assert!(result.is_err());
    }

    #[test]
    fn round_trips_through_emit() {
        let mut snapshot = PairSet::new();
        snapshot.insert("libc", "1.0");
        snapshot.insert("tool", "t1");

        let bytes = emit(&snapshot);
        let parsed = parse(&bytes, &p("snapshot")).unwrap();

        assert_eq!(parsed.iter().collect::<Vec<_>>(), snapshot.iter().collect::<Vec<_>>());
    }
}
