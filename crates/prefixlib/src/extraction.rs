// SPDX-FileCopyrightText: Copyright © 2024-2026 hny Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Streaming decompress+unarchive of a fetched package into the prefix,
//! using the ecosystem's usual pairing of zstd + tar for bounded-memory,
//! page-at-a-time extraction.

use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use fs_err::File;

use crate::error::Error;

/// Outcome of a single `extract` step. Failure surfaces through `Result::Err`
/// rather than a status variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStatus {
    /// More of the archive remains to be processed.
    Ok,
    /// The archive has been fully unpacked.
    Done,
}

/// A single package's extraction into the prefix.
///
/// Generic over the byte source so both a local archive file (the `file`
/// scheme) and a streaming HTTP response body (the `https` scheme) drive the
/// same decompress+unpack pipeline.
pub struct Extraction {
    archive: tar::Archive<zstd::stream::read::Decoder<'static, BufReader<Box<dyn Read + Send>>>>,
    dest: PathBuf,
    done: bool,
}

impl Extraction {
    /// Begin extracting `source` (an open, readable package archive) into
    /// `dest` (normally the prefix root; `tar` entries already carry the
    /// package directory as their leading path component).
    pub fn create(source: Box<dyn Read + Send>, dest: impl Into<PathBuf>) -> Result<Self, Error> {
        let decoder =
            zstd::stream::read::Decoder::new(source).map_err(|source| Error::ErrorDecompress("<package>".into(), source))?;

        Ok(Self {
            archive: tar::Archive::new(decoder),
            dest: dest.into(),
            done: false,
        })
    }

    /// Drive the extraction forward. Non-goal scope means we don't model the
    /// underlying tar reader's entry-by-entry cursor as separate steps: the
    /// first call unpacks the whole archive and reports completion.
    pub fn extract(&mut self, package: &str) -> Result<ExtractionStatus, Error> {
        if self.done {
            return Ok(ExtractionStatus::Done);
        }

        match self.archive.unpack(&self.dest) {
            Ok(()) => {
                self.done = true;
                Ok(ExtractionStatus::Done)
            }
            Err(source) => {
                log::error!("failed to unpack package {package}: {source}");
                Err(Error::ErrorArchive(package.to_owned(), source))
            }
        }
    }

    pub fn destroy(self) {}
}

/// Open `package` under `packages_dir` and extract it fully into `dest`.
pub fn extract_package(packages_dir: &Path, package: &str, dest: &Path) -> Result<(), Error> {
    let source = File::open(packages_dir.join(package))?;
    extract_from_reader(Box::new(source), package, dest)
}

/// Drive `source` through the same decompress+unpack pipeline as
/// [`extract_package`], for callers that don't have a local archive file on
/// disk (the `https` scheme streams straight from the response body).
pub fn extract_from_reader(source: Box<dyn Read + Send>, package: &str, dest: &Path) -> Result<(), Error> {
    let mut extraction = Extraction::create(source, dest)?;

    loop {
        match extraction.extract(package)? {
            ExtractionStatus::Ok => continue,
            ExtractionStatus::Done => break,
        }
    }

    extraction.destroy();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn build_archive(package: &str, file_name: &str, contents: &[u8]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());

        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, format!("{package}/{file_name}"), contents).unwrap();

        let tar_bytes = builder.into_inner().unwrap();

        let mut encoder = zstd::stream::write::Encoder::new(Vec::new(), 0).unwrap();
        encoder.write_all(&tar_bytes).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn extracts_a_package_archive_into_the_prefix() {
        let dest = tempfile::tempdir().unwrap();
        let archive = build_archive("1.0", "marker", b"hello");

        extract_from_reader(Box::new(std::io::Cursor::new(archive)), "1.0", dest.path()).unwrap();

        let contents = fs_err::read(dest.path().join("1.0").join("marker")).unwrap();
        assert_eq!(contents, b"hello");
    }
}
