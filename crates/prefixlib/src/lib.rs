// SPDX-FileCopyrightText: Copyright © 2024-2026 hny Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Adapter over the prefix library's interface: opening and locking a
//! prefix, classifying names, shifting geister, removing packages, running
//! lifecycle scripts and extracting fetched package archives.
//!
//! This crate plays the role the real `hny` library plays for the update
//! core: a collaborator consumed through a narrow, stable interface, never
//! reimplementing update's own state machine.

mod error;
mod extraction;
mod name;
mod prefix;

pub use error::Error;
pub use extraction::{extract_from_reader, extract_package, Extraction, ExtractionStatus};
pub use name::{type_of, NameKind};
pub use prefix::{Prefix, Step};
