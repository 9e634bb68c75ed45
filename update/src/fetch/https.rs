// SPDX-FileCopyrightText: Copyright © 2024-2026 hny Developers
//
// SPDX-License-Identifier: MPL-2.0

//! `https://<base>` scheme: mirrors the file scheme's layout
//! (`<base>/snapshot`, `<base>/packages/<p>`) one HTTP GET at a time.

use crate::error::{Error, Result};
use crate::set::PackageSet;
use crate::state::State;

use super::Scheme;

#[derive(Default)]
pub struct HttpsScheme {
    base: String,
    client: Option<reqwest::blocking::Client>,
}

impl HttpsScheme {
    fn client(&self) -> &reqwest::blocking::Client {
        self.client.as_ref().expect("open is always called before snapshot/packages")
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response> {
        self.client()
            .get(url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|source| Error::Transport(url.to_owned(), source))
    }
}

impl Scheme for HttpsScheme {
    fn open(&mut self, uri: &str) -> Result<()> {
        url::Url::parse(uri).map_err(|_| Error::MalformedUri(uri.to_owned()))?;

        self.base = uri.trim_end_matches('/').to_owned();
        self.client = Some(reqwest::blocking::Client::new());
        Ok(())
    }

    fn snapshot(&mut self, state: &mut State) -> Result<()> {
        let url = format!("{}/snapshot", self.base);
        let bytes = self.get(&url)?.bytes().map_err(|source| Error::Transport(url, source))?;

        state.write_pending_snapshot(&bytes)?;
        state.reload_pending()?;
        Ok(())
    }

    fn packages(&mut self, state: &State, newpackages: &PackageSet) -> Result<()> {
        for package in newpackages.iter() {
            state.check_interrupted()?;

            let url = format!("{}/packages/{package}", self.base);
            let response = self.get(&url)?;

            prefixlib::extract_from_reader(Box::new(response), package, state.prefix_path())?;
        }

        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.client = None;
        Ok(())
    }
}
