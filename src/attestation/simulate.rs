// Copyright 2025 Contributors to the Veraison project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Location of the pre-generated token shipped with the crate
pub const DEFAULT_SIMULATED_TOKEN_PATH: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/simulated_token.txt");

/// A pre-generated token read from a file on first use and kept for the
/// lifetime of the owning client.  Only the first line is used, with
/// surrounding whitespace removed.
#[derive(Debug)]
pub struct SimulatedToken {
    path: PathBuf,
    token: OnceLock<String>,
}

impl Default for SimulatedToken {
    fn default() -> Self {
        Self::new(DEFAULT_SIMULATED_TOKEN_PATH)
    }
}

impl SimulatedToken {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            token: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the cached token, loading it from disk if this is the first
    /// call.  A failed load is not cached.
    pub fn get(&self) -> Result<&str, Error> {
        if let Some(t) = self.token.get() {
            return Ok(t);
        }

        let t = self.load()?;

        // a concurrent caller may have won the race; both read the same file
        Ok(self.token.get_or_init(|| t).as_str())
    }

    fn load(&self) -> Result<String, Error> {
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            Error::Simulation(format!("reading {}: {e}", self.path.display()))
        })?;

        let first = contents.lines().next().unwrap_or_default().trim();

        if first.is_empty() {
            return Err(Error::Simulation(format!(
                "{} does not contain a token",
                self.path.display()
            )));
        }

        Ok(first.to_string())
    }
}
