//! Seeding the isolated keyring with the operator's secret keys.

use std::path::PathBuf;

use log::info;

use crate::engine::keyring::Keyring;
use crate::engine::EngineHandle;
use crate::error::{CeremonyError, Result};

/// Copies secret keys from the operator's default keyring into an
/// isolated one.
///
/// The default keyring location is an explicit injected value, never read
/// from process-global state, so ceremonies run against arbitrary fixture
/// keyrings in tests.
pub struct SecretSeeder {
    default_home: PathBuf,
}

impl SecretSeeder {
    pub fn new(default_home: impl Into<PathBuf>) -> Self {
        Self {
            default_home: default_home.into(),
        }
    }

    /// Import every secret key from the default keyring into `handle`'s
    /// keyring and return how many were copied.
    ///
    /// The copies land in the same enumeration order as the source, so
    /// position-based identity checks hold downstream. The default
    /// keyring is only read. Partial progress is not rolled back on
    /// failure; the isolated keyring is discarded wholesale on release.
    pub fn copy_secrets(&self, handle: &EngineHandle) -> Result<usize> {
        let default_ring = Keyring::open(&self.default_home);
        let secrets = default_ring.secret_keys().map_err(CeremonyError::Seed)?;

        for key in &secrets {
            handle.import_secret_key(key).map_err(CeremonyError::Seed)?;
        }

        info!(
            "seeded {} secret key(s) from {}",
            secrets.len(),
            self.default_home.display()
        );
        Ok(secrets.len())
    }
}
