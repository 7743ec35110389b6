//! The ceremony workflow.
//!
//! A ceremony is one end-to-end run against one ephemeral keyring:
//! acquire an engine handle, seed the operator's secrets, import the
//! target key, certify one of its identities, and release the handle.
//! Release is unconditional; the ephemeral home may hold copied secret
//! material and is destroyed on every exit path.

pub mod certifier;
pub mod importer;
pub mod seeder;

use std::path::PathBuf;

use log::info;

pub use certifier::Certifier;
pub use importer::{FingerprintResolver, KeyImporter};
pub use seeder::SecretSeeder;

use crate::engine::{EngineError, EngineHandle, Protocol};
use crate::error::{CeremonyError, Result};
use crate::passphrase::SecurePassphrase;

/// Ceremony configuration.
#[derive(Debug, Clone)]
pub struct CeremonyConfig {
    /// Location of the operator's default keyring; the read-only source
    /// for secret-key seeding.
    pub default_home: PathBuf,
    /// Passphrase unlocking the operator's secret key.
    pub passphrase: SecurePassphrase,
}

impl CeremonyConfig {
    pub fn new(default_home: impl Into<PathBuf>) -> Self {
        Self {
            default_home: default_home.into(),
            passphrase: SecurePassphrase::empty(),
        }
    }

    pub fn with_passphrase(mut self, passphrase: SecurePassphrase) -> Self {
        self.passphrase = passphrase;
        self
    }
}

/// Where the target public key comes from.
#[derive(Debug, Clone)]
pub enum KeySource {
    /// Resolve this fingerprint through the injected resolver.
    Fingerprint(String),
    /// Raw key material, armored or binary.
    KeyData(Vec<u8>),
}

/// Result of a completed ceremony.
#[derive(Debug, Clone)]
pub struct CeremonyReport {
    /// Secret keys seeded into the ephemeral keyring.
    pub seeded: usize,
    /// Fingerprint of the certified key.
    pub fingerprint: String,
    /// The identity that was certified.
    pub identity: String,
    /// Armored export of the certified key, for delivery back to its
    /// owner.
    pub certified_key: Vec<u8>,
}

/// Drives the ceremony workflow over one [`EngineHandle`].
pub struct Ceremony<R> {
    config: CeremonyConfig,
    resolver: R,
}

impl<R: FingerprintResolver> Ceremony<R> {
    pub fn new(config: CeremonyConfig, resolver: R) -> Self {
        Self { config, resolver }
    }

    /// Run one ceremony: certify `identity` (or the first identity when
    /// `None`) of the key named by `source`.
    ///
    /// The first failing step propagates; there are no retries at this
    /// layer. The ephemeral keyring home is released whatever happens.
    pub fn certify(&self, source: KeySource, identity: Option<&str>) -> Result<CeremonyReport> {
        let mut handle =
            EngineHandle::acquire(Protocol::OpenPgp).map_err(CeremonyError::EngineInit)?;
        let result = self.run(&handle, source, identity);
        handle.release();
        result
    }

    fn run(
        &self,
        handle: &EngineHandle,
        source: KeySource,
        identity: Option<&str>,
    ) -> Result<CeremonyReport> {
        let seeded = SecretSeeder::new(&self.config.default_home).copy_secrets(handle)?;

        let key = match source {
            KeySource::Fingerprint(fingerprint) => {
                let importer = KeyImporter::new(&self.resolver);
                if !importer.import_by_fingerprint(handle, &fingerprint)? {
                    return Err(CeremonyError::Import(EngineError::KeyNotFound {
                        query: fingerprint,
                    }));
                }
                handle
                    .key_by_fingerprint(&fingerprint)
                    .map_err(CeremonyError::Import)?
                    .ok_or(CeremonyError::Import(EngineError::KeyNotFound {
                        query: fingerprint,
                    }))?
            }
            KeySource::KeyData(data) => {
                let outcome = handle.import_keydata(&data).map_err(CeremonyError::Import)?;
                let fingerprint = outcome
                    .fingerprints
                    .first()
                    .cloned()
                    .ok_or(CeremonyError::Import(EngineError::InvalidKeyMaterial))?;
                handle
                    .key_by_fingerprint(&fingerprint)
                    .map_err(CeremonyError::Import)?
                    .ok_or(CeremonyError::Import(EngineError::KeyNotFound {
                        query: fingerprint,
                    }))?
            }
        };

        let identity = match identity {
            Some(wanted) => key
                .identity(wanted)
                .map(|id| id.user_id.clone())
                .ok_or_else(|| {
                    CeremonyError::signing(format!(
                        "identity {wanted:?} not found on key {}",
                        key.fingerprint
                    ))
                })?,
            None => key
                .identities
                .first()
                .map(|id| id.user_id.clone())
                .ok_or_else(|| CeremonyError::signing("imported key carries no identities"))?,
        };

        Certifier::with_passphrase(self.config.passphrase.clone())
            .sign_identity(handle, &identity)?;

        let certified_key = handle
            .export_keydata(&key.fingerprint)
            .map_err(|e| CeremonyError::signing_engine("exporting the certified key failed", e))?;

        info!(
            "ceremony complete: certified {identity:?} on {} ({seeded} secret key(s) seeded)",
            key.fingerprint
        );

        Ok(CeremonyReport {
            seeded,
            fingerprint: key.fingerprint,
            identity,
            certified_key,
        })
    }
}
