//! Importing a third party's public key into the isolated keyring.

use log::{debug, warn};

use crate::engine::records::normalize_fingerprint;
use crate::engine::EngineHandle;
use crate::error::{CeremonyError, Result};

/// Resolves a fingerprint to raw key material.
///
/// This is the injected lookup capability (typically a keyserver client).
/// Resolution may involve blocking network I/O; this core treats it as an
/// opaque call and composes no retries around it.
pub trait FingerprintResolver {
    /// Return the key material for `fingerprint`, or `None` if unknown.
    fn resolve(&self, fingerprint: &str) -> anyhow::Result<Option<Vec<u8>>>;
}

impl<R: FingerprintResolver + ?Sized> FingerprintResolver for &R {
    fn resolve(&self, fingerprint: &str) -> anyhow::Result<Option<Vec<u8>>> {
        (**self).resolve(fingerprint)
    }
}

/// Brings a target public key into an isolated keyring, either through a
/// fingerprint resolver or from raw key material.
///
/// Both entry points are idempotent: re-importing a resident key is a
/// success, not an error.
pub struct KeyImporter<R> {
    resolver: R,
}

impl<R: FingerprintResolver> KeyImporter<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    /// Resolve `fingerprint` and import the material it yields.
    ///
    /// The fingerprint must be 40 hex digits; anything else is rejected
    /// before the resolver is invoked. A resolver miss or failure, or the
    /// engine rejecting the resolved material, is reported as `false`
    /// rather than an error.
    pub fn import_by_fingerprint(
        &self,
        handle: &EngineHandle,
        fingerprint: &str,
    ) -> Result<bool> {
        let fingerprint = validate_fingerprint(fingerprint)?;

        let material = match self.resolver.resolve(&fingerprint) {
            Ok(Some(material)) => material,
            Ok(None) => {
                debug!("resolver found no key for {fingerprint}");
                return Ok(false);
            }
            Err(err) => {
                warn!("fingerprint resolution for {fingerprint} failed: {err:#}");
                return Ok(false);
            }
        };

        match handle.import_keydata(&material) {
            Ok(outcome) => {
                debug!(
                    "imported {} key(s) for {fingerprint} ({} already resident)",
                    outcome.imported, outcome.unchanged
                );
                Ok(true)
            }
            Err(err) => {
                warn!("engine rejected key material for {fingerprint}: {err}");
                Ok(false)
            }
        }
    }

    /// Import raw key material directly. No resolver involved.
    pub fn import_keydata(&self, handle: &EngineHandle, data: &[u8]) -> Result<bool> {
        let outcome = handle.import_keydata(data).map_err(CeremonyError::Import)?;
        Ok(!outcome.fingerprints.is_empty())
    }
}

/// A well-formed fingerprint is exactly 40 hex digits (one v4 primary or
/// subkey fingerprint).
fn validate_fingerprint(fingerprint: &str) -> Result<String> {
    let candidate = normalize_fingerprint(fingerprint);
    if candidate.len() != 40 || hex::decode(&candidate).is_err() {
        return Err(CeremonyError::InvalidFingerprint(fingerprint.to_string()));
    }
    Ok(candidate)
}
