//! Producing the certification signature over an imported identity.

use log::info;

use crate::engine::{EngineError, EngineHandle};
use crate::error::{CeremonyError, Result};
use crate::passphrase::SecurePassphrase;

/// Certifies one identity of an imported key with the seeded secret key.
///
/// One ceremony has one signer, so key selection follows the engine's
/// default rule: the first usable secret key in the keyring signs.
pub struct Certifier {
    passphrase: SecurePassphrase,
}

impl Certifier {
    /// Certifier for an unprotected seeded key.
    pub fn new() -> Self {
        Self::with_passphrase(SecurePassphrase::empty())
    }

    /// Certifier unlocking the seeded key with `passphrase`.
    pub fn with_passphrase(passphrase: SecurePassphrase) -> Self {
        Self { passphrase }
    }

    /// Produce a certification signature over the identity matching
    /// `identity` in `handle`'s keyring.
    ///
    /// On success the identity's signature list grows by exactly one
    /// entry; the self-signature and any prior certifications keep their
    /// positions. With no secret key seeded this fails without touching
    /// the target.
    pub fn sign_identity(&self, handle: &EngineHandle, identity: &str) -> Result<()> {
        let secrets = handle
            .raw_secret_keys()
            .map_err(|e| CeremonyError::signing_engine("secret keyring unreadable", e))?;

        let signer = secrets.first().ok_or_else(|| {
            CeremonyError::signing_engine(
                "no secret key has been seeded into this keyring",
                EngineError::NoSecretKey,
            )
        })?;

        let fingerprint = handle
            .certify_identity(signer, &self.passphrase.to_pgp_password(), identity)
            .map_err(|e| {
                CeremonyError::signing_engine(
                    format!("engine rejected certification of {identity:?}"),
                    e,
                )
            })?;

        info!("certified identity {identity:?} on key {fingerprint}");
        Ok(())
    }
}

impl Default for Certifier {
    fn default() -> Self {
        Self::new()
    }
}
