//! Passphrase handling for signing-key material.

use pgp::types::Password;
use zeroize::ZeroizeOnDrop;

/// Passphrase protecting a secret signing key.
///
/// Implements ZeroizeOnDrop to clear the passphrase from memory when dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct SecurePassphrase {
    passphrase: String,
}

impl SecurePassphrase {
    /// Create a new SecurePassphrase from a string.
    pub fn new(passphrase: String) -> Self {
        Self { passphrase }
    }

    /// Passphrase for secret keys stored without protection.
    pub fn empty() -> Self {
        Self::new(String::new())
    }

    /// Generate a strong random passphrase (32 alphanumeric characters).
    pub fn generate_strong() -> Self {
        use rand::distributions::{Alphanumeric, DistString};
        let passphrase = Alphanumeric.sample_string(&mut rand::thread_rng(), 32);
        Self::new(passphrase)
    }

    /// Get the passphrase as a string slice.
    pub fn as_str(&self) -> &str {
        &self.passphrase
    }

    /// Convert to the engine's Password type.
    pub fn to_pgp_password(&self) -> Password {
        Password::from(self.passphrase.as_str())
    }
}

impl std::fmt::Debug for SecurePassphrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecurePassphrase(..)")
    }
}
