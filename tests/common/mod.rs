//! Common test setup and utilities for integration tests
//!
//! Provides logging init, test key generation, fixture default-keyring
//! construction, and a canned fingerprint resolver.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Result};
use pgp::composed::{
    KeyType, SecretKeyParamsBuilder, SignedPublicKey, SignedSecretKey, SubkeyParamsBuilder,
};
use pgp::crypto::ecc_curve::ECCCurve;
use pgp::types::{KeyDetails, Password};
use rand::thread_rng;

use keysign_core::FingerprintResolver;

/// Initialize test logging (call once per test module)
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("keysign_core=debug,test=debug")
        .with_test_writer()
        .try_init();
}

/// A generated, unprotected Ed25519 keypair for tests
pub struct TestKey {
    pub user_id: String,
    pub fingerprint: String,
    pub secret: SignedSecretKey,
    pub public: SignedPublicKey,
}

impl TestKey {
    /// Generate a keypair with a certifying primary, a signing subkey and
    /// an encryption subkey, bound to the given user id.
    pub fn generate(user_id: &str) -> Result<Self> {
        let mut signkey = SubkeyParamsBuilder::default();
        signkey
            .key_type(KeyType::Ed25519Legacy)
            .can_sign(true)
            .can_encrypt(false)
            .can_authenticate(false);

        let mut encryptkey = SubkeyParamsBuilder::default();
        encryptkey
            .key_type(KeyType::ECDH(ECCCurve::Curve25519))
            .can_sign(false)
            .can_encrypt(true)
            .can_authenticate(false);

        let mut key_params = SecretKeyParamsBuilder::default();
        key_params
            .key_type(KeyType::Ed25519Legacy)
            .can_certify(true)
            .can_sign(false)
            .can_encrypt(false)
            .primary_user_id(user_id.into())
            .subkeys(vec![
                signkey
                    .build()
                    .map_err(|e| anyhow!("Failed to build signing subkey: {}", e))?,
                encryptkey
                    .build()
                    .map_err(|e| anyhow!("Failed to build encryption subkey: {}", e))?,
            ]);

        let secret_key_params = key_params
            .build()
            .map_err(|e| anyhow!("Failed to build secret key params: {}", e))?;
        let secret_key = secret_key_params
            .generate(thread_rng())
            .map_err(|e| anyhow!("Failed to generate secret key: {}", e))?;

        let secret = secret_key
            .sign(&mut thread_rng(), &Password::from(""))
            .map_err(|e| anyhow!("Failed to sign secret key: {}", e))?;
        let public = SignedPublicKey::from(secret.clone());

        Ok(Self {
            user_id: user_id.to_string(),
            fingerprint: public.fingerprint().to_string().to_uppercase(),
            secret,
            public,
        })
    }

    pub fn secret_armored(&self) -> Result<String> {
        self.secret
            .to_armored_string(Default::default())
            .map_err(|e| anyhow!("Failed to armor secret key: {}", e))
    }

    pub fn public_armored(&self) -> Result<String> {
        self.public
            .to_armored_string(Default::default())
            .map_err(|e| anyhow!("Failed to armor public key: {}", e))
    }
}

/// Write a fixture default-keyring home holding the given keys.
///
/// Ring files use the same layout the engine maintains: concatenated
/// armored blocks, one ring file per key class.
pub fn write_default_home(dir: &Path, keys: &[&TestKey]) -> Result<()> {
    let mut secring = Vec::new();
    let mut pubring = Vec::new();
    for key in keys {
        secring.push(key.secret_armored()?);
        pubring.push(key.public_armored()?);
    }
    fs::write(dir.join("secring.asc"), secring.join("\n"))?;
    fs::write(dir.join("pubring.asc"), pubring.join("\n"))?;
    Ok(())
}

/// Deterministic in-memory fingerprint resolver
#[derive(Default)]
pub struct StaticResolver {
    keys: HashMap<String, Vec<u8>>,
}

impl StaticResolver {
    pub fn with_key(key: &TestKey) -> Result<Self> {
        let mut resolver = Self::default();
        resolver
            .keys
            .insert(key.fingerprint.clone(), key.public_armored()?.into_bytes());
        Ok(resolver)
    }
}

impl FingerprintResolver for StaticResolver {
    fn resolve(&self, fingerprint: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.keys.get(fingerprint).cloned())
    }
}
