//! Engine context and keyring home lifecycle.
//!
//! This module owns the binding between a cryptographic-engine context and
//! a filesystem-backed keyring home:
//! - `EngineContext` is the bind/unbind state machine
//! - `KeyringHome` is the ephemeral directory holding keyring state
//! - `EngineHandle` ties the two together and exposes the keyring
//!   operations the ceremony components drive

pub(crate) mod keyring;
pub mod records;

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use pgp::composed::{SignedPublicKey, SignedSecretKey};
use pgp::types::Password;
use thiserror::Error;

use keyring::Keyring;
pub use records::{IdentityRecord, KeyRecord, SignatureRecord, SubkeyRecord};

/// Prefix for ephemeral keyring home directories.
const HOME_PREFIX: &str = "keysign.home.";

/// Engine protocol a context speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// OpenPGP keyrings; the operational protocol of this crate.
    OpenPgp,
    /// CMS/X.509. Contexts bind, but no keyring operations are defined.
    Cms,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::OpenPgp => f.write_str("OpenPGP"),
            Protocol::Cms => f.write_str("CMS"),
        }
    }
}

/// Engine-level error
#[derive(Debug, Error)]
pub enum EngineError {
    /// Keyring operation on a context with no bound home
    #[error("engine context is not bound to a keyring home")]
    Unbound,

    /// Keyring operations are only defined for OpenPGP contexts
    #[error("keyring operations are not supported for protocol {0}")]
    UnsupportedProtocol(Protocol),

    /// Keyring home or ring file I/O failed
    #[error("keyring I/O failed")]
    Io(#[from] io::Error),

    /// The OpenPGP engine rejected an operation
    #[error("OpenPGP engine error")]
    Pgp(#[from] pgp::errors::Error),

    /// Import data held no usable key material
    #[error("data does not contain usable key material")]
    InvalidKeyMaterial,

    /// Lookup matched no key
    #[error("no key matches {query:?}")]
    KeyNotFound { query: String },

    /// An operation needing a secret key found none
    #[error("no secret key available in the keyring")]
    NoSecretKey,
}

/// Counters for one import operation.
#[derive(Debug, Clone, Default)]
pub struct ImportOutcome {
    /// Fingerprints the imported material contained, in import order.
    pub fingerprints: Vec<String>,
    /// Keys newly added to the keyring.
    pub imported: usize,
    /// Keys that were already resident.
    pub unchanged: usize,
    /// Secret keys newly added.
    pub secret_imported: usize,
}

/// An opaque engine context, parameterized by a protocol and bound to at
/// most one keyring home at a time.
///
/// States are `Unbound` and `Bound(home)`, with `bind`/`unbind` as the
/// only transitions. The protocol is fixed at construction and stays
/// queryable in every state, including after unbind.
#[derive(Debug)]
pub struct EngineContext {
    protocol: Protocol,
    home: Option<PathBuf>,
}

impl EngineContext {
    pub fn new(protocol: Protocol) -> Self {
        Self {
            protocol,
            home: None,
        }
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn home(&self) -> Option<&Path> {
        self.home.as_deref()
    }

    pub fn is_bound(&self) -> bool {
        self.home.is_some()
    }

    fn bind(&mut self, home: &Path) -> Result<(), EngineError> {
        if !home.is_dir() {
            return Err(EngineError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("keyring home {} is not a directory", home.display()),
            )));
        }
        self.home = Some(home.to_path_buf());
        Ok(())
    }

    fn unbind(&mut self) {
        self.home = None;
    }
}

/// Filesystem directory holding keyring state for one binding.
#[derive(Debug)]
pub struct KeyringHome {
    path: PathBuf,
}

impl KeyringHome {
    /// Create a fresh home under the system temp dir.
    fn create_temp() -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix(HOME_PREFIX).tempdir()?;
        Ok(Self { path: dir.keep() })
    }

    /// Take over an existing caller-supplied directory.
    fn adopt(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Recursive best-effort removal. A home already removed externally
    /// is not a failure; nothing here ever raises.
    fn destroy(&self) {
        match fs::remove_dir_all(&self.path) {
            Ok(()) => debug!("removed keyring home {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("failed to remove keyring home {}: {e}", self.path.display()),
        }
    }
}

/// Owns the binding between an engine context and its keyring home.
///
/// Dropping the handle releases it, so the home directory goes away on
/// every exit path, panics included.
#[derive(Debug)]
pub struct EngineHandle {
    context: EngineContext,
    home: Option<KeyringHome>,
}

impl EngineHandle {
    /// Create a fresh temporary keyring home and bind a new context to it.
    pub fn acquire(protocol: Protocol) -> Result<Self, EngineError> {
        let home = KeyringHome::create_temp()?;
        let mut context = EngineContext::new(protocol);
        if let Err(err) = context.bind(home.path()) {
            home.destroy();
            return Err(err);
        }
        info!("acquired {protocol} keyring home {}", home.path().display());
        Ok(Self {
            context,
            home: Some(home),
        })
    }

    /// Re-bind to an explicit, caller-established home directory.
    ///
    /// Any previous binding is released first; its teardown has no effect
    /// on the new home.
    pub fn rebind(
        &mut self,
        protocol: Protocol,
        home: impl AsRef<Path>,
    ) -> Result<(), EngineError> {
        self.release();
        let home = KeyringHome::adopt(home.as_ref().to_path_buf());
        let mut context = EngineContext::new(protocol);
        context.bind(home.path())?;
        self.context = context;
        self.home = Some(home);
        Ok(())
    }

    /// Unbind the context and destroy the keyring home. Idempotent: a
    /// second release is a no-op, and destruction is best-effort.
    pub fn release(&mut self) {
        self.context.unbind();
        if let Some(home) = self.home.take() {
            home.destroy();
        }
    }

    pub fn protocol(&self) -> Protocol {
        self.context.protocol()
    }

    pub fn home(&self) -> Option<&Path> {
        self.context.home()
    }

    pub fn context(&self) -> &EngineContext {
        &self.context
    }

    fn keyring(&self) -> Result<Keyring, EngineError> {
        if self.context.protocol() != Protocol::OpenPgp {
            return Err(EngineError::UnsupportedProtocol(self.context.protocol()));
        }
        let home = self.context.home().ok_or(EngineError::Unbound)?;
        Ok(Keyring::open(home))
    }

    /// Public keys in the bound keyring, enumeration order.
    pub fn public_keys(&self) -> Result<Vec<KeyRecord>, EngineError> {
        Ok(self
            .keyring()?
            .public_keys()?
            .iter()
            .map(KeyRecord::from)
            .collect())
    }

    /// Secret keys in the bound keyring, enumeration order.
    pub fn secret_keys(&self) -> Result<Vec<KeyRecord>, EngineError> {
        Ok(self
            .keyring()?
            .secret_keys()?
            .into_iter()
            .map(|key| KeyRecord::from(&SignedPublicKey::from(key)))
            .collect())
    }

    /// Look a key up by primary or subkey fingerprint.
    pub fn key_by_fingerprint(&self, fingerprint: &str) -> Result<Option<KeyRecord>, EngineError> {
        Ok(self
            .keyring()?
            .public_keys()?
            .iter()
            .map(KeyRecord::from)
            .find(|record| record.matches_fingerprint(fingerprint)))
    }

    /// Look a key up by a user-id substring.
    pub fn key_by_identity(&self, identity: &str) -> Result<Option<KeyRecord>, EngineError> {
        Ok(self
            .keyring()?
            .public_keys()?
            .iter()
            .map(KeyRecord::from)
            .find(|record| record.matches_identity(identity)))
    }

    /// Import key material, armored or binary, public or secret.
    pub fn import_keydata(&self, data: &[u8]) -> Result<ImportOutcome, EngineError> {
        self.keyring()?.import_keydata(data)
    }

    /// Export a key's armored public material by fingerprint or identity.
    pub fn export_keydata(&self, query: &str) -> Result<Vec<u8>, EngineError> {
        self.keyring()?.export_public(query)
    }

    pub(crate) fn raw_secret_keys(&self) -> Result<Vec<SignedSecretKey>, EngineError> {
        self.keyring()?.secret_keys()
    }

    pub(crate) fn import_secret_key(&self, key: &SignedSecretKey) -> Result<(), EngineError> {
        let mut outcome = ImportOutcome::default();
        self.keyring()?.import_secret_key(key, &mut outcome)
    }

    pub(crate) fn certify_identity(
        &self,
        signer: &SignedSecretKey,
        password: &Password,
        identity: &str,
    ) -> Result<String, EngineError> {
        self.keyring()?.certify_identity(signer, password, identity)
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.release();
    }
}
