//! Isolated-keyring OpenPGP certification core.
//!
//! This crate is the orchestration layer of a key-signing utility. It
//! certifies other people's public keys inside short-lived, isolated
//! keyrings so the operator's primary keyring is never touched:
//!
//! - [`engine`] binds an engine context to an ephemeral keyring home and
//!   guarantees its destruction on release
//! - [`ceremony`] seeds the operator's secret keys, imports the target
//!   key (by fingerprint lookup or raw material), and produces a
//!   certification signature over one of its identities
//!
//! A ceremony either fully succeeds or fails with one attributable
//! [`CeremonyError`], and in both cases leaves no ephemeral keyring
//! behind on disk.

pub mod ceremony;
pub mod engine;
pub mod error;
pub mod passphrase;

pub use ceremony::{
    Ceremony, CeremonyConfig, CeremonyReport, Certifier, FingerprintResolver, KeyImporter,
    KeySource, SecretSeeder,
};
pub use engine::{
    EngineContext, EngineError, EngineHandle, IdentityRecord, ImportOutcome, KeyRecord,
    KeyringHome, Protocol, SignatureRecord, SubkeyRecord,
};
pub use error::CeremonyError;
pub use passphrase::SecurePassphrase;
