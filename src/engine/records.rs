//! Read-only views over keyring entries.
//!
//! Records decouple callers from the underlying key objects: lookups and
//! listings return these snapshots instead of parsed key material.

use chrono::{DateTime, Utc};
use pgp::composed::SignedPublicKey;
use pgp::packet::{Signature, SubpacketData};
use pgp::types::KeyDetails;

/// A public key as known to a keyring.
#[derive(Debug, Clone)]
pub struct KeyRecord {
    /// Primary key fingerprint, uppercase hex.
    pub fingerprint: String,
    /// Subkeys bound to this key.
    pub subkeys: Vec<SubkeyRecord>,
    /// User ids bound to this key, in keyring order.
    pub identities: Vec<IdentityRecord>,
}

/// A subkey of a [`KeyRecord`].
#[derive(Debug, Clone)]
pub struct SubkeyRecord {
    /// Subkey fingerprint, uppercase hex.
    pub fingerprint: String,
}

/// One user id bound to a key, with its certifications.
#[derive(Debug, Clone)]
pub struct IdentityRecord {
    /// The user id string, e.g. `John Doe <john.doe@example.org>`.
    pub user_id: String,
    /// Signatures over this identity, engine order: the key-generation
    /// self-signature first, third-party certifications after it.
    pub signatures: Vec<SignatureRecord>,
}

/// A certification over a (key, identity) pair.
#[derive(Debug, Clone)]
pub struct SignatureRecord {
    /// Fingerprint of the issuing key, when the signature carries one.
    pub issuer_fingerprint: Option<String>,
    /// Signature creation time, when the signature carries one.
    pub created: Option<DateTime<Utc>>,
}

/// Normalize a fingerprint to the form records carry.
pub(crate) fn normalize_fingerprint(fingerprint: &str) -> String {
    fingerprint.trim().to_uppercase()
}

impl KeyRecord {
    /// Whether `fingerprint` names this key or one of its subkeys.
    pub fn matches_fingerprint(&self, fingerprint: &str) -> bool {
        let wanted = normalize_fingerprint(fingerprint);
        self.fingerprint == wanted || self.subkeys.iter().any(|sk| sk.fingerprint == wanted)
    }

    /// Whether any user id on this key contains `identity`.
    pub fn matches_identity(&self, identity: &str) -> bool {
        self.identities.iter().any(|id| id.user_id.contains(identity))
    }

    /// The identity matching `identity`, if any.
    pub fn identity(&self, identity: &str) -> Option<&IdentityRecord> {
        self.identities.iter().find(|id| id.user_id.contains(identity))
    }
}

impl From<&SignedPublicKey> for KeyRecord {
    fn from(key: &SignedPublicKey) -> Self {
        let subkeys = key
            .public_subkeys
            .iter()
            .map(|subkey| SubkeyRecord {
                fingerprint: normalize_fingerprint(&subkey.fingerprint().to_string()),
            })
            .collect();

        let identities = key
            .details
            .users
            .iter()
            .map(|user| IdentityRecord {
                user_id: String::from_utf8_lossy(user.id.id()).to_string(),
                signatures: user.signatures.iter().map(SignatureRecord::from).collect(),
            })
            .collect();

        KeyRecord {
            fingerprint: normalize_fingerprint(&key.fingerprint().to_string()),
            subkeys,
            identities,
        }
    }
}

impl From<&Signature> for SignatureRecord {
    fn from(sig: &Signature) -> Self {
        let issuer_fingerprint = sig.config().and_then(|config| {
            config.hashed_subpackets.iter().find_map(|subpkt| match &subpkt.data {
                SubpacketData::IssuerFingerprint(fp) => {
                    Some(normalize_fingerprint(&fp.to_string()))
                }
                _ => None,
            })
        });

        let created = sig.config().and_then(|config| {
            config.hashed_subpackets.iter().find_map(|subpkt| match &subpkt.data {
                SubpacketData::SignatureCreationTime(dt) => Some(dt.clone()),
                _ => None,
            })
        });

        SignatureRecord {
            issuer_fingerprint,
            created,
        }
    }
}
