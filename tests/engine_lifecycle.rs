//! Integration tests for engine keyring operations
//!
//! Lifecycle edges (acquire/rebind/release, protocol gating) are covered
//! by unit tests next to the engine; these tests exercise the keyring
//! operations with real key material.

mod common;

use anyhow::Result;
use keysign_core::{EngineHandle, Protocol};
use pgp::composed::{Deserializable, SignedPublicKey};
use pgp::types::KeyDetails;

use common::{init_test_logging, TestKey};

#[test]
fn import_keydata_makes_key_retrievable() -> Result<()> {
    init_test_logging();
    let key = TestKey::generate("John Doe <john.doe@test.com>")?;

    let mut handle = EngineHandle::acquire(Protocol::OpenPgp)?;
    let outcome = handle.import_keydata(key.public_armored()?.as_bytes())?;
    assert_eq!(outcome.imported, 1);
    assert_eq!(outcome.fingerprints, vec![key.fingerprint.clone()]);

    // by fingerprint
    let record = handle.key_by_fingerprint(&key.fingerprint)?.unwrap();
    assert_eq!(record.fingerprint, key.fingerprint);
    assert_eq!(record.subkeys.len(), 2);

    // by identity substring, the way engines match user ids
    let record = handle.key_by_identity("john.doe@test.com")?.unwrap();
    assert_eq!(record.fingerprint, key.fingerprint);
    assert_eq!(record.identities[0].user_id, "John Doe <john.doe@test.com>");

    handle.release();
    Ok(())
}

#[test]
fn import_is_idempotent() -> Result<()> {
    init_test_logging();
    let key = TestKey::generate("Repeat <repeat@test.com>")?;
    let material = key.public_armored()?;

    let mut handle = EngineHandle::acquire(Protocol::OpenPgp)?;
    let first = handle.import_keydata(material.as_bytes())?;
    assert_eq!((first.imported, first.unchanged), (1, 0));

    let second = handle.import_keydata(material.as_bytes())?;
    assert_eq!((second.imported, second.unchanged), (0, 1));

    assert_eq!(handle.public_keys()?.len(), 1);
    handle.release();
    Ok(())
}

#[test]
fn secret_import_carries_public_half() -> Result<()> {
    init_test_logging();
    let key = TestKey::generate("Seeder <seeder@test.com>")?;

    let mut handle = EngineHandle::acquire(Protocol::OpenPgp)?;
    let outcome = handle.import_keydata(key.secret_armored()?.as_bytes())?;
    assert_eq!(outcome.secret_imported, 1);

    assert_eq!(handle.secret_keys()?.len(), 1);
    assert!(handle.key_by_fingerprint(&key.fingerprint)?.is_some());
    handle.release();
    Ok(())
}

#[test]
fn lookup_matches_subkey_fingerprints() -> Result<()> {
    init_test_logging();
    let key = TestKey::generate("Sub <sub@test.com>")?;

    let mut handle = EngineHandle::acquire(Protocol::OpenPgp)?;
    handle.import_keydata(key.public_armored()?.as_bytes())?;

    let record = handle.key_by_fingerprint(&key.fingerprint)?.unwrap();
    let subkey_fpr = &record.subkeys[0].fingerprint;
    let by_subkey = handle.key_by_fingerprint(subkey_fpr)?.unwrap();
    assert_eq!(by_subkey.fingerprint, key.fingerprint);

    handle.release();
    Ok(())
}

#[test]
fn export_round_trips_through_the_engine() -> Result<()> {
    init_test_logging();
    let key = TestKey::generate("Export <export@test.com>")?;

    let mut handle = EngineHandle::acquire(Protocol::OpenPgp)?;
    handle.import_keydata(key.public_armored()?.as_bytes())?;

    let exported = handle.export_keydata(&key.fingerprint)?;
    let (parsed, _) = SignedPublicKey::from_string(std::str::from_utf8(&exported)?)?;
    assert_eq!(parsed.fingerprint().to_string().to_uppercase(), key.fingerprint);

    handle.release();
    Ok(())
}

#[test]
fn unknown_export_is_a_typed_miss() -> Result<()> {
    init_test_logging();
    let mut handle = EngineHandle::acquire(Protocol::OpenPgp)?;
    assert!(handle.export_keydata("nobody@test.com").is_err());
    handle.release();
    Ok(())
}
