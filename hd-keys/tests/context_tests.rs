//! Context lifecycle, capability enforcement and path handling tests

use assert_matches::assert_matches;
use hd_keys::{
    Bip32Context, ChildNumber, Curve, DerivationPath, Error, KeyData, KeyNetVersions,
};
use std::str::FromStr;

const SEED: &str = "000102030405060708090a0b0c0d0e0f";

fn master(curve: Curve) -> Bip32Context {
    let seed = hex::decode(SEED).unwrap();
    Bip32Context::from_seed(curve, KeyNetVersions::MAINNET, &seed).unwrap()
}

#[test]
fn seed_too_short_fails() {
    for curve in Curve::all() {
        let err =
            Bip32Context::from_seed(curve, KeyNetVersions::MAINNET, &[0u8; 15]).unwrap_err();
        assert_eq!(err, Error::InvalidSeedLength(15), "{}", curve);
    }
}

#[test]
fn convert_to_public_discards_private_material() {
    let master = master(Curve::Secp256k1);
    assert!(!master.is_public_only());
    assert!(master.private_key().is_ok());

    let fingerprint = master.fingerprint();
    let chain_code = master.chain_code();
    let public = master.convert_to_public();

    assert!(public.is_public_only());
    assert_matches!(public.private_key(), Err(Error::PublicOnlyKey));
    // Everything except the private half is preserved
    assert_eq!(public.fingerprint(), fingerprint);
    assert_eq!(public.chain_code(), chain_code);
    assert_eq!(public.depth(), 0);

    // Converting an already public context is a no-op
    let again = public.clone().convert_to_public();
    assert_eq!(again, public);
}

#[test]
fn hardened_derivation_fails_on_every_public_context() {
    let hardened = ChildNumber::from_hardened_idx(0).unwrap();
    for curve in Curve::all() {
        let public = master(curve).convert_to_public();
        let err = public.child_key(hardened).unwrap_err();
        assert_eq!(err, Error::CannotDeriveFromHardenedKey, "{}", curve);
    }
}

#[test]
fn public_derivation_is_gated_by_curve() {
    let normal = ChildNumber::from_normal_idx(0).unwrap();
    for curve in Curve::all() {
        let public = master(curve).convert_to_public();
        let result = public.child_key(normal);
        if curve.supports_public_derivation() {
            assert!(result.is_ok(), "{}", curve);
        } else {
            // Not only hardened children: every derivation needs the
            // private key on these curves
            assert_eq!(result.unwrap_err(), Error::PublicDerivationUnsupported(curve), "{}", curve);
        }
    }
}

#[test]
fn neutered_derivation_matches_private_derivation() {
    let master = master(Curve::Secp256k1);
    let child = ChildNumber::from_normal_idx(5).unwrap();

    let via_priv = master.child_key(child).unwrap().convert_to_public();
    let via_pub = master.clone().convert_to_public().child_key(child).unwrap();
    assert_eq!(via_priv.public_key(), via_pub.public_key());
    assert_eq!(via_priv.to_extended(), via_pub.to_extended());
}

#[test]
fn derivation_path_parsing() {
    let path = DerivationPath::from_str("m/44'/0'/0'/0/0").unwrap();
    let indexes: Vec<u32> = path.as_ref().iter().map(|&cn| u32::from(cn)).collect();
    assert_eq!(
        indexes,
        vec![44 | (1 << 31), 1 << 31, 1 << 31, 0, 0]
    );

    assert_matches!(DerivationPath::from_str(""), Err(Error::InvalidDerivationPathFormat));
    assert_matches!(DerivationPath::from_str("m/abc"), Err(Error::InvalidChildNumberFormat));
}

#[test]
fn derive_path_absolute_and_relative() {
    let master = master(Curve::Secp256k1);

    let absolute = master.derive_path("m/44'/0'/0'").unwrap();
    assert_eq!(absolute.depth(), 3);
    assert_eq!(absolute.index(), ChildNumber::from_hardened_idx(0).unwrap());

    // Continue with a relative path from the derived account
    let leaf = absolute.derive_path("0/0").unwrap();
    assert_eq!(leaf.depth(), 5);

    // One-shot absolute derivation reaches the same key
    let direct = master.derive_path("m/44'/0'/0'/0/0").unwrap();
    assert_eq!(direct.to_extended(), leaf.to_extended());

    // Absolute paths only make sense from the master
    assert_matches!(
        absolute.derive_path("m/0"),
        Err(Error::InvalidDerivationPathFormat)
    );

    // "m" alone is the master itself
    assert_eq!(master.derive_path("m").unwrap(), master);
}

#[test]
fn context_roundtrips_through_extended_strings() {
    for curve in Curve::all() {
        let master = master(curve);
        let child = master
            .derive(&DerivationPath::from(vec![
                ChildNumber::from_hardened_idx(44).unwrap(),
                ChildNumber::from_hardened_idx(0).unwrap(),
            ]))
            .unwrap();

        let restored =
            Bip32Context::from_extended(&child.to_extended(), curve, KeyNetVersions::MAINNET)
                .unwrap();
        assert_eq!(restored, child, "{}", curve);
        assert!(!restored.is_public_only());

        let public = child.convert_to_public();
        let restored =
            Bip32Context::from_extended(&public.to_extended(), curve, KeyNetVersions::MAINNET)
                .unwrap();
        assert_eq!(restored, public, "{}", curve);
        assert!(restored.is_public_only());
    }
}

#[test]
fn roundtrip_preserves_the_full_tuple() {
    let master = master(Curve::Secp256k1);
    let child = master.derive_path("m/0'/1").unwrap();
    let restored =
        Bip32Context::from_extended(&child.to_extended(), Curve::Secp256k1, KeyNetVersions::MAINNET)
            .unwrap();

    assert_eq!(restored.curve(), child.curve());
    assert_eq!(restored.depth(), child.depth());
    assert_eq!(restored.index(), child.index());
    assert_eq!(restored.chain_code(), child.chain_code());
    assert_eq!(restored.parent_fingerprint(), child.parent_fingerprint());
    assert_eq!(restored.fingerprint(), child.fingerprint());
    assert_eq!(
        restored.private_key().unwrap().to_bytes(),
        child.private_key().unwrap().to_bytes()
    );
}

#[test]
fn raw_key_constructors_use_key_data() {
    let master = master(Curve::Secp256k1);
    let key_bytes = master.private_key().unwrap().to_bytes();

    // Defaults describe a master position but carry no chain code
    let imported = Bip32Context::from_private_key(
        Curve::Secp256k1,
        KeyNetVersions::MAINNET,
        &key_bytes,
        KeyData::default(),
    )
    .unwrap();
    assert_eq!(imported.depth(), 0);
    assert!(imported.parent_fingerprint().is_master());
    assert_eq!(imported.public_key(), master.public_key());
    assert_ne!(imported.chain_code(), master.chain_code());

    // Full key data restores an exact position
    let data = KeyData {
        chain_code: master.chain_code(),
        depth: master.depth(),
        child_number: master.index(),
        parent_fingerprint: master.parent_fingerprint(),
    };
    let imported = Bip32Context::from_private_key(
        Curve::Secp256k1,
        KeyNetVersions::MAINNET,
        &key_bytes,
        data,
    )
    .unwrap();
    assert_eq!(imported, master);

    let public = Bip32Context::from_public_key(
        Curve::Secp256k1,
        KeyNetVersions::MAINNET,
        &master.public_key().serialize(),
        KeyData::default(),
    )
    .unwrap();
    assert!(public.is_public_only());
    assert_eq!(public.public_key(), master.public_key());
}

#[test]
fn kholaw_supports_soft_private_derivation() {
    let master = master(Curve::Ed25519Kholaw);

    // Mixed hardened and non-hardened derivation works with the private key
    let child = master.derive_path("m/1852'/1815'/0'/0/0").unwrap();
    assert_eq!(child.depth(), 5);
    assert_eq!(child.private_key().unwrap().to_bytes().len(), 64);

    // A public-only Cardano context cannot derive at all
    let public = master.convert_to_public();
    let err = public.child_key(ChildNumber::from_normal_idx(0).unwrap()).unwrap_err();
    assert_eq!(err, Error::PublicDerivationUnsupported(Curve::Ed25519Kholaw));
}

#[test]
fn kholaw_serializes_in_the_extended_form() {
    let master = master(Curve::Ed25519Kholaw);
    let encoded = master.to_extended();
    let restored =
        Bip32Context::from_extended(&encoded, Curve::Ed25519Kholaw, KeyNetVersions::MAINNET)
            .unwrap();
    assert_eq!(restored, master);

    // The public half still fits the standard 78-byte layout
    let public = master.convert_to_public();
    let restored = Bip32Context::from_extended(
        &public.to_extended(),
        Curve::Ed25519Kholaw,
        KeyNetVersions::MAINNET,
    )
    .unwrap();
    assert_eq!(restored, public);
}

#[test]
fn unknown_version_is_rejected_with_both_pairs() {
    let master = master(Curve::Secp256k1);
    let custom = KeyNetVersions::new([1, 2, 3, 4], [5, 6, 7, 8]);
    let err = Bip32Context::from_extended(&master.to_extended(), Curve::Secp256k1, custom)
        .unwrap_err();
    assert_eq!(err, Error::UnknownVersion([0x04, 0x88, 0xAD, 0xE4]));
}
