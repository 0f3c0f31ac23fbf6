//! Master key generation and child key derivation for the BIP32 /
//! SLIP-0010 curves (secp256k1, nist256p1 and the two ed25519 flavours).
//!
//! Reference: <https://github.com/satoshilabs/slips/blob/master/slip-0010.md>

use hashes::{Hash, HashEngine, Hmac, HmacEngine, sha512};
use p256::elliptic_curve::{Group, PrimeField};
use secp256k1::Secp256k1;

use crate::bip32::ChainCode;
use crate::curve::Curve;
use crate::error::{Error, Result};
use crate::keys::{PrivateKey, PublicKey};
use crate::path::ChildNumber;

/// Iteration bound for master key retries. One retry already has
/// probability ~2^-127; hitting the bound means the HMAC chain is broken.
const MASTER_RETRY_BOUND: usize = 16;

/// Generate the master key and chain code from a seed.
///
/// The 64-byte HMAC digest splits into IL (candidate key) and IR (chain
/// code). Curves with a bounded scalar range re-run the HMAC over the
/// previous digest until IL is usable; ed25519 accepts any IL.
pub(crate) fn master_from_seed(curve: Curve, seed: &[u8]) -> Result<(PrivateKey, ChainCode)> {
    if seed.len() < 16 {
        return Err(Error::InvalidSeedLength(seed.len()));
    }
    let mut message = seed.to_vec();
    for _ in 0..MASTER_RETRY_BOUND {
        let mut engine: HmacEngine<sha512::Hash> = HmacEngine::new(curve.master_hmac_key());
        engine.input(&message);
        let digest = Hmac::<sha512::Hash>::from_engine(engine).to_byte_array();
        let il: [u8; 32] = digest[..32].try_into().expect("HMAC output is 64 bytes");
        let ir: [u8; 32] = digest[32..].try_into().expect("HMAC output is 64 bytes");

        match master_key_candidate(curve, il) {
            Some(key) => return Ok((key, ChainCode::from_bytes(ir))),
            None => message = digest.to_vec(),
        }
    }
    Err(Error::UnusableSeed)
}

/// IL is usable as a master key iff it is a valid scalar for the curve
fn master_key_candidate(curve: Curve, il: [u8; 32]) -> Option<PrivateKey> {
    match curve {
        Curve::Secp256k1 => secp256k1::SecretKey::from_slice(&il).ok().map(PrivateKey::Secp256k1),
        Curve::Nist256p1 => p256::SecretKey::from_bytes(p256::FieldBytes::from_slice(&il))
            .ok()
            .map(PrivateKey::Nist256p1),
        Curve::Ed25519 => Some(PrivateKey::Ed25519(il)),
        Curve::Ed25519Blake2b => Some(PrivateKey::Ed25519Blake2b(il)),
        Curve::Ed25519Kholaw => unreachable!("extended ed25519 has its own master generator"),
    }
}

/// Private->Private child key derivation
pub(crate) fn ckd_priv(
    parent: &PrivateKey,
    chain_code: &ChainCode,
    child: ChildNumber,
) -> Result<(PrivateKey, ChainCode)> {
    let curve = parent.curve();
    let mut engine: HmacEngine<sha512::Hash> = HmacEngine::new(chain_code.as_ref());
    match child {
        ChildNumber::Normal { .. } => {
            if !curve.supports_unhardened_private_derivation() {
                return Err(Error::NonHardenedNotSupported(curve));
            }
            // Non-hardened key: public data feeds the HMAC
            engine.input(&parent.public_key().serialize());
        }
        ChildNumber::Hardened { .. } => {
            // Hardened key: only secret data, so siblings cannot be linked
            // from public information
            engine.input(&[0u8]);
            engine.input(&parent.to_bytes());
        }
    }
    engine.input(&u32::from(child).to_be_bytes());
    let digest = Hmac::<sha512::Hash>::from_engine(engine).to_byte_array();
    let il: [u8; 32] = digest[..32].try_into().expect("HMAC output is 64 bytes");
    let ir: [u8; 32] = digest[32..].try_into().expect("HMAC output is 64 bytes");

    let child_key = match parent {
        PrivateKey::Secp256k1(key) => {
            let tweak =
                secp256k1::Scalar::from_be_bytes(il).map_err(|_| Error::InvalidChildKey)?;
            let child_key = key.add_tweak(&tweak).map_err(|_| Error::InvalidChildKey)?;
            PrivateKey::Secp256k1(child_key)
        }
        PrivateKey::Nist256p1(key) => {
            let tweak = Option::<p256::Scalar>::from(p256::Scalar::from_repr(il.into()))
                .ok_or(Error::InvalidChildKey)?;
            let sum = tweak + *key.to_nonzero_scalar();
            let child_key =
                p256::SecretKey::from_bytes(&sum.to_repr()).map_err(|_| Error::InvalidChildKey)?;
            PrivateKey::Nist256p1(child_key)
        }
        // SLIP-0010 ed25519 children are an independent re-seed, not a
        // tweak of the parent scalar
        PrivateKey::Ed25519(_) => PrivateKey::Ed25519(il),
        PrivateKey::Ed25519Blake2b(_) => PrivateKey::Ed25519Blake2b(il),
        PrivateKey::Ed25519Kholaw(_) => unreachable!("extended ed25519 has its own derivation"),
    };
    Ok((child_key, ChainCode::from_bytes(ir)))
}

/// Public->Public child key derivation for non-hardened children.
///
/// The caller has already rejected hardened indexes and curves without
/// public derivation.
pub(crate) fn ckd_pub(
    parent: &PublicKey,
    chain_code: &ChainCode,
    child: ChildNumber,
) -> Result<(PublicKey, ChainCode)> {
    let mut engine: HmacEngine<sha512::Hash> = HmacEngine::new(chain_code.as_ref());
    engine.input(&parent.serialize());
    engine.input(&u32::from(child).to_be_bytes());
    let digest = Hmac::<sha512::Hash>::from_engine(engine).to_byte_array();
    let il: [u8; 32] = digest[..32].try_into().expect("HMAC output is 64 bytes");
    let ir: [u8; 32] = digest[32..].try_into().expect("HMAC output is 64 bytes");

    let child_key = match parent {
        PublicKey::Secp256k1(key) => {
            let tweak =
                secp256k1::Scalar::from_be_bytes(il).map_err(|_| Error::InvalidChildKey)?;
            let secp = Secp256k1::new();
            let child_key =
                key.add_exp_tweak(&secp, &tweak).map_err(|_| Error::InvalidChildKey)?;
            PublicKey::Secp256k1(child_key)
        }
        PublicKey::Nist256p1(key) => {
            let tweak = Option::<p256::Scalar>::from(p256::Scalar::from_repr(il.into()))
                .ok_or(Error::InvalidChildKey)?;
            let point = p256::ProjectivePoint::GENERATOR * tweak + key.to_projective();
            if bool::from(point.is_identity()) {
                return Err(Error::InvalidChildKey);
            }
            let child_key = p256::PublicKey::from_affine(point.to_affine())
                .map_err(|_| Error::InvalidChildKey)?;
            PublicKey::Nist256p1(child_key)
        }
        _ => unreachable!("public derivation is gated on curve capability"),
    };
    Ok((child_key, ChainCode::from_bytes(ir)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_seed_is_rejected() {
        for curve in [Curve::Secp256k1, Curve::Nist256p1, Curve::Ed25519] {
            assert_eq!(
                master_from_seed(curve, &[0u8; 15]).unwrap_err(),
                Error::InvalidSeedLength(15)
            );
            assert!(master_from_seed(curve, &[0u8; 16]).is_ok());
        }
    }

    #[test]
    fn master_generation_is_deterministic() {
        let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let (a, cc_a) = master_from_seed(Curve::Secp256k1, &seed).unwrap();
        let (b, cc_b) = master_from_seed(Curve::Secp256k1, &seed).unwrap();
        assert_eq!(a, b);
        assert_eq!(cc_a, cc_b);
    }

    #[test]
    fn ed25519_rejects_unhardened() {
        let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        for curve in [Curve::Ed25519, Curve::Ed25519Blake2b] {
            let (key, chain_code) = master_from_seed(curve, &seed).unwrap();
            assert_eq!(
                ckd_priv(&key, &chain_code, ChildNumber::Normal { index: 0 }).unwrap_err(),
                Error::NonHardenedNotSupported(curve)
            );
            assert!(ckd_priv(&key, &chain_code, ChildNumber::Hardened { index: 0 }).is_ok());
        }
    }

    #[test]
    fn nist256p1_private_and_public_derivation_agree() {
        let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let (key, chain_code) = master_from_seed(Curve::Nist256p1, &seed).unwrap();
        let child = ChildNumber::Normal { index: 7 };

        let (child_priv, cc_priv) = ckd_priv(&key, &chain_code, child).unwrap();
        let (child_pub, cc_pub) = ckd_pub(&key.public_key(), &chain_code, child).unwrap();

        assert_eq!(child_priv.public_key(), child_pub);
        assert_eq!(cc_priv, cc_pub);
    }
}
