//! Extended Ed25519 (Khovratovich-Law) key generation and derivation, the
//! scheme Cardano uses.
//!
//! The secret is two 32-byte halves kL || kR. kL is the signing scalar
//! (clamped at master generation and evolved additively), kR feeds the
//! child HMACs. Unlike SLIP-0010 ed25519 this scheme supports non-hardened
//! private derivation; public-only derivation stays unsupported here.

use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::scalar::Scalar;
use hashes::{Hash, HashEngine, Hmac, HmacEngine, sha256, sha512};

use crate::bip32::ChainCode;
use crate::error::{Error, Result};
use crate::keys::PrivateKey;
use crate::path::ChildNumber;

const MASTER_HMAC_KEY: &[u8] = b"ed25519 seed";
const MASTER_RETRY_BOUND: usize = 16;

// Domain separation tags for the child HMACs. Hardened children mix in
// the secret halves, non-hardened children the public point.
const TAG_Z_HARDENED: u8 = 0x00;
const TAG_CC_HARDENED: u8 = 0x01;
const TAG_Z_NORMAL: u8 = 0x02;
const TAG_CC_NORMAL: u8 = 0x03;

/// Generate the master extended key and chain code from a seed.
///
/// The seed is HMAC-hashed repeatedly (each round over the previous
/// 64-byte digest) until bit 0x20 of byte 31 is clear, then kL is clamped:
/// low three bits and the top bit cleared, bit 254 set. The chain code
/// comes from a separate HMAC-SHA256 over the 0x01-prefixed seed.
pub(crate) fn master_from_seed(seed: &[u8]) -> Result<(PrivateKey, ChainCode)> {
    if seed.len() < 16 {
        return Err(Error::InvalidSeedLength(seed.len()));
    }
    let mut message = seed.to_vec();
    let mut key: Option<[u8; 64]> = None;
    for _ in 0..MASTER_RETRY_BOUND {
        let mut engine: HmacEngine<sha512::Hash> = HmacEngine::new(MASTER_HMAC_KEY);
        engine.input(&message);
        let digest = Hmac::<sha512::Hash>::from_engine(engine).to_byte_array();
        if digest[31] & 0x20 == 0 {
            key = Some(digest);
            break;
        }
        message = digest.to_vec();
    }
    let mut key = key.ok_or(Error::UnusableSeed)?;
    key[0] &= 0b1111_1000;
    key[31] &= 0b0111_1111;
    key[31] |= 0b0100_0000;

    let mut engine: HmacEngine<sha256::Hash> = HmacEngine::new(MASTER_HMAC_KEY);
    engine.input(&[0x01]);
    engine.input(seed);
    let chain_code = Hmac::<sha256::Hash>::from_engine(engine).to_byte_array();

    Ok((PrivateKey::Ed25519Kholaw(key), ChainCode::from_bytes(chain_code)))
}

/// Private->Private child key derivation.
///
/// kL' = 8 * ZL[..28] + kL, kR' = ZR + kR (mod 2^256), both little-endian;
/// the chain code comes from a second HMAC under its own tag. A child
/// whose kL' reduces to zero is rejected rather than returned.
pub(crate) fn ckd_priv(
    parent: &PrivateKey,
    chain_code: &ChainCode,
    child: ChildNumber,
) -> Result<(PrivateKey, ChainCode)> {
    let key = match parent {
        PrivateKey::Ed25519Kholaw(key) => key,
        _ => unreachable!("kholaw derivation is dispatched on the key curve"),
    };
    // Cardano serializes the child index little-endian
    let index = u32::from(child).to_le_bytes();
    let (z, cc_digest) = if child.is_hardened() {
        (
            tagged_hmac(chain_code, TAG_Z_HARDENED, key, &index),
            tagged_hmac(chain_code, TAG_CC_HARDENED, key, &index),
        )
    } else {
        let point = public_point(&left_half(key));
        (
            tagged_hmac(chain_code, TAG_Z_NORMAL, &point, &index),
            tagged_hmac(chain_code, TAG_CC_NORMAL, &point, &index),
        )
    };

    let kl = add_mul8_le(&left_half(key), &z[..28]);
    if Scalar::from_bytes_mod_order(kl) == Scalar::ZERO {
        return Err(Error::InvalidChildKey);
    }
    let kr = add_le(&right_half(key), &z[32..]);

    let mut child_key = [0u8; 64];
    child_key[..32].copy_from_slice(&kl);
    child_key[32..].copy_from_slice(&kr);

    let mut chain_code = [0u8; 32];
    chain_code.copy_from_slice(&cc_digest[32..]);

    Ok((PrivateKey::Ed25519Kholaw(child_key), ChainCode::from_bytes(chain_code)))
}

/// Compressed base-point multiple of a little-endian scalar
pub(crate) fn public_point(kl: &[u8; 32]) -> [u8; 32] {
    let scalar = Scalar::from_bytes_mod_order(*kl);
    EdwardsPoint::mul_base(&scalar).compress().to_bytes()
}

fn left_half(key: &[u8; 64]) -> [u8; 32] {
    key[..32].try_into().expect("key is 64 bytes")
}

fn right_half(key: &[u8; 64]) -> [u8; 32] {
    key[32..].try_into().expect("key is 64 bytes")
}

fn tagged_hmac(chain_code: &ChainCode, tag: u8, data: &[u8], index: &[u8; 4]) -> [u8; 64] {
    let mut engine: HmacEngine<sha512::Hash> = HmacEngine::new(chain_code.as_ref());
    engine.input(&[tag]);
    engine.input(data);
    engine.input(index);
    Hmac::<sha512::Hash>::from_engine(engine).to_byte_array()
}

/// (8 * z + k) mod 2^256 over little-endian bytes; z is 28 bytes wide
fn add_mul8_le(k: &[u8; 32], z: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut carry = 0u32;
    for i in 0..32 {
        let z_byte = if i < 28 { u32::from(z[i]) * 8 } else { 0 };
        let sum = carry + u32::from(k[i]) + z_byte;
        out[i] = sum as u8;
        carry = sum >> 8;
    }
    out
}

/// (z + k) mod 2^256 over little-endian bytes
fn add_le(k: &[u8; 32], z: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut carry = 0u32;
    for i in 0..32 {
        let sum = carry + u32::from(k[i]) + u32::from(z[i]);
        out[i] = sum as u8;
        carry = sum >> 8;
    }
    out
}
