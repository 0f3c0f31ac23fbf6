//! Curve-tagged private and public key material.
//!
//! Keys are opaque byte containers bound to a [`Curve`]; all arithmetic on
//! them lives in the derivation modules. Private key bytes are wiped on
//! drop.

use core::fmt;

use blake2::{Blake2b512, Digest};
use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use ed25519_dalek::{SigningKey, VerifyingKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use secp256k1::Secp256k1;
use zeroize::Zeroize;

use crate::curve::Curve;
use crate::error::{Error, Result};
use crate::kholaw;

/// A private key bound to a curve
#[derive(Clone)]
pub enum PrivateKey {
    /// secp256k1 secret scalar
    Secp256k1(secp256k1::SecretKey),
    /// NIST P-256 secret scalar
    Nist256p1(p256::SecretKey),
    /// Ed25519 secret seed
    Ed25519([u8; 32]),
    /// Ed25519 secret seed, blake2b public-key flavour
    Ed25519Blake2b([u8; 32]),
    /// Extended Ed25519 secret, kL || kR
    Ed25519Kholaw([u8; 64]),
}

impl PrivateKey {
    /// The curve this key belongs to
    pub fn curve(&self) -> Curve {
        match self {
            PrivateKey::Secp256k1(_) => Curve::Secp256k1,
            PrivateKey::Nist256p1(_) => Curve::Nist256p1,
            PrivateKey::Ed25519(_) => Curve::Ed25519,
            PrivateKey::Ed25519Blake2b(_) => Curve::Ed25519Blake2b,
            PrivateKey::Ed25519Kholaw(_) => Curve::Ed25519Kholaw,
        }
    }

    /// Construct a private key from raw bytes, validating them for the curve
    pub fn from_bytes(curve: Curve, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != curve.private_key_len() {
            return Err(Error::InvalidPrivateKey(curve));
        }
        match curve {
            Curve::Secp256k1 => {
                let key = secp256k1::SecretKey::from_slice(bytes)
                    .map_err(|_| Error::InvalidPrivateKey(curve))?;
                Ok(PrivateKey::Secp256k1(key))
            }
            Curve::Nist256p1 => {
                let key = p256::SecretKey::from_bytes(p256::FieldBytes::from_slice(bytes))
                    .map_err(|_| Error::InvalidPrivateKey(curve))?;
                Ok(PrivateKey::Nist256p1(key))
            }
            Curve::Ed25519 => {
                let key = bytes.try_into().map_err(|_| Error::InvalidPrivateKey(curve))?;
                Ok(PrivateKey::Ed25519(key))
            }
            Curve::Ed25519Blake2b => {
                let key = bytes.try_into().map_err(|_| Error::InvalidPrivateKey(curve))?;
                Ok(PrivateKey::Ed25519Blake2b(key))
            }
            Curve::Ed25519Kholaw => {
                let key = bytes.try_into().map_err(|_| Error::InvalidPrivateKey(curve))?;
                Ok(PrivateKey::Ed25519Kholaw(key))
            }
        }
    }

    /// Raw private key bytes (32 bytes, or 64 for extended Ed25519)
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            PrivateKey::Secp256k1(key) => key.secret_bytes().to_vec(),
            PrivateKey::Nist256p1(key) => key.to_bytes().to_vec(),
            PrivateKey::Ed25519(key) | PrivateKey::Ed25519Blake2b(key) => key.to_vec(),
            PrivateKey::Ed25519Kholaw(key) => key.to_vec(),
        }
    }

    /// Compute the public key
    pub fn public_key(&self) -> PublicKey {
        match self {
            PrivateKey::Secp256k1(key) => {
                let secp = Secp256k1::new();
                PublicKey::Secp256k1(secp256k1::PublicKey::from_secret_key(&secp, key))
            }
            PrivateKey::Nist256p1(key) => PublicKey::Nist256p1(key.public_key()),
            PrivateKey::Ed25519(key) => {
                let verifying = SigningKey::from_bytes(key).verifying_key();
                PublicKey::Ed25519(verifying.to_bytes())
            }
            PrivateKey::Ed25519Blake2b(key) => {
                // Same curve, but the scalar comes from a blake2b digest of
                // the seed instead of sha512 (the Nano key scheme)
                let digest = Blake2b512::digest(key);
                let mut scalar = [0u8; 32];
                scalar.copy_from_slice(&digest[..32]);
                let point = EdwardsPoint::mul_base_clamped(scalar);
                scalar.zeroize();
                PublicKey::Ed25519Blake2b(point.compress().to_bytes())
            }
            PrivateKey::Ed25519Kholaw(key) => {
                let mut left = [0u8; 32];
                left.copy_from_slice(&key[..32]);
                let point = kholaw::public_point(&left);
                left.zeroize();
                PublicKey::Ed25519Kholaw(point)
            }
        }
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.curve() == other.curve() && self.to_bytes() == other.to_bytes()
    }
}

impl Eq for PrivateKey {}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PrivateKey").field(&self.curve()).field(&"<hidden>").finish()
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        match self {
            PrivateKey::Secp256k1(key) => key.non_secure_erase(),
            // p256::SecretKey zeroizes itself on drop
            PrivateKey::Nist256p1(_) => {}
            PrivateKey::Ed25519(key) | PrivateKey::Ed25519Blake2b(key) => key.zeroize(),
            PrivateKey::Ed25519Kholaw(key) => key.zeroize(),
        }
    }
}

/// A public key bound to a curve
#[derive(Clone)]
pub enum PublicKey {
    /// secp256k1 curve point
    Secp256k1(secp256k1::PublicKey),
    /// NIST P-256 curve point
    Nist256p1(p256::PublicKey),
    /// Ed25519 compressed point
    Ed25519([u8; 32]),
    /// Ed25519 compressed point, blake2b flavour
    Ed25519Blake2b([u8; 32]),
    /// Extended Ed25519 compressed point
    Ed25519Kholaw([u8; 32]),
}

impl PublicKey {
    /// The curve this key belongs to
    pub fn curve(&self) -> Curve {
        match self {
            PublicKey::Secp256k1(_) => Curve::Secp256k1,
            PublicKey::Nist256p1(_) => Curve::Nist256p1,
            PublicKey::Ed25519(_) => Curve::Ed25519,
            PublicKey::Ed25519Blake2b(_) => Curve::Ed25519Blake2b,
            PublicKey::Ed25519Kholaw(_) => Curve::Ed25519Kholaw,
        }
    }

    /// Construct a public key from serialized bytes, validating the point.
    ///
    /// Weierstrass curves take SEC1 data; the Ed25519 flavours take either
    /// the raw 32-byte compressed point or its 0x00-prefixed 33-byte form.
    pub fn from_bytes(curve: Curve, bytes: &[u8]) -> Result<Self> {
        match curve {
            Curve::Secp256k1 => {
                let key = secp256k1::PublicKey::from_slice(bytes)
                    .map_err(|_| Error::InvalidPublicKey(curve))?;
                Ok(PublicKey::Secp256k1(key))
            }
            Curve::Nist256p1 => {
                let key = p256::PublicKey::from_sec1_bytes(bytes)
                    .map_err(|_| Error::InvalidPublicKey(curve))?;
                Ok(PublicKey::Nist256p1(key))
            }
            Curve::Ed25519 | Curve::Ed25519Blake2b | Curve::Ed25519Kholaw => {
                let point: [u8; 32] = match bytes.len() {
                    32 => bytes.try_into().map_err(|_| Error::InvalidPublicKey(curve))?,
                    33 if bytes[0] == 0x00 => {
                        bytes[1..].try_into().map_err(|_| Error::InvalidPublicKey(curve))?
                    }
                    _ => return Err(Error::InvalidPublicKey(curve)),
                };
                if curve == Curve::Ed25519 {
                    VerifyingKey::from_bytes(&point).map_err(|_| Error::InvalidPublicKey(curve))?;
                } else if CompressedEdwardsY(point).decompress().is_none() {
                    return Err(Error::InvalidPublicKey(curve));
                }
                match curve {
                    Curve::Ed25519 => Ok(PublicKey::Ed25519(point)),
                    Curve::Ed25519Blake2b => Ok(PublicKey::Ed25519Blake2b(point)),
                    _ => Ok(PublicKey::Ed25519Kholaw(point)),
                }
            }
        }
    }

    /// Serialized compressed form, 33 bytes.
    ///
    /// Ed25519 points are padded with a leading 0x00 so that every curve
    /// fits the same extended-key slot, per SLIP-0010.
    pub fn serialize(&self) -> [u8; 33] {
        let mut ret = [0u8; 33];
        match self {
            PublicKey::Secp256k1(key) => ret.copy_from_slice(&key.serialize()),
            PublicKey::Nist256p1(key) => {
                ret.copy_from_slice(key.to_encoded_point(true).as_bytes())
            }
            PublicKey::Ed25519(point)
            | PublicKey::Ed25519Blake2b(point)
            | PublicKey::Ed25519Kholaw(point) => ret[1..].copy_from_slice(point),
        }
        ret
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.curve() == other.curve() && self.serialize() == other.serialize()
    }
}

impl Eq for PublicKey {}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey")
            .field(&self.curve())
            .field(&hex::encode(self.serialize()))
            .finish()
    }
}
