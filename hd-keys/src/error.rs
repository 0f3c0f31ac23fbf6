//! Error types for the hd-keys library

use crate::base58;
use crate::curve::Curve;

/// Result type alias for hd-keys operations
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur during key derivation and serialization
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Seed shorter than the 128-bit minimum
    #[error("seed length {0} is below the 16 byte minimum")]
    InvalidSeedLength(usize),
    /// The master key retry loop hit its iteration bound
    #[error("seed did not produce a valid master key within the retry bound")]
    UnusableSeed,
    /// A child number was provided that was out of range
    #[error("child number {0} is invalid (not within [0, 2^31 - 1])")]
    InvalidChildNumber(u32),
    /// Invalid child number format
    #[error("invalid child number format")]
    InvalidChildNumberFormat,
    /// Invalid derivation path format
    #[error("invalid derivation path format")]
    InvalidDerivationPathFormat,
    /// The derived child key fell outside the valid scalar/point range.
    /// Deterministic for a given parent and index; pick another index.
    #[error("derived child key is invalid for this curve")]
    InvalidChildKey,
    /// A hardened child was requested from a public key
    #[error("cannot derive a hardened child from a public key")]
    CannotDeriveFromHardenedKey,
    /// The curve only supports hardened derivation
    #[error("{0} only supports hardened derivation")]
    NonHardenedNotSupported(Curve),
    /// The curve cannot derive children from public data
    #[error("{0} does not support public derivation")]
    PublicDerivationUnsupported(Curve),
    /// Private key material was requested from a public-only key
    #[error("public-only key has no private half")]
    PublicOnlyKey,
    /// Derivation would exceed the 255 level maximum
    #[error("maximum derivation depth exceeded")]
    MaximumDepthExceeded,
    /// Base58 decoding error
    #[error("base58: {0}")]
    Base58(#[from] base58::Error),
    /// Unknown version magic bytes
    #[error("unknown version magic bytes {0:02x?}")]
    UnknownVersion([u8; 4]),
    /// Wrong extended key length
    #[error("wrong extended key length {0}")]
    WrongExtendedKeyLength(usize),
    /// Private key data was not padded with 0x00
    #[error("invalid private key padding byte")]
    InvalidPrivateKeyPrefix,
    /// Key bytes did not form a valid private key for the curve
    #[error("invalid private key bytes for {0}")]
    InvalidPrivateKey(Curve),
    /// Key bytes did not form a valid public key for the curve
    #[error("invalid public key bytes for {0}")]
    InvalidPublicKey(Curve),
    /// Secp256k1 error
    #[error("secp256k1: {0}")]
    Secp256k1(#[from] secp256k1::Error),
}
