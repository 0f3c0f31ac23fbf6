//! Multi-curve extended keys.
//!
//! Extended keys pair key material with the metadata BIP32 defines for it
//! (depth, parent fingerprint, child number, chain code, network version
//! bytes) and serialize to the 78-byte Base58Check wire format. The same
//! layout carries every supported curve; extended Ed25519 private keys use
//! the 110-byte Cardano variant since their secret is two scalars wide.

use core::fmt;

use hashes::{Hash, hash160};

use crate::base58;
use crate::curve::Curve;
use crate::error::{Error, Result};
use crate::keys::{PrivateKey, PublicKey};
use crate::path::ChildNumber;
use crate::{kholaw, slip10};

/// A chain code
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ChainCode([u8; 32]);

impl ChainCode {
    /// Construct from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        ChainCode(bytes)
    }

    /// The raw bytes
    pub fn to_bytes(self) -> [u8; 32] {
        self.0
    }

    /// A reference to the raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl AsRef<[u8]> for ChainCode {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for ChainCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainCode({})", hex::encode(self.0))
    }
}

/// A fingerprint, the first four bytes of a key identifier.
///
/// The all-zero value marks a master key's (absent) parent.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Fingerprint([u8; 4]);

impl Fingerprint {
    /// Construct from raw bytes
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Fingerprint(bytes)
    }

    /// The raw bytes
    pub fn to_bytes(self) -> [u8; 4] {
        self.0
    }

    /// A reference to the raw bytes
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Whether this is the all-zero master marker
    pub fn is_master(&self) -> bool {
        self.0 == [0; 4]
    }
}

impl AsRef<[u8]> for Fingerprint {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", hex::encode(self.0))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// The pair of 4-byte version prefixes a network uses for extended public
/// and private keys.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct KeyNetVersions {
    public: [u8; 4],
    private: [u8; 4],
}

impl KeyNetVersions {
    /// Bitcoin mainnet: xpub / xprv
    pub const MAINNET: KeyNetVersions =
        KeyNetVersions { public: [0x04, 0x88, 0xB2, 0x1E], private: [0x04, 0x88, 0xAD, 0xE4] };

    /// Bitcoin testnet: tpub / tprv
    pub const TESTNET: KeyNetVersions =
        KeyNetVersions { public: [0x04, 0x35, 0x87, 0xCF], private: [0x04, 0x35, 0x83, 0x94] };

    /// Construct a custom version pair
    pub fn new(public: [u8; 4], private: [u8; 4]) -> Self {
        KeyNetVersions { public, private }
    }

    /// Version bytes for extended public keys
    pub fn public(&self) -> [u8; 4] {
        self.public
    }

    /// Version bytes for extended private keys
    pub fn private(&self) -> [u8; 4] {
        self.private
    }
}

impl Default for KeyNetVersions {
    fn default() -> Self {
        KeyNetVersions::MAINNET
    }
}

/// Derivation metadata attached to a key that was imported raw rather than
/// derived, defaulting to a master position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyData {
    /// Chain code (all zero when unknown)
    pub chain_code: ChainCode,
    /// Depth in the derivation tree
    pub depth: u8,
    /// Child number used to derive the key
    pub child_number: ChildNumber,
    /// Fingerprint of the parent key
    pub parent_fingerprint: Fingerprint,
}

impl Default for KeyData {
    fn default() -> Self {
        KeyData {
            chain_code: ChainCode::default(),
            depth: 0,
            child_number: ChildNumber::Normal { index: 0 },
            parent_fingerprint: Fingerprint::default(),
        }
    }
}

/// Extended private key
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ExtendedPrivKey {
    /// Network version bytes this key serializes with
    pub network: KeyNetVersions,
    /// Depth in the derivation tree
    pub depth: u8,
    /// Parent fingerprint
    pub parent_fingerprint: Fingerprint,
    /// Child number used to derive this key
    pub child_number: ChildNumber,
    /// The private key
    pub private_key: PrivateKey,
    /// Chain code for derivation
    pub chain_code: ChainCode,
}

impl ExtendedPrivKey {
    /// Create a new master key from a seed of at least 16 bytes.
    ///
    /// Seeds that generate an out-of-range scalar are retried internally by
    /// re-keying the HMAC chain; the retry bound surfaces as
    /// [`Error::UnusableSeed`] only in the cryptographically negligible case
    /// where every iteration fails.
    pub fn new_master(curve: Curve, network: KeyNetVersions, seed: &[u8]) -> Result<Self> {
        let (private_key, chain_code) = match curve {
            Curve::Ed25519Kholaw => kholaw::master_from_seed(seed)?,
            _ => slip10::master_from_seed(curve, seed)?,
        };
        Ok(ExtendedPrivKey {
            network,
            depth: 0,
            parent_fingerprint: Fingerprint::default(),
            child_number: ChildNumber::Normal { index: 0 },
            private_key,
            chain_code,
        })
    }

    /// Build an extended key around existing private key material
    pub fn from_private_key(
        curve: Curve,
        network: KeyNetVersions,
        key: &[u8],
        data: KeyData,
    ) -> Result<Self> {
        Ok(ExtendedPrivKey {
            network,
            depth: data.depth,
            parent_fingerprint: data.parent_fingerprint,
            child_number: data.child_number,
            private_key: PrivateKey::from_bytes(curve, key)?,
            chain_code: data.chain_code,
        })
    }

    /// The curve this key belongs to
    pub fn curve(&self) -> Curve {
        self.private_key.curve()
    }

    /// Private->Private child key derivation
    pub fn ckd_priv(&self, child: ChildNumber) -> Result<ExtendedPrivKey> {
        let depth = self.depth.checked_add(1).ok_or(Error::MaximumDepthExceeded)?;
        let (private_key, chain_code) = match self.curve() {
            Curve::Ed25519Kholaw => kholaw::ckd_priv(&self.private_key, &self.chain_code, child)?,
            _ => slip10::ckd_priv(&self.private_key, &self.chain_code, child)?,
        };
        Ok(ExtendedPrivKey {
            network: self.network,
            depth,
            parent_fingerprint: self.fingerprint(),
            child_number: child,
            private_key,
            chain_code,
        })
    }

    /// Derive a private key along a path of child numbers
    pub fn derive_priv<P: AsRef<[ChildNumber]>>(&self, path: &P) -> Result<ExtendedPrivKey> {
        let mut sk = self.clone();
        for &cnum in path.as_ref() {
            sk = sk.ckd_priv(cnum)?;
        }
        Ok(sk)
    }

    /// The public key matching this private key
    pub fn public_key(&self) -> PublicKey {
        self.private_key.public_key()
    }

    /// HASH160 of the serialized public key
    pub fn identifier(&self) -> [u8; 20] {
        hash160::Hash::hash(&self.public_key().serialize()).to_byte_array()
    }

    /// First four bytes of the identifier
    pub fn fingerprint(&self) -> Fingerprint {
        let id = self.identifier();
        Fingerprint::from_bytes([id[0], id[1], id[2], id[3]])
    }

    /// Serialize to the binary extended-key layout (78 bytes, or 110 for
    /// extended Ed25519 private keys)
    pub fn encode(&self) -> Vec<u8> {
        let key_bytes = self.private_key.to_bytes();
        let mut ret = Vec::with_capacity(46 + key_bytes.len());
        ret.extend_from_slice(&self.network.private());
        ret.push(self.depth);
        ret.extend_from_slice(self.parent_fingerprint.as_ref());
        ret.extend_from_slice(&u32::from(self.child_number).to_be_bytes());
        ret.extend_from_slice(self.chain_code.as_ref());
        ret.push(0x00);
        ret.extend_from_slice(&key_bytes);
        ret
    }

    /// Decode the binary extended-key layout
    pub fn decode(curve: Curve, network: KeyNetVersions, data: &[u8]) -> Result<Self> {
        let expected_len = 46 + curve.private_key_len();
        if data.len() != expected_len {
            return Err(Error::WrongExtendedKeyLength(data.len()));
        }
        if data[0..4] != network.private() {
            let mut version = [0u8; 4];
            version.copy_from_slice(&data[0..4]);
            return Err(Error::UnknownVersion(version));
        }
        if data[45] != 0x00 {
            return Err(Error::InvalidPrivateKeyPrefix);
        }
        let parent_fingerprint: [u8; 4] =
            data[5..9].try_into().map_err(|_| Error::WrongExtendedKeyLength(data.len()))?;
        let child_number: [u8; 4] =
            data[9..13].try_into().map_err(|_| Error::WrongExtendedKeyLength(data.len()))?;
        let chain_code: [u8; 32] =
            data[13..45].try_into().map_err(|_| Error::WrongExtendedKeyLength(data.len()))?;
        Ok(ExtendedPrivKey {
            network,
            depth: data[4],
            parent_fingerprint: Fingerprint::from_bytes(parent_fingerprint),
            child_number: ChildNumber::from(u32::from_be_bytes(child_number)),
            private_key: PrivateKey::from_bytes(curve, &data[46..])?,
            chain_code: ChainCode::from_bytes(chain_code),
        })
    }

    /// Parse a Base58Check extended private key for the given curve and
    /// network
    pub fn from_extended(s: &str, curve: Curve, network: KeyNetVersions) -> Result<Self> {
        let data = base58::from_check(s)?;
        Self::decode(curve, network, &data)
    }

    /// The Base58Check string form
    pub fn to_extended(&self) -> String {
        base58::check_encode_slice(&self.encode())
    }
}

impl fmt::Display for ExtendedPrivKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_extended())
    }
}

/// Extended public key
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ExtendedPubKey {
    /// Network version bytes this key serializes with
    pub network: KeyNetVersions,
    /// Depth in the derivation tree
    pub depth: u8,
    /// Parent fingerprint
    pub parent_fingerprint: Fingerprint,
    /// Child number used to derive this key
    pub child_number: ChildNumber,
    /// The public key
    pub public_key: PublicKey,
    /// Chain code for derivation
    pub chain_code: ChainCode,
}

impl ExtendedPubKey {
    /// Derive the extended public key matching an extended private key
    pub fn from_priv(sk: &ExtendedPrivKey) -> ExtendedPubKey {
        ExtendedPubKey {
            network: sk.network,
            depth: sk.depth,
            parent_fingerprint: sk.parent_fingerprint,
            child_number: sk.child_number,
            public_key: sk.public_key(),
            chain_code: sk.chain_code,
        }
    }

    /// Build an extended key around existing public key material
    pub fn from_public_key(
        curve: Curve,
        network: KeyNetVersions,
        key: &[u8],
        data: KeyData,
    ) -> Result<Self> {
        Ok(ExtendedPubKey {
            network,
            depth: data.depth,
            parent_fingerprint: data.parent_fingerprint,
            child_number: data.child_number,
            public_key: PublicKey::from_bytes(curve, key)?,
            chain_code: data.chain_code,
        })
    }

    /// The curve this key belongs to
    pub fn curve(&self) -> Curve {
        self.public_key.curve()
    }

    /// Public->Public child key derivation.
    ///
    /// Hardened children require the private key; on curves without public
    /// derivation every child does.
    pub fn ckd_pub(&self, child: ChildNumber) -> Result<ExtendedPubKey> {
        let depth = self.depth.checked_add(1).ok_or(Error::MaximumDepthExceeded)?;
        if child.is_hardened() {
            return Err(Error::CannotDeriveFromHardenedKey);
        }
        if !self.curve().supports_public_derivation() {
            return Err(Error::PublicDerivationUnsupported(self.curve()));
        }
        let (public_key, chain_code) = slip10::ckd_pub(&self.public_key, &self.chain_code, child)?;
        Ok(ExtendedPubKey {
            network: self.network,
            depth,
            parent_fingerprint: self.fingerprint(),
            child_number: child,
            public_key,
            chain_code,
        })
    }

    /// Derive a public key along a path of child numbers
    pub fn derive_pub<P: AsRef<[ChildNumber]>>(&self, path: &P) -> Result<ExtendedPubKey> {
        let mut pk = self.clone();
        for &cnum in path.as_ref() {
            pk = pk.ckd_pub(cnum)?;
        }
        Ok(pk)
    }

    /// HASH160 of the serialized public key
    pub fn identifier(&self) -> [u8; 20] {
        hash160::Hash::hash(&self.public_key.serialize()).to_byte_array()
    }

    /// First four bytes of the identifier
    pub fn fingerprint(&self) -> Fingerprint {
        let id = self.identifier();
        Fingerprint::from_bytes([id[0], id[1], id[2], id[3]])
    }

    /// Serialize to the 78-byte binary extended-key layout
    pub fn encode(&self) -> Vec<u8> {
        let mut ret = Vec::with_capacity(78);
        ret.extend_from_slice(&self.network.public());
        ret.push(self.depth);
        ret.extend_from_slice(self.parent_fingerprint.as_ref());
        ret.extend_from_slice(&u32::from(self.child_number).to_be_bytes());
        ret.extend_from_slice(self.chain_code.as_ref());
        ret.extend_from_slice(&self.public_key.serialize());
        ret
    }

    /// Decode the 78-byte binary extended-key layout
    pub fn decode(curve: Curve, network: KeyNetVersions, data: &[u8]) -> Result<Self> {
        if data.len() != 78 {
            return Err(Error::WrongExtendedKeyLength(data.len()));
        }
        if data[0..4] != network.public() {
            let mut version = [0u8; 4];
            version.copy_from_slice(&data[0..4]);
            return Err(Error::UnknownVersion(version));
        }
        let parent_fingerprint: [u8; 4] =
            data[5..9].try_into().map_err(|_| Error::WrongExtendedKeyLength(data.len()))?;
        let child_number: [u8; 4] =
            data[9..13].try_into().map_err(|_| Error::WrongExtendedKeyLength(data.len()))?;
        let chain_code: [u8; 32] =
            data[13..45].try_into().map_err(|_| Error::WrongExtendedKeyLength(data.len()))?;
        Ok(ExtendedPubKey {
            network,
            depth: data[4],
            parent_fingerprint: Fingerprint::from_bytes(parent_fingerprint),
            child_number: ChildNumber::from(u32::from_be_bytes(child_number)),
            public_key: PublicKey::from_bytes(curve, &data[45..])?,
            chain_code: ChainCode::from_bytes(chain_code),
        })
    }

    /// Parse a Base58Check extended public key for the given curve and
    /// network
    pub fn from_extended(s: &str, curve: Curve, network: KeyNetVersions) -> Result<Self> {
        let data = base58::from_check(s)?;
        Self::decode(curve, network, &data)
    }

    /// The Base58Check string form
    pub fn to_extended(&self) -> String {
        base58::check_encode_slice(&self.encode())
    }
}

impl fmt::Display for ExtendedPubKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_extended())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_lengths() {
        let seed = [0x42u8; 32];
        for curve in Curve::all() {
            let sk = ExtendedPrivKey::new_master(curve, KeyNetVersions::MAINNET, &seed).unwrap();
            let expected = if curve.uses_extended_private_key() { 110 } else { 78 };
            assert_eq!(sk.encode().len(), expected, "{}", curve);
            assert_eq!(ExtendedPubKey::from_priv(&sk).encode().len(), 78, "{}", curve);
        }
    }

    #[test]
    fn master_metadata() {
        let seed = [0x42u8; 32];
        let sk =
            ExtendedPrivKey::new_master(Curve::Secp256k1, KeyNetVersions::MAINNET, &seed).unwrap();
        assert_eq!(sk.depth, 0);
        assert!(sk.parent_fingerprint.is_master());
        assert_eq!(u32::from(sk.child_number), 0);
    }

    #[test]
    fn decode_rejects_bad_prefix_byte() {
        let seed = [0x42u8; 32];
        let sk =
            ExtendedPrivKey::new_master(Curve::Secp256k1, KeyNetVersions::MAINNET, &seed).unwrap();
        let mut data = sk.encode();
        data[45] = 0x01;
        assert_eq!(
            ExtendedPrivKey::decode(Curve::Secp256k1, KeyNetVersions::MAINNET, &data),
            Err(Error::InvalidPrivateKeyPrefix)
        );
    }
}
