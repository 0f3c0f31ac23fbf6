//! A single handle over an extended key pair position in the derivation
//! tree, either with or without its private half.
//!
//! [`Bip32Context`] is the high-level entry point: build one from a seed,
//! a serialized extended key or raw key material, then walk the tree with
//! [`Bip32Context::child_key`] / [`Bip32Context::derive_path`]. Dropping
//! the private half is a consuming conversion, so a public-only context
//! can never be asked for secrets except through the fallible accessor.

use core::fmt;

use crate::base58;
use crate::bip32::{
    ChainCode, ExtendedPrivKey, ExtendedPubKey, Fingerprint, KeyData, KeyNetVersions,
};
use crate::curve::Curve;
use crate::error::{Error, Result};
use crate::keys::{PrivateKey, PublicKey};
use crate::path::{ChildNumber, DerivationPath};

/// An extended key position, private or public-only
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Bip32Context {
    /// Holds the private key; can derive any child the curve allows
    Private(ExtendedPrivKey),
    /// Public-only; limited to non-hardened derivation on curves that
    /// support it
    Public(ExtendedPubKey),
}

impl Bip32Context {
    /// Create a master context from a seed
    pub fn from_seed(curve: Curve, network: KeyNetVersions, seed: &[u8]) -> Result<Self> {
        Ok(Bip32Context::Private(ExtendedPrivKey::new_master(curve, network, seed)?))
    }

    /// Parse a Base58Check extended key; the version bytes decide whether
    /// the context is private or public-only
    pub fn from_extended(s: &str, curve: Curve, network: KeyNetVersions) -> Result<Self> {
        let data = base58::from_check(s)?;
        if data.len() < 4 {
            return Err(Error::WrongExtendedKeyLength(data.len()));
        }
        if data[0..4] == network.private() {
            Ok(Bip32Context::Private(ExtendedPrivKey::decode(curve, network, &data)?))
        } else if data[0..4] == network.public() {
            Ok(Bip32Context::Public(ExtendedPubKey::decode(curve, network, &data)?))
        } else {
            let mut version = [0u8; 4];
            version.copy_from_slice(&data[0..4]);
            Err(Error::UnknownVersion(version))
        }
    }

    /// Build a private context around raw key bytes
    pub fn from_private_key(
        curve: Curve,
        network: KeyNetVersions,
        key: &[u8],
        data: KeyData,
    ) -> Result<Self> {
        Ok(Bip32Context::Private(ExtendedPrivKey::from_private_key(curve, network, key, data)?))
    }

    /// Build a public-only context around raw key bytes
    pub fn from_public_key(
        curve: Curve,
        network: KeyNetVersions,
        key: &[u8],
        data: KeyData,
    ) -> Result<Self> {
        Ok(Bip32Context::Public(ExtendedPubKey::from_public_key(curve, network, key, data)?))
    }

    /// Derive the child at `child`, yielding a new context.
    ///
    /// On a public-only context this fails for hardened children and, on
    /// curves without public derivation, for every child.
    pub fn child_key(&self, child: ChildNumber) -> Result<Self> {
        match self {
            Bip32Context::Private(sk) => Ok(Bip32Context::Private(sk.ckd_priv(child)?)),
            Bip32Context::Public(pk) => Ok(Bip32Context::Public(pk.ckd_pub(child)?)),
        }
    }

    /// Derive along a parsed path
    pub fn derive(&self, path: &DerivationPath) -> Result<Self> {
        let mut ctx = self.clone();
        for &cnum in path.as_ref() {
            ctx = ctx.child_key(cnum)?;
        }
        Ok(ctx)
    }

    /// Derive along a string path.
    ///
    /// An absolute path (leading `m`) is only meaningful from the master;
    /// elsewhere pass a relative path.
    pub fn derive_path(&self, path: &str) -> Result<Self> {
        let is_absolute = path == "m" || path.starts_with("m/");
        if is_absolute && self.depth() != 0 {
            return Err(Error::InvalidDerivationPathFormat);
        }
        let path: DerivationPath = path.parse()?;
        self.derive(&path)
    }

    /// Discard the private half, if any. The conversion consumes the
    /// context and cannot be undone.
    pub fn convert_to_public(self) -> Self {
        match self {
            Bip32Context::Private(sk) => Bip32Context::Public(ExtendedPubKey::from_priv(&sk)),
            public => public,
        }
    }

    /// Whether the private half is absent
    pub fn is_public_only(&self) -> bool {
        matches!(self, Bip32Context::Public(_))
    }

    /// The private key, failing on a public-only context
    pub fn private_key(&self) -> Result<&PrivateKey> {
        match self {
            Bip32Context::Private(sk) => Ok(&sk.private_key),
            Bip32Context::Public(_) => Err(Error::PublicOnlyKey),
        }
    }

    /// The public key
    pub fn public_key(&self) -> PublicKey {
        match self {
            Bip32Context::Private(sk) => sk.public_key(),
            Bip32Context::Public(pk) => pk.public_key.clone(),
        }
    }

    /// The curve this context derives on
    pub fn curve(&self) -> Curve {
        match self {
            Bip32Context::Private(sk) => sk.curve(),
            Bip32Context::Public(pk) => pk.curve(),
        }
    }

    /// Depth in the derivation tree, 0 for the master
    pub fn depth(&self) -> u8 {
        match self {
            Bip32Context::Private(sk) => sk.depth,
            Bip32Context::Public(pk) => pk.depth,
        }
    }

    /// The child number this context was derived at
    pub fn index(&self) -> ChildNumber {
        match self {
            Bip32Context::Private(sk) => sk.child_number,
            Bip32Context::Public(pk) => pk.child_number,
        }
    }

    /// The chain code
    pub fn chain_code(&self) -> ChainCode {
        match self {
            Bip32Context::Private(sk) => sk.chain_code,
            Bip32Context::Public(pk) => pk.chain_code,
        }
    }

    /// The network version pair this context serializes with
    pub fn network(&self) -> KeyNetVersions {
        match self {
            Bip32Context::Private(sk) => sk.network,
            Bip32Context::Public(pk) => pk.network,
        }
    }

    /// HASH160 identifier of the public key
    pub fn identifier(&self) -> [u8; 20] {
        match self {
            Bip32Context::Private(sk) => sk.identifier(),
            Bip32Context::Public(pk) => pk.identifier(),
        }
    }

    /// Fingerprint of this key
    pub fn fingerprint(&self) -> Fingerprint {
        match self {
            Bip32Context::Private(sk) => sk.fingerprint(),
            Bip32Context::Public(pk) => pk.fingerprint(),
        }
    }

    /// Fingerprint of the parent key, all-zero for the master
    pub fn parent_fingerprint(&self) -> Fingerprint {
        match self {
            Bip32Context::Private(sk) => sk.parent_fingerprint,
            Bip32Context::Public(pk) => pk.parent_fingerprint,
        }
    }

    /// Serialize to the Base58Check extended-key string, private or public
    /// per the context
    pub fn to_extended(&self) -> String {
        match self {
            Bip32Context::Private(sk) => sk.to_extended(),
            Bip32Context::Public(pk) => pk.to_extended(),
        }
    }
}

impl From<ExtendedPrivKey> for Bip32Context {
    fn from(sk: ExtendedPrivKey) -> Self {
        Bip32Context::Private(sk)
    }
}

impl From<ExtendedPubKey> for Bip32Context {
    fn from(pk: ExtendedPubKey) -> Self {
        Bip32Context::Public(pk)
    }
}

impl fmt::Display for Bip32Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_extended())
    }
}
