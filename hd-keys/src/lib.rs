//! Curve-agnostic hierarchical deterministic key derivation.
//!
//! This library implements BIP32 and its curve-specific extensions:
//! SLIP-0010 for nist256p1 and the ed25519 flavours, and the
//! Khovratovich-Law extended-Ed25519 scheme used by Cardano. It covers
//! master key generation from a seed, hardened and non-hardened child
//! derivation with per-curve capability rules, the 78-byte Base58Check
//! extended-key wire format, and `m/44'/0'/0'/0/0`-style path parsing.
//!
//! The usual entry point is [`Bip32Context`]:
//!
//! ```
//! use hd_keys::{Bip32Context, Curve, KeyNetVersions};
//!
//! let seed = [0x3a; 32];
//! let master = Bip32Context::from_seed(Curve::Secp256k1, KeyNetVersions::MAINNET, &seed)?;
//! let account = master.derive_path("m/44'/0'/0'")?;
//! let watch_only = account.convert_to_public();
//! let address_key = watch_only.derive_path("0/0")?;
//! # assert!(address_key.is_public_only());
//! # Ok::<(), hd_keys::Error>(())
//! ```

pub mod base58;
pub mod bip32;
pub mod context;
pub mod curve;
pub mod error;
pub mod keys;
pub mod path;

mod kholaw;
mod slip10;

pub use bip32::{ChainCode, ExtendedPrivKey, ExtendedPubKey, Fingerprint, KeyData, KeyNetVersions};
pub use context::Bip32Context;
pub use curve::Curve;
pub use error::{Error, Result};
pub use keys::{PrivateKey, PublicKey};
pub use path::{ChildNumber, DerivationPath};

/// Re-export of commonly used types
pub mod prelude {
    pub use super::{
        Bip32Context, ChainCode, ChildNumber, Curve, DerivationPath, Error, ExtendedPrivKey,
        ExtendedPubKey, Fingerprint, KeyData, KeyNetVersions, PrivateKey, PublicKey, Result,
    };
}
