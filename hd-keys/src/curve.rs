//! The closed set of curves the derivation engine supports, together with
//! the capability flags that gate which derivation styles each one allows.

use core::fmt;

/// Elliptic curve / derivation scheme identifier.
///
/// Each variant pairs a curve with the child-key derivation rules defined
/// for it: BIP32 for secp256k1, SLIP-0010 for nist256p1 and the two
/// ed25519 flavours, and the Khovratovich-Law extended-Ed25519 scheme for
/// `Ed25519Kholaw` (Cardano).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Curve {
    /// secp256k1 with BIP32 derivation
    Secp256k1,
    /// NIST P-256 with SLIP-0010 derivation
    Nist256p1,
    /// Ed25519 with SLIP-0010 derivation (hardened only)
    Ed25519,
    /// Ed25519 with a blake2b public-key digest (Nano), SLIP-0010 derivation
    Ed25519Blake2b,
    /// Extended Ed25519 per Khovratovich-Law (Cardano)
    Ed25519Kholaw,
}

impl Curve {
    /// All supported curves
    pub fn all() -> [Curve; 5] {
        [
            Curve::Secp256k1,
            Curve::Nist256p1,
            Curve::Ed25519,
            Curve::Ed25519Blake2b,
            Curve::Ed25519Kholaw,
        ]
    }

    /// Can a child public key be computed from the parent public key alone?
    pub fn supports_public_derivation(self) -> bool {
        match self {
            Curve::Secp256k1 | Curve::Nist256p1 => true,
            Curve::Ed25519 | Curve::Ed25519Blake2b | Curve::Ed25519Kholaw => false,
        }
    }

    /// Can a private key derive non-hardened children?
    pub fn supports_unhardened_private_derivation(self) -> bool {
        match self {
            Curve::Secp256k1 | Curve::Nist256p1 | Curve::Ed25519Kholaw => true,
            Curve::Ed25519 | Curve::Ed25519Blake2b => false,
        }
    }

    /// Does the private key carry a second scalar half (kL || kR)?
    pub fn uses_extended_private_key(self) -> bool {
        self == Curve::Ed25519Kholaw
    }

    /// Length in bytes of the raw private key material
    pub fn private_key_len(self) -> usize {
        if self.uses_extended_private_key() { 64 } else { 32 }
    }

    /// Length in bytes of the serialized (compressed) public key
    pub fn public_key_len(self) -> usize {
        33
    }

    /// The HMAC-SHA512 key used for master key generation from a seed
    pub(crate) fn master_hmac_key(self) -> &'static [u8] {
        match self {
            Curve::Secp256k1 => b"Bitcoin seed",
            Curve::Nist256p1 => b"Nist256p1 seed",
            Curve::Ed25519 | Curve::Ed25519Blake2b | Curve::Ed25519Kholaw => b"ed25519 seed",
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Curve::Secp256k1 => "secp256k1",
            Curve::Nist256p1 => "nist256p1",
            Curve::Ed25519 => "ed25519",
            Curve::Ed25519Blake2b => "ed25519-blake2b",
            Curve::Ed25519Kholaw => "ed25519-kholaw",
        };
        f.write_str(name)
    }
}
