//! Derivation path components and string parsing.

use core::fmt;
use core::str::FromStr;

use crate::error::Error;

/// A child number for a derived key
#[derive(Copy, Clone, PartialEq, Eq, Debug, PartialOrd, Ord, Hash)]
pub enum ChildNumber {
    /// Non-hardened key
    Normal {
        /// Key index, within [0, 2^31 - 1]
        index: u32,
    },
    /// Hardened key
    Hardened {
        /// Key index, within [0, 2^31 - 1]
        index: u32,
    },
}

impl ChildNumber {
    /// Create a [`ChildNumber::Normal`] from an index, returning an error if
    /// the index is not within [0, 2^31 - 1].
    pub fn from_normal_idx(index: u32) -> Result<Self, Error> {
        if index & (1 << 31) == 0 {
            Ok(ChildNumber::Normal { index })
        } else {
            Err(Error::InvalidChildNumber(index))
        }
    }

    /// Create a [`ChildNumber::Hardened`] from an index, returning an error
    /// if the index is not within [0, 2^31 - 1].
    pub fn from_hardened_idx(index: u32) -> Result<Self, Error> {
        if index & (1 << 31) == 0 {
            Ok(ChildNumber::Hardened { index })
        } else {
            Err(Error::InvalidChildNumber(index))
        }
    }

    /// Returns `true` if the child number is a [`ChildNumber::Normal`] value
    pub fn is_normal(self) -> bool {
        !self.is_hardened()
    }

    /// Returns `true` if the child number is a [`ChildNumber::Hardened`] value
    pub fn is_hardened(self) -> bool {
        match self {
            ChildNumber::Hardened { .. } => true,
            ChildNumber::Normal { .. } => false,
        }
    }

    /// Returns the child number that is a single increment from this one
    pub fn increment(self) -> Result<ChildNumber, Error> {
        match self {
            ChildNumber::Normal { index } => ChildNumber::from_normal_idx(index + 1),
            ChildNumber::Hardened { index } => ChildNumber::from_hardened_idx(index + 1),
        }
    }
}

impl From<u32> for ChildNumber {
    fn from(number: u32) -> Self {
        if number & (1 << 31) != 0 {
            ChildNumber::Hardened { index: number ^ (1 << 31) }
        } else {
            ChildNumber::Normal { index: number }
        }
    }
}

impl From<ChildNumber> for u32 {
    fn from(cnum: ChildNumber) -> Self {
        match cnum {
            ChildNumber::Normal { index } => index,
            ChildNumber::Hardened { index } => index | (1 << 31),
        }
    }
}

impl fmt::Display for ChildNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ChildNumber::Hardened { index } => write!(f, "{}'", index),
            ChildNumber::Normal { index } => write!(f, "{}", index),
        }
    }
}

impl FromStr for ChildNumber {
    type Err = Error;

    fn from_str(inp: &str) -> Result<ChildNumber, Error> {
        let is_hardened = inp.ends_with('\'') || inp.ends_with('h') || inp.ends_with('H');
        if is_hardened {
            let index =
                inp[..inp.len() - 1].parse().map_err(|_| Error::InvalidChildNumberFormat)?;
            ChildNumber::from_hardened_idx(index)
        } else {
            let index = inp.parse().map_err(|_| Error::InvalidChildNumberFormat)?;
            ChildNumber::from_normal_idx(index)
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ChildNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        u32::from(*self).serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ChildNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        u32::deserialize(deserializer).map(ChildNumber::from)
    }
}

/// An ordered list of child numbers, parsed from the usual
/// `m/44'/0'/0'/0/0` notation.
///
/// The leading `m` marks an absolute path and may be omitted for relative
/// derivation; it is consumed by the parser, not stored.
#[derive(Clone, PartialEq, Eq, Ord, PartialOrd, Hash, Default)]
pub struct DerivationPath(Vec<ChildNumber>);

impl From<Vec<ChildNumber>> for DerivationPath {
    fn from(numbers: Vec<ChildNumber>) -> Self {
        DerivationPath(numbers)
    }
}

impl From<DerivationPath> for Vec<ChildNumber> {
    fn from(path: DerivationPath) -> Self {
        path.0
    }
}

impl<'a> From<&'a [ChildNumber]> for DerivationPath {
    fn from(numbers: &'a [ChildNumber]) -> Self {
        DerivationPath(numbers.to_vec())
    }
}

impl FromIterator<ChildNumber> for DerivationPath {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = ChildNumber>,
    {
        DerivationPath(Vec::from_iter(iter))
    }
}

impl<'a> IntoIterator for &'a DerivationPath {
    type Item = &'a ChildNumber;
    type IntoIter = core::slice::Iter<'a, ChildNumber>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl AsRef<[ChildNumber]> for DerivationPath {
    fn as_ref(&self) -> &[ChildNumber] {
        &self.0
    }
}

impl FromStr for DerivationPath {
    type Err = Error;

    fn from_str(path: &str) -> Result<DerivationPath, Error> {
        if path.is_empty() {
            return Err(Error::InvalidDerivationPathFormat);
        }
        let mut parts = path.split('/').peekable();
        if parts.peek() == Some(&"m") {
            parts.next();
        }
        parts.map(str::parse).collect()
    }
}

impl DerivationPath {
    /// Returns whether the path is empty (the master itself)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of derivation steps
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Create a new path with `cn` appended
    pub fn child(&self, cn: ChildNumber) -> DerivationPath {
        let mut path = self.0.clone();
        path.push(cn);
        DerivationPath(path)
    }

    /// Convert into a new path with `cn` appended
    pub fn into_child(self, cn: ChildNumber) -> DerivationPath {
        let mut path = self.0;
        path.push(cn);
        DerivationPath(path)
    }

    /// Concatenate `self` with `path` and return the resulting new path
    pub fn extend<T: AsRef<[ChildNumber]>>(&self, path: T) -> DerivationPath {
        let mut new_path = self.clone();
        new_path.0.extend_from_slice(path.as_ref());
        new_path
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for cn in self.0.iter() {
            f.write_str("/")?;
            fmt::Display::fmt(cn, f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self, f)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for DerivationPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for DerivationPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|e| D::Error::custom(format!("invalid derivation path: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(path: &str) -> Result<DerivationPath, Error> {
        path.parse()
    }

    #[test]
    fn parse_derivation_path_valid() {
        assert_eq!(parse("m"), Ok(DerivationPath(vec![])));
        assert_eq!(
            parse("m/0'"),
            Ok(vec![ChildNumber::Hardened { index: 0 }].into())
        );
        assert_eq!(
            parse("m/0'/1"),
            Ok(vec![ChildNumber::Hardened { index: 0 }, ChildNumber::Normal { index: 1 }].into())
        );
        assert_eq!(
            parse("m/44'/0'/0'/0/0"),
            Ok(vec![
                ChildNumber::Hardened { index: 44 },
                ChildNumber::Hardened { index: 0 },
                ChildNumber::Hardened { index: 0 },
                ChildNumber::Normal { index: 0 },
                ChildNumber::Normal { index: 0 },
            ]
            .into())
        );
        // The hardening marker may also be written h or H
        assert_eq!(parse("m/44h/0H"), parse("m/44'/0'"));
        // Relative paths omit the master marker
        assert_eq!(parse("0/1"), parse("m/0/1"));
    }

    #[test]
    fn parse_derivation_path_invalid() {
        assert_eq!(parse(""), Err(Error::InvalidDerivationPathFormat));
        assert_eq!(parse("m/"), Err(Error::InvalidChildNumberFormat));
        assert_eq!(parse("m/abc"), Err(Error::InvalidChildNumberFormat));
        assert_eq!(parse("n/0"), Err(Error::InvalidChildNumberFormat));
        assert_eq!(parse("m/2'3"), Err(Error::InvalidChildNumberFormat));
        assert_eq!(parse("m/4/-5"), Err(Error::InvalidChildNumberFormat));
        // Indices with the hardening bit already set are rejected, hardened
        // or not
        assert_eq!(parse("m/2147483648"), Err(Error::InvalidChildNumber(2147483648)));
        assert_eq!(parse("m/2147483648'"), Err(Error::InvalidChildNumber(2147483648)));
        assert_eq!(parse("m/2147483647"), Ok(vec![ChildNumber::Normal { index: 2147483647 }].into()));
    }

    #[test]
    fn display_roundtrip() {
        for path in ["m", "m/0'", "m/44'/0'/0'/0/0", "m/2147483647'/1"] {
            assert_eq!(parse(path).unwrap().to_string(), path);
        }
    }

    #[test]
    fn child_number_wire_format() {
        assert_eq!(u32::from(ChildNumber::Hardened { index: 44 }), 44 | (1 << 31));
        assert_eq!(u32::from(ChildNumber::Normal { index: 44 }), 44);
        assert_eq!(ChildNumber::from(0x8000002Cu32), ChildNumber::Hardened { index: 44 });
        assert_eq!(
            ChildNumber::from_hardened_idx(44).unwrap().increment().unwrap(),
            ChildNumber::Hardened { index: 45 }
        );
    }

    #[test]
    fn path_helpers() {
        let base: DerivationPath = "m/42".parse().unwrap();
        let a = base.extend("m/0/1".parse::<DerivationPath>().unwrap());
        let b = base
            .child(ChildNumber::from_normal_idx(0).unwrap())
            .into_child(ChildNumber::from_normal_idx(1).unwrap());
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
        assert!(!a.is_empty());
    }
}
