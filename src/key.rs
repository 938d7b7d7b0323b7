//! Binary-safe keys.

use bytes::Bytes;
use std::cmp::Ordering;
use std::fmt;

/// An immutable, binary-safe key.
///
/// Keys own their bytes: construction copies the caller's slice, so the
/// index never aliases caller memory. Any byte value is legal, including
/// zero, and the empty key is a valid key.
///
/// # Ordering
///
/// Keys of unequal length order by length; equal-length keys compare
/// lexicographically by byte value. Two keys are equal iff they have the
/// same length and the same bytes. Callers in this crate only rely on
/// the equality signal.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BinaryKey {
    bytes: Bytes,
}

impl BinaryKey {
    /// Creates a key by copying `bytes` into owned storage.
    pub fn copy_from(bytes: &[u8]) -> Self {
        Self { bytes: Bytes::copy_from_slice(bytes) }
    }

    /// Returns the key bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the key length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` for the empty key.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Ord for BinaryKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.len().cmp(&other.len()).then_with(|| self.bytes.cmp(&other.bytes))
    }
}

impl PartialOrd for BinaryKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for BinaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BinaryKey(\"{}\")", self.bytes.escape_ascii())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_copies_bytes() {
        let mut buf = vec![1u8, 2, 3];
        let key = BinaryKey::copy_from(&buf);
        buf[0] = 9;
        assert_eq!(key.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_empty_key_is_legal() {
        let key = BinaryKey::copy_from(b"");
        assert!(key.is_empty());
        assert_eq!(key.len(), 0);
        assert_eq!(key, BinaryKey::copy_from(b""));
    }

    #[test]
    fn test_binary_safe() {
        let key = BinaryKey::copy_from(&[0, 255, 0, 7]);
        assert_eq!(key.len(), 4);
        assert_eq!(key.as_slice(), &[0, 255, 0, 7]);
        assert_ne!(key, BinaryKey::copy_from(&[0, 255, 0]));
    }

    #[test]
    fn test_equality_is_bytewise() {
        assert_eq!(BinaryKey::copy_from(b"abc"), BinaryKey::copy_from(b"abc"));
        assert_ne!(BinaryKey::copy_from(b"abc"), BinaryKey::copy_from(b"abd"));
        assert_ne!(BinaryKey::copy_from(b"abc"), BinaryKey::copy_from(b"ab"));
    }

    #[test]
    fn test_shorter_keys_order_first() {
        // Length dominates the ordering; "b" is shorter than "ab".
        let ab = BinaryKey::copy_from(b"ab");
        let b = BinaryKey::copy_from(b"b");
        assert_eq!(ab.cmp(&b), Ordering::Greater);

        // Equal length falls back to lexicographic comparison.
        let aa = BinaryKey::copy_from(b"aa");
        assert_eq!(aa.cmp(&ab), Ordering::Less);
        assert_eq!(ab.cmp(&ab.clone()), Ordering::Equal);
    }
}
