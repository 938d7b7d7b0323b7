//! Key hashing.
//!
//! Bucket placement uses the 32-bit FNV-1a hash. It is a fast
//! non-cryptographic mixing hash with good distribution over short keys,
//! and since table capacities are powers of two the bucket index is just
//! `hash & (capacity - 1)`.

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Computes the 32-bit FNV-1a hash of `bytes`.
pub(crate) fn fnv1a(bytes: &[u8]) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    for &byte in bytes {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vectors() {
        // Published FNV-1a 32-bit test vectors.
        assert_eq!(fnv1a(b""), 0x811c_9dc5);
        assert_eq!(fnv1a(b"a"), 0xe40c_292c);
        assert_eq!(fnv1a(b"foobar"), 0xbf9c_f968);
    }

    #[test]
    fn test_zero_bytes_hash() {
        // Binary-safe: embedded and trailing zero bytes must matter.
        assert_ne!(fnv1a(&[0]), fnv1a(&[]));
        assert_ne!(fnv1a(&[0, 0]), fnv1a(&[0]));
        assert_ne!(fnv1a(&[1, 0, 2]), fnv1a(&[1, 2]));
    }
}
