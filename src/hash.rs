//! One-shot hashing conveniences shared by the signature engines.
//!
//! Contexts are constructed fresh per call; nothing here is stateful.

use sha2::{Digest, Sha256, Sha512};

/// SHA-512 of a single input.
pub fn sha512(data: &[u8]) -> [u8; 64] {
    let mut hasher = Sha512::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-512 over up to three inputs fed in order; absent parts are skipped.
pub fn sha512_multi(a: &[u8], b: &[u8], c: Option<&[u8]>) -> [u8; 64] {
    let mut hasher = Sha512::new();
    hasher.update(a);
    hasher.update(b);
    if let Some(c) = c {
        hasher.update(c);
    }
    hasher.finalize().into()
}

/// SHA-256 over a list of parts fed in order.
pub fn sha256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_matches_concatenation() {
        let joined = sha512(b"abcdef");
        assert_eq!(sha512_multi(b"ab", b"cdef", None), joined);
        assert_eq!(sha512_multi(b"ab", b"cd", Some(b"ef")), joined);
    }

    #[test]
    fn test_sha256_multi_matches_concatenation() {
        let mut hasher = Sha256::new();
        hasher.update(b"xyz");
        let expected: [u8; 32] = hasher.finalize().into();
        assert_eq!(sha256_multi(&[b"x", b"y", b"z"]), expected);
    }
}
