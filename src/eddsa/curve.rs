//! Ed25519 curve facade.
//!
//! Everything curve-specific the signature engine consumes lives here:
//! constants, point/scalar codecs, clamping, seed-hash splitting, blinded
//! multiplication, the fused double-scalar multiplication used by batch
//! verification, cofactor clearing, and Edwards/Montgomery conversion.
//! The engine in `super` never touches dalek types except through this
//! module's vocabulary.

use curve25519_dalek::constants::ED25519_BASEPOINT_TABLE;
use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::montgomery::MontgomeryPoint;
use curve25519_dalek::scalar::{clamp_integer, Scalar};
use curve25519_dalek::traits::VartimeMultiscalarMul;
use rand::rngs::OsRng;

/// Field element / encoded point length in bytes.
pub const SIZE: usize = 32;

/// Scalar encoding length in bytes.
pub const SCALAR_LENGTH: usize = 32;

/// Base-2 logarithm of the cofactor (the cofactor itself is 8).
pub const COFACTOR_LOG: u32 = 3;

/// RFC 8032 domain-separation prefix, used by the pre-hashed and
/// context variants.
pub const PREFIX: &[u8; 32] = b"SigEd25519 no Ed25519 collisions";

/// Whether the domain prefix is mandatory on every hash invocation
/// (true for Ed448, false here).
pub const CONTEXT: bool = false;

pub fn decode_point(bytes: &[u8]) -> Option<EdwardsPoint> {
    let bytes: [u8; SIZE] = bytes.try_into().ok()?;
    CompressedEdwardsY(bytes).decompress()
}

pub fn encode_point(point: &EdwardsPoint) -> [u8; SIZE] {
    point.compress().to_bytes()
}

/// Decodes a little-endian scalar, reducing it mod the group order.
pub fn decode_scalar(bytes: &[u8]) -> Option<Scalar> {
    let bytes: [u8; SCALAR_LENGTH] = bytes.try_into().ok()?;
    Some(Scalar::from_bytes_mod_order(bytes))
}

/// Canonical decoding: rejects encodings of values ≥ the group order.
pub fn decode_int(bytes: &[u8]) -> Option<Scalar> {
    let bytes: [u8; SCALAR_LENGTH] = bytes.try_into().ok()?;
    Option::from(Scalar::from_canonical_bytes(bytes))
}

pub fn encode_scalar(scalar: &Scalar) -> [u8; SCALAR_LENGTH] {
    scalar.to_bytes()
}

/// RFC 7748 bit clamping.
pub fn clamp(bytes: [u8; SCALAR_LENGTH]) -> [u8; SCALAR_LENGTH] {
    clamp_integer(bytes)
}

pub fn is_clamped(bytes: &[u8]) -> bool {
    bytes.len() == SCALAR_LENGTH
        && bytes[0] & 0b0000_0111 == 0
        && bytes[31] & 0b1000_0000 == 0
        && bytes[31] & 0b0100_0000 != 0
}

/// Splits a 64-byte seed hash into the clamped signing scalar and the
/// deterministic-nonce prefix.
pub fn split_hash(hash: &[u8; 2 * SIZE]) -> ([u8; SCALAR_LENGTH], [u8; SIZE]) {
    let mut scalar = [0u8; SCALAR_LENGTH];
    scalar.copy_from_slice(&hash[..SIZE]);
    let mut prefix = [0u8; SIZE];
    prefix.copy_from_slice(&hash[SIZE..]);
    (clamp_integer(scalar), prefix)
}

pub fn mul_base(k: &Scalar) -> EdwardsPoint {
    k * ED25519_BASEPOINT_TABLE
}

/// `[k]G` with additive scalar splitting; the mask is a fresh draw per call.
pub fn mul_blind_base(k: &Scalar) -> EdwardsPoint {
    let mask = Scalar::random(&mut OsRng);
    let masked = k + mask;
    &masked * ED25519_BASEPOINT_TABLE - &mask * ED25519_BASEPOINT_TABLE
}

/// `[k]P` with additive scalar splitting.
pub fn mul_blind(point: &EdwardsPoint, k: &Scalar) -> EdwardsPoint {
    let mask = Scalar::random(&mut OsRng);
    let masked = k + mask;
    point * masked - point * mask
}

/// Fused `[s1]·P1 + [s2]·P2` (shared double-and-add).
pub fn mul_add(s1: &Scalar, p1: &EdwardsPoint, s2: &Scalar, p2: &EdwardsPoint) -> EdwardsPoint {
    EdwardsPoint::vartime_multiscalar_mul([s1, s2], [p1, p2])
}

/// Multiplies by the cofactor by doubling `COFACTOR_LOG` times.
pub fn clear_cofactor(point: &EdwardsPoint) -> EdwardsPoint {
    let mut acc = *point;
    for _ in 0..COFACTOR_LOG {
        acc = acc + acc;
    }
    acc
}

pub fn point_to_mont(point: &EdwardsPoint) -> MontgomeryPoint {
    point.to_montgomery()
}

/// Montgomery u-coordinate → Edwards point; `sign` picks the y sign.
pub fn point_from_mont(bytes: &[u8], sign: bool) -> Option<EdwardsPoint> {
    let bytes: [u8; SIZE] = bytes.try_into().ok()?;
    MontgomeryPoint(bytes).to_edwards(sign as u8)
}

/// A uniformly random scalar in [1, n).
pub fn random_nonzero_scalar() -> Scalar {
    loop {
        let scalar = Scalar::random(&mut OsRng);
        if scalar != Scalar::ZERO {
            return scalar;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_predicate() {
        let clamped = clamp([0xff; 32]);
        assert!(is_clamped(&clamped));
        assert!(!is_clamped(&[0xff; 32]));
        assert!(!is_clamped(&[0u8; 32]));
        assert!(!is_clamped(&clamped[..31]));
    }

    #[test]
    fn test_blinded_mul_matches_plain() {
        let k = Scalar::from_bytes_mod_order([7u8; 32]);
        let plain = mul_base(&k);
        assert_eq!(mul_blind_base(&k), plain);
        assert_eq!(mul_blind(&plain, &k), &plain * k);
    }

    #[test]
    fn test_mul_add_matches_separate() {
        let s1 = Scalar::from_bytes_mod_order([3u8; 32]);
        let s2 = Scalar::from_bytes_mod_order([5u8; 32]);
        let p1 = mul_base(&s2);
        let p2 = mul_base(&s1);
        assert_eq!(mul_add(&s1, &p1, &s2, &p2), p1 * s1 + p2 * s2);
    }

    #[test]
    fn test_decode_int_rejects_noncanonical() {
        // The group order itself is the smallest non-canonical encoding.
        let order = [
            0xed, 0xd3, 0xf5, 0x5c, 0x1a, 0x63, 0x12, 0x58, 0xd6, 0x9c, 0xf7, 0xa2, 0xde, 0xf9,
            0xde, 0x14, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x10,
        ];
        assert!(decode_int(&order).is_none());
        let mut below = order;
        below[0] -= 1;
        assert!(decode_int(&below).is_some());
    }
}
