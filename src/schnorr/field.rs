//! secp256k1 base-field helpers.
//!
//! The group arithmetic comes from k256, whose public API keeps base-field
//! elements opaque; residuosity tests and the square root needed to lift
//! x-coordinates therefore run over big integers. The field prime is
//! ≡ 3 (mod 4), so both reduce to single modular exponentiations.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use std::sync::OnceLock;

/// The secp256k1 field prime p.
pub fn modulus() -> &'static BigUint {
    static P: OnceLock<BigUint> = OnceLock::new();
    P.get_or_init(|| {
        BigUint::parse_bytes(
            b"fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2f",
            16,
        )
        .expect("constant parses")
    })
}

/// The secp256k1 group order n.
pub fn order() -> &'static BigUint {
    static N: OnceLock<BigUint> = OnceLock::new();
    N.get_or_init(|| {
        BigUint::parse_bytes(
            b"fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141",
            16,
        )
        .expect("constant parses")
    })
}

/// Jacobi symbol of `a` mod p, by Euler's criterion.
pub fn jacobi(a: &BigUint) -> i32 {
    let p = modulus();
    let r = a.modpow(&((p - 1u32) >> 1u32), p);
    if r.is_zero() {
        0
    } else if r.is_one() {
        1
    } else {
        -1
    }
}

/// Lifts an x-coordinate to the y with `jacobi(y) == 1`.
///
/// `y = (x³ + 7)^((p+1)/4)` is that root whenever one exists: squaring a
/// residue root reproduces it exactly. Returns None off the curve.
pub fn lift_x(x: &BigUint) -> Option<BigUint> {
    let p = modulus();
    if x >= p {
        return None;
    }
    let t = (x.pow(3u32) + 7u32) % p;
    let y = t.modpow(&((p + 1u32) >> 2u32), p);
    if (&y * &y) % p != t {
        return None;
    }
    Some(y)
}

/// Fixed-width big-endian encoding of a reduced field element or scalar.
pub fn to_field_bytes(v: &BigUint) -> [u8; 32] {
    let bytes = v.to_bytes_be();
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    out
}

/// Big-endian bytes reduced mod the group order.
pub fn reduce_mod_order(bytes: &[u8]) -> [u8; 32] {
    to_field_bytes(&(BigUint::from_bytes_be(bytes) % order()))
}
