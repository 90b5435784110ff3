//! # Schnorr signatures over secp256k1
//!
//! The jacobi-canonicalized scheme: the signer's nonce point `R` is
//! negated until its y-coordinate is a quadratic residue, so the
//! signature transmits only `x(R)` and no parity bit. The nonce is
//! derived deterministically (`k = H(sk ‖ m) mod n`), the challenge is
//! `e = H(x(R) ‖ compressed(A) ‖ m) mod n`, and the response
//! `S = k + e·a` is computed under the same multiplicative blinding as
//! the EdDSA engine.
//!
//! Messages are fixed at the hash output size (32 bytes). Verification
//! returns `false` for every malformed input; only signing surfaces
//! typed errors.

mod field;

use k256::elliptic_curve::ff::{Field, PrimeField};
use k256::elliptic_curve::group::Group;
use k256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use k256::{AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar};
use num_bigint::BigUint;
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::hash;

/// Field element, scalar and message length in bytes.
pub const SIZE: usize = 32;

/// Signature length in bytes (`x(R) ‖ S`).
pub const SIGNATURE_LENGTH: usize = 2 * SIZE;

#[derive(Debug, Error)]
pub enum SchnorrError {
    #[error("Invalid message length.")]
    InvalidMessage,
    #[error("Invalid private key.")]
    InvalidKey,
    #[error("Signing failed (zero nonce).")]
    ZeroNonce,
}

type Result<T> = std::result::Result<T, SchnorrError>;

/// Big-endian bytes → scalar mod n.
fn scalar_mod_order(bytes: &[u8]) -> Scalar {
    let reduced = field::reduce_mod_order(bytes);
    Option::from(Scalar::from_repr(FieldBytes::from(reduced)))
        .expect("reduced scalar is canonical")
}

fn random_nonzero_scalar() -> Scalar {
    loop {
        let scalar = Scalar::random(&mut OsRng);
        if !bool::from(scalar.is_zero()) {
            return scalar;
        }
    }
}

/// `[k]G` with additive scalar splitting, fresh randomness per call.
fn mul_base_blind(k: &Scalar) -> ProjectivePoint {
    let mask = Scalar::random(&mut OsRng);
    ProjectivePoint::GENERATOR * (k + &mask) - ProjectivePoint::GENERATOR * mask
}

/// Affine coordinates as fixed-width big-endian bytes. The point must be
/// finite.
fn affine_xy(point: &ProjectivePoint) -> ([u8; 32], [u8; 32]) {
    let encoded = point.to_affine().to_encoded_point(false);
    let mut x = [0u8; 32];
    let mut y = [0u8; 32];
    x.copy_from_slice(encoded.x().expect("finite point"));
    y.copy_from_slice(encoded.y().expect("finite point"));
    (x, y)
}

/// Signs a 32-byte message digest.
pub fn sign(msg: &[u8], key: &[u8]) -> Result<[u8; SIGNATURE_LENGTH]> {
    if msg.len() != SIZE {
        return Err(SchnorrError::InvalidMessage);
    }
    if key.len() != SIZE {
        return Err(SchnorrError::InvalidKey);
    }

    let k = scalar_mod_order(&hash::sha256_multi(&[key, msg]));
    if bool::from(k.is_zero()) {
        return Err(SchnorrError::ZeroNonce);
    }

    let r_point = mul_base_blind(&k);
    let (rx, ry) = affine_xy(&r_point);
    // Canonical R: flip k when y(R) is a non-residue; x(R) is unchanged.
    let k = if field::jacobi(&BigUint::from_bytes_be(&ry)) != 1 {
        -k
    } else {
        k
    };

    let a: Scalar = Option::from(Scalar::from_repr(FieldBytes::clone_from_slice(key)))
        .ok_or(SchnorrError::InvalidKey)?;
    if bool::from(a.is_zero()) {
        return Err(SchnorrError::InvalidKey);
    }
    let a_point = mul_base_blind(&a);
    let a_bytes = a_point.to_affine().to_encoded_point(true);

    let e = scalar_mod_order(&hash::sha256_multi(&[&rx, a_bytes.as_bytes(), msg]));

    // Same masking discipline as the EdDSA engine: the blind is removed
    // by a constant-time Fermat inverse in the final step.
    let blind = random_nonzero_scalar();
    let unblind: Scalar = Option::from(blind.invert()).expect("nonzero scalar inverts");
    let s = (k * blind + e * (a * blind)) * unblind;

    let mut sig = [0u8; SIGNATURE_LENGTH];
    sig[..SIZE].copy_from_slice(&rx);
    sig[SIZE..].copy_from_slice(&s.to_repr());
    Ok(sig)
}

/// Verifies a signature; any malformed input yields `false`.
pub fn verify(msg: &[u8], sig: &[u8], key: &[u8]) -> bool {
    if msg.len() != SIZE || sig.len() != SIGNATURE_LENGTH {
        return false;
    }
    let Ok(encoded) = EncodedPoint::from_bytes(key) else {
        return false;
    };
    if encoded.is_identity() {
        return false;
    }
    let Some(a_affine): Option<AffinePoint> =
        Option::from(AffinePoint::from_encoded_point(&encoded))
    else {
        return false;
    };

    if BigUint::from_bytes_be(&sig[..SIZE]) >= *field::modulus() {
        return false;
    }
    let Some(s): Option<Scalar> =
        Option::from(Scalar::from_repr(FieldBytes::clone_from_slice(&sig[SIZE..])))
    else {
        return false;
    };

    let a_bytes = a_affine.to_encoded_point(true);
    let e = scalar_mod_order(&hash::sha256_multi(&[&sig[..SIZE], a_bytes.as_bytes(), msg]));

    // R = [S]·G − [e]·A must be finite, residue-y, and match x(R).
    let r_point = ProjectivePoint::GENERATOR * s - ProjectivePoint::from(a_affine) * e;
    if bool::from(r_point.is_identity()) {
        return false;
    }
    let (rx, ry) = affine_xy(&r_point);
    if field::jacobi(&BigUint::from_bytes_be(&ry)) != 1 {
        return false;
    }
    bool::from(rx[..].ct_eq(&sig[..SIZE]))
}

/// Batch verification via a random linear combination.
///
/// Each `R` is rebuilt from its x-coordinate by lifting to the
/// quadratic-residue y; entries past the first carry fresh random weights
/// in [1, n). Any structural problem yields `false` without identifying
/// the entry. The empty batch verifies.
pub fn batch_verify(batch: &[(&[u8], &[u8], &[u8])]) -> bool {
    let mut lhs = Scalar::ZERO;
    let mut rhs = ProjectivePoint::IDENTITY;

    for (i, (msg, sig, key)) in batch.iter().enumerate() {
        if msg.len() != SIZE || sig.len() != SIGNATURE_LENGTH {
            return false;
        }
        let Ok(encoded) = EncodedPoint::from_bytes(*key) else {
            return false;
        };
        if encoded.is_identity() {
            return false;
        }
        let Some(a_affine): Option<AffinePoint> =
            Option::from(AffinePoint::from_encoded_point(&encoded))
        else {
            return false;
        };
        let Some(s): Option<Scalar> =
            Option::from(Scalar::from_repr(FieldBytes::clone_from_slice(&sig[SIZE..])))
        else {
            return false;
        };

        let rx = BigUint::from_bytes_be(&sig[..SIZE]);
        let Some(ry) = field::lift_x(&rx) else {
            return false;
        };
        let r_encoded = EncodedPoint::from_affine_coordinates(
            &FieldBytes::clone_from_slice(&sig[..SIZE]),
            &FieldBytes::from(field::to_field_bytes(&ry)),
            false,
        );
        let Some(r_affine): Option<AffinePoint> =
            Option::from(AffinePoint::from_encoded_point(&r_encoded))
        else {
            return false;
        };

        let a_bytes = a_affine.to_encoded_point(true);
        let e = scalar_mod_order(&hash::sha256_multi(&[&sig[..SIZE], a_bytes.as_bytes(), msg]));

        if i == 0 {
            lhs = s;
            rhs = ProjectivePoint::from(r_affine) + ProjectivePoint::from(a_affine) * e;
        } else {
            let weight = random_nonzero_scalar();
            lhs += weight * s;
            rhs += ProjectivePoint::from(r_affine) * weight
                + ProjectivePoint::from(a_affine) * (weight * e);
        }
    }

    ProjectivePoint::GENERATOR * lhs == rhs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keypair() -> ([u8; 32], Vec<u8>) {
        let key = random_nonzero_scalar();
        let public = (ProjectivePoint::GENERATOR * key)
            .to_affine()
            .to_encoded_point(true);
        (key.to_repr().into(), public.as_bytes().to_vec())
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let (key, public) = keypair();
        let msg = [0x5a; 32];
        let sig = sign(&msg, &key).unwrap();
        assert!(verify(&msg, &sig, &public));
        assert!(!verify(&[0x5b; 32], &sig, &public));
    }

    #[test]
    fn test_rejects_bad_lengths() {
        let (key, public) = keypair();
        assert!(sign(&[0u8; 31], &key).is_err());
        assert!(sign(&[0u8; 32], &key[..31]).is_err());
        let sig = sign(&[0u8; 32], &key).unwrap();
        assert!(!verify(&[0u8; 31], &sig, &public));
        assert!(!verify(&[0u8; 32], &sig[..63], &public));
    }

    #[test]
    fn test_zero_key_rejected() {
        assert!(matches!(
            sign(&[0u8; 32], &[0u8; 32]),
            Err(SchnorrError::InvalidKey)
        ));
    }

    #[test]
    fn test_batch_verify_empty_is_true() {
        assert!(batch_verify(&[]));
    }

    #[test]
    fn test_batch_matches_single() {
        let (key, public) = keypair();
        let msg = [0x11; 32];
        let sig = sign(&msg, &key).unwrap();
        assert!(batch_verify(&[(&msg, &sig, &public)]));

        let mut bad = sig;
        bad[40] ^= 1;
        assert_eq!(
            batch_verify(&[(&msg, &bad, &public)]),
            verify(&msg, &bad, &public)
        );
    }
}
