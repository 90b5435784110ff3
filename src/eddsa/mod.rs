//! # Ed25519 signatures and X25519 key agreement
//!
//! EdDSA key lifecycle, signing with scalar blinding, verification with
//! cofactor clearing, batch verification with random linear combinations,
//! scalar/public-key tweak algebra, Edwards↔Montgomery key conversion and
//! both forms of Diffie-Hellman (`derive` on the Edwards curve, `exchange`
//! on the Montgomery ladder).
//!
//! All byte-level inputs are validated; `verify` and `batch_verify` fold
//! every failure into `false` instead of reporting a cause. Signing never
//! multiplies the base point by an unmasked secret scalar: base-point
//! multiplications use additive splitting and the final signature scalar
//! is computed through a multiplicative blind that is removed with a
//! Fermat inverse (constant-time exponentiation, never EGCD).
//!
//! The pre-hash flag and context string follow RFC 8032: `ph` is `None`
//! for plain Ed25519, `Some(true)` for Ed25519ph, `Some(false)` for
//! Ed25519ctx. Passing a context without a pre-hash flag is a caller bug
//! and asserts.

mod curve;
mod encoding;

pub use encoding::{
    private_key_export, private_key_export_jwk, private_key_export_pkcs8, private_key_import,
    private_key_import_jwk, private_key_import_pkcs8, public_key_export, public_key_export_jwk,
    public_key_export_spki, public_key_import, public_key_import_jwk, public_key_import_spki, Jwk,
};

use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::Identity;
use sha2::{Digest, Sha512};
use subtle::ConstantTimeEq;
use thiserror::Error;
use x25519_dalek::x25519;
use zeroize::Zeroizing;

use crate::hash;
use crate::rng;

/// Secret seed, public key and field element length in bytes.
pub const SIZE: usize = curve::SIZE;

/// Scalar length in bytes.
pub const SCALAR_LENGTH: usize = curve::SCALAR_LENGTH;

/// Signature length in bytes (`R ‖ S`).
pub const SIGNATURE_LENGTH: usize = 2 * curve::SIZE;

#[derive(Debug, Error)]
pub enum EddsaError {
    #[error("Invalid secret key.")]
    InvalidSecret,
    #[error("Invalid scalar.")]
    InvalidScalar,
    #[error("Invalid point.")]
    InvalidPoint,
    #[error("Invalid nonce.")]
    InvalidNonce,
    #[error("Invalid key encoding: {0}")]
    Encoding(#[from] der::Error),
    #[error("Algorithm mismatch.")]
    AlgorithmMismatch,
    #[error("Invalid JWK.")]
    InvalidJwk,
}

type Result<T> = std::result::Result<T, EddsaError>;

/// Hash-to-scalar with RFC 8032 domain separation.
///
/// The 64-byte digest is decoded little-endian and reduced mod the group
/// order.
fn hash_int(ph: Option<bool>, ctx: Option<&[u8]>, items: &[&[u8]]) -> Scalar {
    assert!(
        ctx.is_none() || ph.is_some(),
        "Must pass pre-hash flag with context."
    );

    let mut hasher = Sha512::new();
    if curve::CONTEXT || ph.is_some() {
        let ctx = ctx.unwrap_or(&[]);
        assert!(ctx.len() <= 255, "Invalid context length.");
        hasher.update(curve::PREFIX);
        hasher.update([ph.unwrap_or(false) as u8]);
        hasher.update([ctx.len() as u8]);
        hasher.update(ctx);
    }
    for item in items {
        hasher.update(item);
    }
    let wide: [u8; 64] = hasher.finalize().into();
    Scalar::from_bytes_mod_order_wide(&wide)
}

/// Expands a seed into the clamped signing scalar and the nonce prefix.
fn expand_secret(secret: &[u8]) -> Result<(Zeroizing<[u8; 32]>, Zeroizing<[u8; 32]>)> {
    if secret.len() != SIZE {
        return Err(EddsaError::InvalidSecret);
    }
    let expanded = Zeroizing::new(hash::sha512(secret));
    let (scalar, prefix) = curve::split_hash(&expanded);
    Ok((Zeroizing::new(scalar), Zeroizing::new(prefix)))
}

fn decode_scalar(bytes: &[u8]) -> Result<Scalar> {
    curve::decode_scalar(bytes).ok_or(EddsaError::InvalidScalar)
}

fn decode_point(bytes: &[u8]) -> Result<EdwardsPoint> {
    curve::decode_point(bytes).ok_or(EddsaError::InvalidPoint)
}

fn points_equal(a: &EdwardsPoint, b: &EdwardsPoint) -> bool {
    let a = a.compress();
    let b = b.compress();
    bool::from(a.as_bytes().ct_eq(b.as_bytes()))
}

// --- key lifecycle ---

/// Generates a random secret seed.
pub fn private_key_generate() -> [u8; SIZE] {
    rng::random_array()
}

/// Generates a random clamped scalar.
pub fn scalar_generate() -> [u8; SCALAR_LENGTH] {
    curve::clamp(rng::random_array())
}

/// Seed → clamped signing scalar (the left half of the seed hash).
pub fn private_key_convert(secret: &[u8]) -> Result<[u8; SCALAR_LENGTH]> {
    let (scalar, _) = expand_secret(secret)?;
    Ok(*scalar)
}

pub fn private_key_verify(secret: &[u8]) -> bool {
    secret.len() == SIZE
}

pub fn scalar_verify(scalar: &[u8]) -> bool {
    scalar.len() == SCALAR_LENGTH
}

pub fn scalar_is_clamped(scalar: &[u8]) -> bool {
    curve::is_clamped(scalar)
}

/// Applies RFC 7748 clamping.
pub fn scalar_clamp(scalar: &[u8]) -> Result<[u8; SCALAR_LENGTH]> {
    let bytes: [u8; SCALAR_LENGTH] = scalar.try_into().map_err(|_| EddsaError::InvalidScalar)?;
    if curve::is_clamped(&bytes) {
        return Ok(bytes);
    }
    Ok(curve::clamp(bytes))
}

// --- scalar algebra (all mod the group order) ---

/// `(a + t) mod n`; the result must be nonzero.
pub fn scalar_tweak_add(scalar: &[u8], tweak: &[u8]) -> Result<[u8; SCALAR_LENGTH]> {
    let sum = decode_scalar(scalar)? + decode_scalar(tweak)?;
    if sum == Scalar::ZERO {
        return Err(EddsaError::InvalidScalar);
    }
    Ok(curve::encode_scalar(&sum))
}

/// `(a · t) mod n`; the result must be nonzero.
pub fn scalar_tweak_mul(scalar: &[u8], tweak: &[u8]) -> Result<[u8; SCALAR_LENGTH]> {
    let product = decode_scalar(scalar)? * decode_scalar(tweak)?;
    if product == Scalar::ZERO {
        return Err(EddsaError::InvalidScalar);
    }
    Ok(curve::encode_scalar(&product))
}

pub fn scalar_negate(scalar: &[u8]) -> Result<[u8; SCALAR_LENGTH]> {
    let a = decode_scalar(scalar)?;
    Ok(curve::encode_scalar(&-a))
}

/// `a⁻¹ mod n`, by constant-time exponentiation.
pub fn scalar_inverse(scalar: &[u8]) -> Result<[u8; SCALAR_LENGTH]> {
    let a = decode_scalar(scalar)?;
    if a == Scalar::ZERO {
        return Err(EddsaError::InvalidScalar);
    }
    Ok(curve::encode_scalar(&a.invert()))
}

// --- public keys ---

/// `[a mod n]·G`, blinded.
pub fn public_key_from_scalar(scalar: &[u8]) -> Result<[u8; SIZE]> {
    let a = decode_scalar(scalar)?;
    Ok(curve::encode_point(&curve::mul_blind_base(&a)))
}

pub fn public_key_create(secret: &[u8]) -> Result<[u8; SIZE]> {
    let (scalar, _) = expand_secret(secret)?;
    public_key_from_scalar(&*scalar)
}

/// Edwards → Montgomery (birational map; drops the y sign).
pub fn public_key_convert(key: &[u8]) -> Result<[u8; SIZE]> {
    let point = decode_point(key)?;
    Ok(curve::point_to_mont(&point).to_bytes())
}

/// Montgomery → Edwards; `sign` restores the y sign bit.
pub fn public_key_deconvert(key: &[u8], sign: bool) -> Result<[u8; SIZE]> {
    let point = curve::point_from_mont(key, sign).ok_or(EddsaError::InvalidPoint)?;
    Ok(curve::encode_point(&point))
}

pub fn public_key_verify(key: &[u8]) -> bool {
    curve::decode_point(key).is_some()
}

/// `[t]·G + K`.
pub fn public_key_tweak_add(key: &[u8], tweak: &[u8]) -> Result<[u8; SIZE]> {
    let point = decode_point(key)?;
    let t = decode_scalar(tweak)?;
    Ok(curve::encode_point(&(curve::mul_base(&t) + point)))
}

/// `[t]·K`.
pub fn public_key_tweak_mul(key: &[u8], tweak: &[u8]) -> Result<[u8; SIZE]> {
    let point = decode_point(key)?;
    let t = decode_scalar(tweak)?;
    Ok(curve::encode_point(&(point * t)))
}

pub fn public_key_add(key1: &[u8], key2: &[u8]) -> Result<[u8; SIZE]> {
    let a = decode_point(key1)?;
    let b = decode_point(key2)?;
    Ok(curve::encode_point(&(a + b)))
}

pub fn public_key_negate(key: &[u8]) -> Result<[u8; SIZE]> {
    let point = decode_point(key)?;
    Ok(curve::encode_point(&-point))
}

// --- signing ---

/// Signs with an explicit scalar and nonce prefix.
///
/// `R = [H(nonce ‖ msg)]·G`, `S = r + H(R ‖ A ‖ msg)·a`, with every base
/// multiplication blinded and the S computation masked by a random
/// multiplicative blind.
pub fn sign_with_scalar(
    msg: &[u8],
    scalar: &[u8],
    nonce: &[u8],
    ph: Option<bool>,
    ctx: Option<&[u8]>,
) -> Result<[u8; SIGNATURE_LENGTH]> {
    if nonce.len() != SIZE {
        return Err(EddsaError::InvalidNonce);
    }
    let a = decode_scalar(scalar)?;
    let a_bytes = curve::encode_point(&curve::mul_blind_base(&a));

    let r = hash_int(ph, ctx, &[nonce, msg]);
    let r_bytes = curve::encode_point(&curve::mul_blind_base(&r));

    let h = hash_int(ph, ctx, &[&r_bytes, &a_bytes, msg]);

    // Multiplicative masking: both products run on blinded operands and
    // only the last step removes the blind.
    let blind = curve::random_nonzero_scalar();
    let unblind = blind.invert();
    let s = (r * blind + h * (a * blind)) * unblind;

    let mut sig = [0u8; SIGNATURE_LENGTH];
    sig[..SIZE].copy_from_slice(&r_bytes);
    sig[SIZE..].copy_from_slice(&curve::encode_scalar(&s));
    Ok(sig)
}

/// Signs `msg` with a secret seed.
pub fn sign(
    msg: &[u8],
    secret: &[u8],
    ph: Option<bool>,
    ctx: Option<&[u8]>,
) -> Result<[u8; SIGNATURE_LENGTH]> {
    let (scalar, prefix) = expand_secret(secret)?;
    sign_with_scalar(msg, &*scalar, &*prefix, ph, ctx)
}

/// Signs under the additively tweaked key `a + t`.
pub fn sign_tweak_add(
    msg: &[u8],
    secret: &[u8],
    tweak: &[u8],
    ph: Option<bool>,
    ctx: Option<&[u8]>,
) -> Result<[u8; SIGNATURE_LENGTH]> {
    let (scalar, prefix) = expand_secret(secret)?;
    let tweaked = Zeroizing::new(scalar_tweak_add(&*scalar, tweak)?);
    let nonce = Zeroizing::new(hash::sha512_multi(&*prefix, tweak, None));
    sign_with_scalar(msg, &*tweaked, &nonce[..SIZE], ph, ctx)
}

/// Signs under the multiplicatively tweaked key `a · t`.
pub fn sign_tweak_mul(
    msg: &[u8],
    secret: &[u8],
    tweak: &[u8],
    ph: Option<bool>,
    ctx: Option<&[u8]>,
) -> Result<[u8; SIGNATURE_LENGTH]> {
    let (scalar, prefix) = expand_secret(secret)?;
    let tweaked = Zeroizing::new(scalar_tweak_mul(&*scalar, tweak)?);
    let nonce = Zeroizing::new(hash::sha512_multi(&*prefix, tweak, None));
    sign_with_scalar(msg, &*tweaked, &nonce[..SIZE], ph, ctx)
}

// --- verification ---

/// Verifies a signature; any malformed input yields `false`.
///
/// Accepts iff `[8][S]·G == [8](R + [H(R ‖ A ‖ msg)]·A)`; both sides of
/// the equation are multiplied by the cofactor to clear any small-order
/// component, per RFC 8032.
pub fn verify(msg: &[u8], sig: &[u8], key: &[u8], ph: Option<bool>, ctx: Option<&[u8]>) -> bool {
    assert!(
        ctx.is_none() || ph.is_some(),
        "Must pass pre-hash flag with context."
    );
    if sig.len() != SIGNATURE_LENGTH || key.len() != SIZE {
        return false;
    }
    let Some(r_point) = curve::decode_point(&sig[..SIZE]) else {
        return false;
    };
    let Some(s) = curve::decode_int(&sig[SIZE..]) else {
        return false;
    };
    let Some(a_point) = curve::decode_point(key) else {
        return false;
    };

    let h = hash_int(ph, ctx, &[&sig[..SIZE], key, msg]);
    let lhs = curve::mul_base(&s);
    let rhs = r_point + a_point * h;
    points_equal(
        &curve::clear_cofactor(&lhs),
        &curve::clear_cofactor(&rhs),
    )
}

/// Batch verification via a random linear combination.
///
/// Each entry past the first is weighted by a fresh scalar in [1, n); a
/// single group equation `[Σ wᵢSᵢ]·G == Σ wᵢ(Rᵢ + [eᵢ]·Aᵢ)` then decides
/// the whole batch. Any structural problem in any entry yields `false`
/// without identifying the entry. The empty batch verifies.
pub fn batch_verify(batch: &[(&[u8], &[u8], &[u8])], ph: Option<bool>, ctx: Option<&[u8]>) -> bool {
    assert!(
        ctx.is_none() || ph.is_some(),
        "Must pass pre-hash flag with context."
    );

    let mut lhs = Scalar::ZERO;
    let mut rhs = EdwardsPoint::identity();

    for (i, (msg, sig, key)) in batch.iter().enumerate() {
        if sig.len() != SIGNATURE_LENGTH || key.len() != SIZE {
            return false;
        }
        let Some(r_point) = curve::decode_point(&sig[..SIZE]) else {
            return false;
        };
        let Some(s) = curve::decode_int(&sig[SIZE..]) else {
            return false;
        };
        let Some(a_point) = curve::decode_point(key) else {
            return false;
        };
        let e = hash_int(ph, ctx, &[&sig[..SIZE], key, msg]);

        if i == 0 {
            lhs = s;
            rhs = r_point + a_point * e;
        } else {
            let weight = curve::random_nonzero_scalar();
            lhs += weight * s;
            rhs += curve::mul_add(&weight, &r_point, &(weight * e), &a_point);
        }
    }

    points_equal(&curve::mul_base(&lhs), &rhs)
}

// --- key agreement ---

/// Edwards-form ECDH: `[a mod n]·P`, blinded.
pub fn derive_with_scalar(key: &[u8], scalar: &[u8]) -> Result<[u8; SIZE]> {
    let point = decode_point(key)?;
    let a = decode_scalar(scalar)?;
    let shared = curve::mul_blind(&point, &a);
    if shared == EdwardsPoint::identity() {
        return Err(EddsaError::InvalidPoint);
    }
    Ok(curve::encode_point(&shared))
}

pub fn derive(key: &[u8], secret: &[u8]) -> Result<[u8; SIZE]> {
    let (scalar, _) = expand_secret(secret)?;
    derive_with_scalar(key, &*scalar)
}

/// Montgomery-form ECDH (the X25519 ladder; constant-time by construction,
/// no extra blinding).
pub fn exchange_with_scalar(key: &[u8], scalar: &[u8]) -> Result<[u8; SIZE]> {
    let u: [u8; SIZE] = key.try_into().map_err(|_| EddsaError::InvalidPoint)?;
    let k: [u8; SCALAR_LENGTH] = scalar.try_into().map_err(|_| EddsaError::InvalidScalar)?;
    let shared = x25519(k, u);
    if bool::from(shared[..].ct_eq(&[0u8; SIZE][..])) {
        return Err(EddsaError::InvalidPoint);
    }
    Ok(shared)
}

pub fn exchange(key: &[u8], secret: &[u8]) -> Result<[u8; SIZE]> {
    let (scalar, _) = expand_secret(secret)?;
    exchange_with_scalar(key, &*scalar)
}
