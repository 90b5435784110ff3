//! CSPRNG access.
//!
//! Every blinding factor, batch weight and generated key draws fresh OS
//! randomness. Randomness failure is not a recoverable condition for any
//! caller in this crate, so draws panic instead of returning errors.

use rand::rngs::OsRng;
use rand::RngCore;

/// Fills a fixed-size array with OS randomness.
pub fn random_array<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Returns `n` bytes of OS randomness.
pub fn random_bytes(n: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; n];
    OsRng.fill_bytes(&mut bytes);
    bytes
}
