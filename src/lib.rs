//! # cryptbox
//!
//! Cryptographic core: Edwards-curve digital signatures (Ed25519/X25519),
//! BIP-340-style Schnorr signatures over secp256k1, and a streaming
//! block-cipher mode framework (ECB/CBC/CTR/CFB/OFB).
//!
//! The heavy primitives (curve arithmetic, hashing, AES) come from the
//! usual ecosystem crates; this crate owns the protocol layer on top of
//! them: key lifecycles, blinded signing, cofactor-cleared and batch
//! verification, key conversion and agreement, PKCS#8/SPKI/JWK encodings,
//! and the block-aligned update/finalize pipeline shared by the cipher
//! modes.

pub mod cipher;
pub mod eddsa;
pub mod hash;
pub mod rng;
pub mod schnorr;
