//! # Streaming block-cipher modes
//!
//! A [`CipherStream`] owns a block-cipher context and a mode kernel and
//! drives the block-aligned update/finalize protocol shared by all five
//! modes. The padded modes (ECB, CBC) apply PKCS#7 on encrypt and
//! validate it on decrypt, which requires holding the trailing
//! ciphertext block back until `finalize()`. The stream-like modes (CTR,
//! CFB, OFB) emit exactly as many bytes as they consume, finishing with a
//! partial keystream block.
//!
//! Lifecycle: `init(key, iv)` → any number of `update` calls → exactly one
//! `finalize()`, which destroys the key schedule and zeroizes the buffer.
//! A finalized stream can be re-initialized.

pub mod aes;
pub mod modes;

pub use self::aes::{Aes128Cipher, Aes192Cipher, Aes256Cipher, AesCipher};
pub use self::modes::{Cbc, Cfb, Ctr, Ecb, Ofb};

use thiserror::Error;
use zeroize::Zeroize;

#[derive(Debug, Error)]
pub enum CipherError {
    #[error("Cipher not initialized.")]
    NotInitialized,
    #[error("Invalid key length.")]
    InvalidKey,
    #[error("Invalid IV length.")]
    InvalidIv,
    #[error("Bad decrypt.")]
    BadDecrypt,
    #[error("Unknown mode: {0}.")]
    UnknownMode(String),
}

type Result<T> = std::result::Result<T, CipherError>;

/// Single-block cipher contract consumed by the mode framework.
pub trait BlockCipher {
    /// Block length in bytes.
    fn block_size(&self) -> usize;
    /// (Re)computes the key schedule.
    fn init(&mut self, key: &[u8]) -> Result<()>;
    /// Encrypts exactly one block.
    fn encrypt(&self, input: &[u8], output: &mut [u8]) -> Result<()>;
    /// Decrypts exactly one block.
    fn decrypt(&self, input: &[u8], output: &mut [u8]) -> Result<()>;
    /// Drops the key schedule.
    fn destroy(&mut self);
}

/// Mode kernel hooks.
pub trait ModeOps {
    /// True for the PKCS#7-padded modes (ECB, CBC).
    fn padded(&self) -> bool;
    /// Validates the IV and resets per-mode state.
    fn start(&mut self, iv: &[u8], block_size: usize) -> Result<()>;
    /// Transforms one chunk: exactly one block for padded modes, up to
    /// one block for stream-like modes.
    fn process(&mut self, ctx: &dyn BlockCipher, input: &[u8], output: &mut [u8]) -> Result<()>;
}

/// Streaming cipher: shared buffering plus a mode kernel.
pub struct CipherStream {
    ctx: Box<dyn BlockCipher>,
    mode: Box<dyn ModeOps>,
    encrypt: bool,
    buf: Vec<u8>,
    bpos: Option<usize>,
    last: Vec<u8>,
}

impl std::fmt::Debug for CipherStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherStream")
            .field("encrypt", &self.encrypt)
            .field("bpos", &self.bpos)
            .finish_non_exhaustive()
    }
}

impl CipherStream {
    pub fn new(ctx: Box<dyn BlockCipher>, mode: Box<dyn ModeOps>, encrypt: bool) -> Self {
        let block_size = ctx.block_size();
        Self {
            ctx,
            mode,
            encrypt,
            buf: vec![0u8; block_size],
            bpos: None,
            last: Vec::new(),
        }
    }

    pub fn ecb(ctx: Box<dyn BlockCipher>, encrypt: bool) -> Self {
        Self::new(ctx, Box::new(Ecb::new(encrypt)), encrypt)
    }

    pub fn cbc(ctx: Box<dyn BlockCipher>, encrypt: bool) -> Self {
        Self::new(ctx, Box::new(Cbc::new(encrypt)), encrypt)
    }

    pub fn ctr(ctx: Box<dyn BlockCipher>, encrypt: bool) -> Self {
        Self::new(ctx, Box::new(Ctr::new()), encrypt)
    }

    pub fn cfb(ctx: Box<dyn BlockCipher>, encrypt: bool) -> Self {
        Self::new(ctx, Box::new(Cfb::new(encrypt)), encrypt)
    }

    pub fn ofb(ctx: Box<dyn BlockCipher>, encrypt: bool) -> Self {
        Self::new(ctx, Box::new(Ofb::new()), encrypt)
    }

    /// Computes the key schedule and arms the stream.
    pub fn init(&mut self, key: &[u8], iv: &[u8]) -> Result<&mut Self> {
        self.bpos = None;
        self.ctx.init(key)?;
        let block_size = self.ctx.block_size();
        self.mode.start(iv, block_size)?;
        self.buf.zeroize();
        self.last.zeroize();
        self.last.clear();
        self.bpos = Some(0);
        Ok(self)
    }

    /// Absorbs input, returning every completed block's worth of output.
    ///
    /// Output length is the number of whole blocks completed this call
    /// (padded decrypt additionally holds the trailing block back for
    /// `finalize()`); leftover bytes stay in the buffer.
    pub fn update(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let bpos = self.bpos.ok_or(CipherError::NotInitialized)?;
        let block_size = self.buf.len();
        let total = bpos + input.len();

        if total < block_size {
            self.buf[bpos..total].copy_from_slice(input);
            self.bpos = Some(total);
            return Ok(Vec::new());
        }

        let olen = total - total % block_size;
        let mut out = vec![0u8; olen];
        let mut opos = 0;
        let mut ipos = 0;

        if bpos > 0 {
            let need = block_size - bpos;
            self.buf[bpos..].copy_from_slice(&input[..need]);
            self.mode
                .process(self.ctx.as_ref(), &self.buf, &mut out[..block_size])?;
            opos = block_size;
            ipos = need;
        }
        while input.len() - ipos >= block_size {
            self.mode.process(
                self.ctx.as_ref(),
                &input[ipos..ipos + block_size],
                &mut out[opos..opos + block_size],
            )?;
            ipos += block_size;
            opos += block_size;
        }

        let rem = input.len() - ipos;
        self.buf[..rem].copy_from_slice(&input[ipos..]);
        self.bpos = Some(rem);

        if self.mode.padded() && !self.encrypt {
            // Hold the trailing block until finalize() can inspect the
            // padding; release whatever was held before it.
            let keep = out.split_off(olen - block_size);
            let mut released = std::mem::replace(&mut self.last, keep);
            released.extend_from_slice(&out);
            return Ok(released);
        }
        Ok(out)
    }

    /// Completes the stream.
    ///
    /// Padded encrypt emits the PKCS#7 block; padded decrypt validates and
    /// strips the padding from the held-back block; stream modes emit the
    /// remaining partial block. The key schedule is destroyed and the
    /// buffer zeroized in every case, including failure.
    pub fn finalize(&mut self) -> Result<Vec<u8>> {
        let bpos = self.bpos.ok_or(CipherError::NotInitialized)?;
        let result = self.run_final(bpos);

        self.ctx.destroy();
        self.buf.zeroize();
        self.last.zeroize();
        self.last.clear();
        self.bpos = None;

        result
    }

    fn run_final(&mut self, bpos: usize) -> Result<Vec<u8>> {
        let block_size = self.buf.len();

        if !self.mode.padded() {
            let mut out = vec![0u8; bpos];
            if bpos > 0 {
                self.mode
                    .process(self.ctx.as_ref(), &self.buf[..bpos], &mut out)?;
            }
            return Ok(out);
        }

        if self.encrypt {
            let left = block_size - bpos;
            for byte in &mut self.buf[bpos..] {
                *byte = left as u8;
            }
            let mut out = vec![0u8; block_size];
            self.mode
                .process(self.ctx.as_ref(), &self.buf, &mut out)?;
            return Ok(out);
        }

        if bpos != 0 || self.last.len() != block_size {
            return Err(CipherError::BadDecrypt);
        }
        let pad = self.last[block_size - 1] as usize;
        if pad == 0 || pad > block_size {
            return Err(CipherError::BadDecrypt);
        }
        if self.last[block_size - pad..].iter().any(|&b| b as usize != pad) {
            return Err(CipherError::BadDecrypt);
        }
        Ok(self.last[..block_size - pad].to_vec())
    }
}

/// Resolves a mode name (case-insensitive) to a configured stream.
pub fn get(name: &str, encrypt: bool, ctx: Box<dyn BlockCipher>) -> Result<CipherStream> {
    match name.to_ascii_lowercase().as_str() {
        "ecb" => Ok(CipherStream::ecb(ctx, encrypt)),
        "cbc" => Ok(CipherStream::cbc(ctx, encrypt)),
        "ctr" => Ok(CipherStream::ctr(ctx, encrypt)),
        "cfb" => Ok(CipherStream::cfb(ctx, encrypt)),
        "ofb" => Ok(CipherStream::ofb(ctx, encrypt)),
        _ => Err(CipherError::UnknownMode(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(mode: &str, encrypt: bool) -> CipherStream {
        get(mode, encrypt, Box::new(Aes128Cipher::new())).unwrap()
    }

    #[test]
    fn test_unknown_mode() {
        let err = get("gcm", true, Box::new(Aes128Cipher::new())).unwrap_err();
        assert_eq!(err.to_string(), "Unknown mode: gcm.");
    }

    #[test]
    fn test_update_before_init_fails() {
        let mut c = stream("ecb", true);
        assert!(matches!(
            c.update(b"0123456789abcdef"),
            Err(CipherError::NotInitialized)
        ));
        assert!(matches!(c.finalize(), Err(CipherError::NotInitialized)));
    }

    #[test]
    fn test_use_after_finalize_fails() {
        let mut c = stream("ctr", true);
        c.init(&[0u8; 16], &[0u8; 16]).unwrap();
        c.update(b"hello").unwrap();
        c.finalize().unwrap();
        assert!(matches!(
            c.update(b"more"),
            Err(CipherError::NotInitialized)
        ));
    }

    #[test]
    fn test_reinit_after_finalize() {
        let mut c = stream("cbc", true);
        c.init(&[1u8; 16], &[2u8; 16]).unwrap();
        let mut first = c.update(b"block sized inpt").unwrap();
        first.extend(c.finalize().unwrap());

        c.init(&[1u8; 16], &[2u8; 16]).unwrap();
        let mut second = c.update(b"block sized inpt").unwrap();
        second.extend(c.finalize().unwrap());
        assert_eq!(first, second);
    }

    #[test]
    fn test_ecb_iv_must_be_empty() {
        let mut c = stream("ecb", true);
        assert!(matches!(
            c.init(&[0u8; 16], &[0u8; 16]),
            Err(CipherError::InvalidIv)
        ));
        let mut c = stream("cbc", true);
        assert!(matches!(
            c.init(&[0u8; 16], &[0u8; 8]),
            Err(CipherError::InvalidIv)
        ));
    }

    #[test]
    fn test_update_buffering_is_split_invariant() {
        // Feeding bytes one at a time must produce the same stream as one
        // large update.
        let key = [7u8; 16];
        let iv = [9u8; 16];
        let data = b"The quick brown fox jumps over the lazy dog";

        let mut whole = stream("cbc", true);
        whole.init(&key, &iv).unwrap();
        let mut expected = whole.update(data).unwrap();
        expected.extend(whole.finalize().unwrap());

        let mut piecewise = stream("cbc", true);
        piecewise.init(&key, &iv).unwrap();
        let mut got = Vec::new();
        for byte in data.iter() {
            got.extend(piecewise.update(std::slice::from_ref(byte)).unwrap());
        }
        got.extend(piecewise.finalize().unwrap());
        assert_eq!(got, expected);
    }
}
