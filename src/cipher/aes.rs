//! AES block-cipher facades.

use aes::{Aes128, Aes192, Aes256};
use cipher::generic_array::GenericArray;
use cipher::{BlockDecrypt, BlockEncrypt, BlockSizeUser, KeyInit};

use super::{BlockCipher, CipherError, Result};

/// Wraps a RustCrypto AES key schedule behind the [`BlockCipher`] facade.
pub struct AesCipher<C> {
    schedule: Option<C>,
}

impl<C> AesCipher<C> {
    pub fn new() -> Self {
        Self { schedule: None }
    }
}

impl<C> Default for AesCipher<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: BlockEncrypt + BlockDecrypt + KeyInit> BlockCipher for AesCipher<C> {
    fn block_size(&self) -> usize {
        <C as BlockSizeUser>::block_size()
    }

    fn init(&mut self, key: &[u8]) -> Result<()> {
        self.schedule = Some(C::new_from_slice(key).map_err(|_| CipherError::InvalidKey)?);
        Ok(())
    }

    fn encrypt(&self, input: &[u8], output: &mut [u8]) -> Result<()> {
        let schedule = self.schedule.as_ref().ok_or(CipherError::NotInitialized)?;
        schedule.encrypt_block_b2b(
            GenericArray::from_slice(input),
            GenericArray::from_mut_slice(output),
        );
        Ok(())
    }

    fn decrypt(&self, input: &[u8], output: &mut [u8]) -> Result<()> {
        let schedule = self.schedule.as_ref().ok_or(CipherError::NotInitialized)?;
        schedule.decrypt_block_b2b(
            GenericArray::from_slice(input),
            GenericArray::from_mut_slice(output),
        );
        Ok(())
    }

    fn destroy(&mut self) {
        self.schedule = None;
    }
}

pub type Aes128Cipher = AesCipher<Aes128>;
pub type Aes192Cipher = AesCipher<Aes192>;
pub type Aes256Cipher = AesCipher<Aes256>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_block_roundtrip() {
        let mut cipher = Aes128Cipher::new();
        cipher.init(&[0x42u8; 16]).unwrap();

        let plain = *b"0123456789abcdef";
        let mut enc = [0u8; 16];
        let mut dec = [0u8; 16];
        cipher.encrypt(&plain, &mut enc).unwrap();
        assert_ne!(enc, plain);
        cipher.decrypt(&enc, &mut dec).unwrap();
        assert_eq!(dec, plain);
    }

    #[test]
    fn test_key_lengths() {
        assert!(Aes128Cipher::new().init(&[0u8; 15]).is_err());
        assert!(Aes192Cipher::new().init(&[0u8; 24]).is_ok());
        assert!(Aes256Cipher::new().init(&[0u8; 32]).is_ok());
    }

    #[test]
    fn test_destroyed_schedule_is_unusable() {
        let mut cipher = Aes128Cipher::new();
        cipher.init(&[0u8; 16]).unwrap();
        cipher.destroy();
        let mut out = [0u8; 16];
        assert!(matches!(
            cipher.encrypt(&[0u8; 16], &mut out),
            Err(CipherError::NotInitialized)
        ));
    }
}
