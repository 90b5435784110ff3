//! Mode kernels. Each kernel owns its chaining state and transforms one
//! chunk at a time; the shared buffering lives in `CipherStream`.

use super::{BlockCipher, CipherError, ModeOps, Result};

fn xor_into(output: &mut [u8], input: &[u8], keystream: &[u8]) {
    for (i, byte) in output.iter_mut().enumerate() {
        *byte = input[i] ^ keystream[i];
    }
}

/// Electronic codebook: every block stands alone. No IV.
pub struct Ecb {
    encrypt: bool,
}

impl Ecb {
    pub fn new(encrypt: bool) -> Self {
        Self { encrypt }
    }
}

impl ModeOps for Ecb {
    fn padded(&self) -> bool {
        true
    }

    fn start(&mut self, iv: &[u8], _block_size: usize) -> Result<()> {
        if !iv.is_empty() {
            return Err(CipherError::InvalidIv);
        }
        Ok(())
    }

    fn process(&mut self, ctx: &dyn BlockCipher, input: &[u8], output: &mut [u8]) -> Result<()> {
        if self.encrypt {
            ctx.encrypt(input, output)
        } else {
            ctx.decrypt(input, output)
        }
    }
}

/// Cipher block chaining. `C_i = E(P_i ⊕ C_{i-1})`, `C_0 = IV`.
pub struct Cbc {
    encrypt: bool,
    prev: Vec<u8>,
}

impl Cbc {
    pub fn new(encrypt: bool) -> Self {
        Self {
            encrypt,
            prev: Vec::new(),
        }
    }
}

impl ModeOps for Cbc {
    fn padded(&self) -> bool {
        true
    }

    fn start(&mut self, iv: &[u8], block_size: usize) -> Result<()> {
        if iv.len() != block_size {
            return Err(CipherError::InvalidIv);
        }
        self.prev = iv.to_vec();
        Ok(())
    }

    fn process(&mut self, ctx: &dyn BlockCipher, input: &[u8], output: &mut [u8]) -> Result<()> {
        if self.encrypt {
            let mut mixed = vec![0u8; input.len()];
            xor_into(&mut mixed, input, &self.prev);
            ctx.encrypt(&mixed, output)?;
            self.prev.copy_from_slice(output);
        } else {
            // Keep our own copy of the ciphertext block: the chain must
            // survive callers reusing their input buffers.
            let chained = input.to_vec();
            ctx.decrypt(input, output)?;
            for (i, byte) in output.iter_mut().enumerate() {
                *byte ^= self.prev[i];
            }
            self.prev = chained;
        }
        Ok(())
    }
}

/// Counter mode. The IV seeds a big-endian counter, incremented (with
/// wrap) after every keystream block. Encrypt and decrypt coincide.
pub struct Ctr {
    counter: Vec<u8>,
    keystream: Vec<u8>,
}

impl Ctr {
    pub fn new() -> Self {
        Self {
            counter: Vec::new(),
            keystream: Vec::new(),
        }
    }
}

impl Default for Ctr {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeOps for Ctr {
    fn padded(&self) -> bool {
        false
    }

    fn start(&mut self, iv: &[u8], block_size: usize) -> Result<()> {
        if iv.len() != block_size {
            return Err(CipherError::InvalidIv);
        }
        self.counter = iv.to_vec();
        self.keystream = vec![0u8; block_size];
        Ok(())
    }

    fn process(&mut self, ctx: &dyn BlockCipher, input: &[u8], output: &mut [u8]) -> Result<()> {
        ctx.encrypt(&self.counter, &mut self.keystream)?;
        for byte in self.counter.iter_mut().rev() {
            *byte = byte.wrapping_add(1);
            if *byte != 0 {
                break;
            }
        }
        xor_into(output, input, &self.keystream);
        Ok(())
    }
}

/// Cipher feedback. Keystream is `E(prev)`; the feedback register takes
/// the ciphertext side of each full block.
pub struct Cfb {
    encrypt: bool,
    prev: Vec<u8>,
    keystream: Vec<u8>,
}

impl Cfb {
    pub fn new(encrypt: bool) -> Self {
        Self {
            encrypt,
            prev: Vec::new(),
            keystream: Vec::new(),
        }
    }
}

impl ModeOps for Cfb {
    fn padded(&self) -> bool {
        false
    }

    fn start(&mut self, iv: &[u8], block_size: usize) -> Result<()> {
        if iv.len() != block_size {
            return Err(CipherError::InvalidIv);
        }
        self.prev = iv.to_vec();
        self.keystream = vec![0u8; block_size];
        Ok(())
    }

    fn process(&mut self, ctx: &dyn BlockCipher, input: &[u8], output: &mut [u8]) -> Result<()> {
        ctx.encrypt(&self.prev, &mut self.keystream)?;
        xor_into(output, input, &self.keystream);
        if input.len() == self.prev.len() {
            if self.encrypt {
                self.prev.copy_from_slice(output);
            } else {
                self.prev.copy_from_slice(input);
            }
        }
        Ok(())
    }
}

/// Output feedback. The keystream register is re-encrypted every block,
/// independent of the data. Encrypt and decrypt coincide.
pub struct Ofb {
    state: Vec<u8>,
    next: Vec<u8>,
}

impl Ofb {
    pub fn new() -> Self {
        Self {
            state: Vec::new(),
            next: Vec::new(),
        }
    }
}

impl Default for Ofb {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeOps for Ofb {
    fn padded(&self) -> bool {
        false
    }

    fn start(&mut self, iv: &[u8], block_size: usize) -> Result<()> {
        if iv.len() != block_size {
            return Err(CipherError::InvalidIv);
        }
        self.state = iv.to_vec();
        self.next = vec![0u8; block_size];
        Ok(())
    }

    fn process(&mut self, ctx: &dyn BlockCipher, input: &[u8], output: &mut [u8]) -> Result<()> {
        ctx.encrypt(&self.state, &mut self.next)?;
        self.state.copy_from_slice(&self.next);
        xor_into(output, input, &self.state);
        Ok(())
    }
}
