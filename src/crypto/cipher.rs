//! AES-256-CBC / PKCS#7 分组变换
//!
//! 只做分组级变换，不负责读写与分块：
//! - `update` 处理完整分组（CBC 链式状态保存在变换对象内）
//! - `finish` 处理最后一段：加密补齐 PKCS#7 填充，解密校验并去除填充
//!
//! 注意：CBC 只提供机密性，不提供完整性认证。
//! 解密端的填充校验只能发现大部分错误密码，不能替代 MAC。

use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::generic_array::GenericArray;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::crypto::{CipherTransform, SymmetricCipher};
use crate::error::EncryptorError;

/// AES-256 密钥长度
pub const KEY_SIZE: usize = 32;

/// AES 分组长度，同时也是 IV 长度
pub const BLOCK_SIZE: usize = 16;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// 默认对称密码：AES-256-CBC，PKCS#7 填充
#[derive(Debug, Clone, Copy, Default)]
pub struct Aes256Cbc;

impl SymmetricCipher for Aes256Cbc {
    fn key_size(&self) -> usize {
        KEY_SIZE
    }

    fn block_size(&self) -> usize {
        BLOCK_SIZE
    }

    fn encryptor(&self, key: &[u8], iv: &[u8]) -> Result<Box<dyn CipherTransform>, EncryptorError> {
        let inner = Aes256CbcEnc::new_from_slices(key, iv)
            .map_err(|_| EncryptorError::invalid_argument("invalid AES key or IV length"))?;
        Ok(Box::new(CbcEncrypt { inner }))
    }

    fn decryptor(&self, key: &[u8], iv: &[u8]) -> Result<Box<dyn CipherTransform>, EncryptorError> {
        let inner = Aes256CbcDec::new_from_slices(key, iv)
            .map_err(|_| EncryptorError::invalid_argument("invalid AES key or IV length"))?;
        Ok(Box::new(CbcDecrypt { inner }))
    }
}

struct CbcEncrypt {
    inner: Aes256CbcEnc,
}

impl CipherTransform for CbcEncrypt {
    fn block_size(&self) -> usize {
        BLOCK_SIZE
    }

    fn update(&mut self, blocks: &mut [u8]) -> Result<(), EncryptorError> {
        check_aligned(blocks)?;
        for block in blocks.chunks_exact_mut(BLOCK_SIZE) {
            self.inner
                .encrypt_block_mut(GenericArray::from_mut_slice(block));
        }
        Ok(())
    }

    fn finish(self: Box<Self>, tail: &[u8]) -> Result<Vec<u8>, EncryptorError> {
        // 填充后长度：向上取整到分组，整除时追加一个完整填充分组
        let padded_len = (tail.len() / BLOCK_SIZE + 1) * BLOCK_SIZE;
        let mut buf = vec![0u8; padded_len];
        buf[..tail.len()].copy_from_slice(tail);

        let ciphertext = self
            .inner
            .encrypt_padded_mut::<Pkcs7>(&mut buf, tail.len())
            .map_err(|_| EncryptorError::invalid_argument("padding buffer too small"))?;

        Ok(ciphertext.to_vec())
    }
}

struct CbcDecrypt {
    inner: Aes256CbcDec,
}

impl CipherTransform for CbcDecrypt {
    fn block_size(&self) -> usize {
        BLOCK_SIZE
    }

    fn update(&mut self, blocks: &mut [u8]) -> Result<(), EncryptorError> {
        check_aligned(blocks)?;
        for block in blocks.chunks_exact_mut(BLOCK_SIZE) {
            self.inner
                .decrypt_block_mut(GenericArray::from_mut_slice(block));
        }
        Ok(())
    }

    fn finish(self: Box<Self>, tail: &[u8]) -> Result<Vec<u8>, EncryptorError> {
        if tail.is_empty() || tail.len() % BLOCK_SIZE != 0 {
            return Err(EncryptorError::CryptographicIntegrity);
        }

        let mut buf = tail.to_vec();
        let plaintext = self
            .inner
            .decrypt_padded_mut::<Pkcs7>(&mut buf)
            .map_err(|_| EncryptorError::CryptographicIntegrity)?;

        Ok(plaintext.to_vec())
    }
}

fn check_aligned(blocks: &[u8]) -> Result<(), EncryptorError> {
    if blocks.len() % BLOCK_SIZE != 0 {
        return Err(EncryptorError::invalid_argument(format!(
            "buffer of {} bytes is not aligned to the {BLOCK_SIZE}-byte block size",
            blocks.len()
        )));
    }
    Ok(())
}
