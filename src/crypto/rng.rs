//! 随机数来源

use rand::{CryptoRng, RngCore};

use crate::error::EncryptorError;

/// 密码学安全的随机字节来源
///
/// 所有实现了 `RngCore + CryptoRng` 的生成器（`OsRng`、`StdRng` 等）
/// 都自动满足该能力；通用 PRNG 不满足 `CryptoRng`，无法误用。
pub trait RandomSource {
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), EncryptorError>;
}

impl<T: RngCore + CryptoRng> RandomSource for T {
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), EncryptorError> {
        self.try_fill_bytes(dest)
            .map_err(|e| EncryptorError::Io(std::io::Error::other(e)))
    }
}

/// 生成 `len` 字节随机数据
pub(crate) fn random_bytes<R: RandomSource + ?Sized>(
    rng: &mut R,
    len: usize,
) -> Result<Vec<u8>, EncryptorError> {
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes)?;
    Ok(bytes)
}
