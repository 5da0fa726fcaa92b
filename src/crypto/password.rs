//! 随机密码生成

use base64::{Engine as _, engine::general_purpose::STANDARD};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::crypto::rng::RandomSource;
use crate::error::EncryptorError;

/// 生成 base64 编码的随机密码
pub struct PasswordGenerator<R = OsRng> {
    rng: R,
}

impl PasswordGenerator {
    pub fn new() -> Self {
        Self { rng: OsRng }
    }
}

impl Default for PasswordGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RandomSource> PasswordGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// 由 `length` 字节随机数据生成密码（标准 base64，带填充）
    pub fn generate(&mut self, length: usize) -> Result<String, EncryptorError> {
        if length == 0 {
            return Err(EncryptorError::invalid_argument(
                "length must be greater than zero",
            ));
        }

        let mut bytes = Zeroizing::new(vec![0u8; length]);
        self.rng.fill(&mut bytes)?;

        Ok(STANDARD.encode(&*bytes))
    }
}
