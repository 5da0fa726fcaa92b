//! 加密参数配置
//!
//! 容器格式本身不记录任何参数：salt 长度与 PBKDF2 迭代次数
//! 必须与加密时一致，否则无法正确解密。
//! chunk 大小只影响内存占用，不影响输出字节。

use crate::error::EncryptorError;

/// 默认 salt 长度（字节）
pub const DEFAULT_SALT_SIZE: usize = 16;

/// salt 最小长度（字节）
pub const MIN_SALT_SIZE: usize = 8;

/// PBKDF2-HMAC-SHA256 固定迭代次数
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// 默认读写 chunk 大小：64 KiB（AES 分组大小的整数倍）
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// 自动生成密码时使用的随机字节数
pub const GENERATED_PASSWORD_LENGTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncryptorConfig {
    pub salt_size: usize,
    pub iterations: u32,
    pub chunk_size: usize,
}

impl Default for EncryptorConfig {
    fn default() -> Self {
        Self {
            salt_size: DEFAULT_SALT_SIZE,
            iterations: PBKDF2_ITERATIONS,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl EncryptorConfig {
    /// 校验参数组合，`block_size` 为所用分组密码的分组长度
    pub fn validate(&self, block_size: usize) -> Result<(), EncryptorError> {
        if self.salt_size < MIN_SALT_SIZE {
            return Err(EncryptorError::invalid_argument(format!(
                "salt size must be at least {MIN_SALT_SIZE} bytes, got {}",
                self.salt_size
            )));
        }

        if self.iterations == 0 {
            return Err(EncryptorError::invalid_argument(
                "PBKDF2 iterations must be at least 1",
            ));
        }

        check_chunk_size(self.chunk_size, block_size)
    }
}

/// chunk 必须是分组长度的非零整数倍
pub(crate) fn check_chunk_size(chunk_size: usize, block_size: usize) -> Result<(), EncryptorError> {
    if chunk_size == 0 || block_size == 0 || chunk_size % block_size != 0 {
        return Err(EncryptorError::invalid_argument(format!(
            "chunk size {chunk_size} is not a non-zero multiple of block size {block_size}"
        )));
    }
    Ok(())
}
