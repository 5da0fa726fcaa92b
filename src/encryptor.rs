//! 对称加密器
//!
//! 单次调用的状态流转：
//!
//! ```text
//! Start → ValidateInput → ValidateOutput → DeriveKeyMaterial → StreamTransform → Complete
//! ```
//!
//! 任一校验步骤失败都会立即返回，不会创建输出文件。
//! 具体的加密 / 解密流程分别见 `encrypt.rs` 与 `decrypt.rs`。

use std::path::Path;

use rand::rngs::OsRng;

use crate::config::EncryptorConfig;
use crate::crypto::{Aes256Cbc, KeyDerivationScheme, Pbkdf2Sha256, RandomSource, SymmetricCipher};
use crate::error::EncryptorError;

/// 基于口令的文件加密器
///
/// 每个实例持有自己的分组密码、随机源与密钥派生方案，调用之间不共享可变状态。
pub struct SymmetricEncryptor<C = Aes256Cbc, R = OsRng, K = Pbkdf2Sha256> {
    pub(crate) cipher: C,
    pub(crate) rng: R,
    pub(crate) kdf: K,
    pub(crate) config: EncryptorConfig,
}

impl SymmetricEncryptor {
    /// 默认配置：AES-256-CBC + 系统随机源 + PBKDF2-HMAC-SHA256
    pub fn new() -> Self {
        Self {
            cipher: Aes256Cbc,
            rng: OsRng,
            kdf: Pbkdf2Sha256,
            config: EncryptorConfig::default(),
        }
    }

    pub fn with_config(config: EncryptorConfig) -> Result<Self, EncryptorError> {
        Self::with_parts(Aes256Cbc, OsRng, config)
    }
}

impl Default for SymmetricEncryptor {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: SymmetricCipher, R: RandomSource> SymmetricEncryptor<C, R> {
    /// 显式注入分组密码、随机源与配置，密钥派生使用 PBKDF2-HMAC-SHA256
    pub fn with_parts(cipher: C, rng: R, config: EncryptorConfig) -> Result<Self, EncryptorError> {
        config.validate(cipher.block_size())?;
        Ok(Self {
            cipher,
            rng,
            kdf: Pbkdf2Sha256,
            config,
        })
    }
}

impl<C: SymmetricCipher, R: RandomSource, K: KeyDerivationScheme> SymmetricEncryptor<C, R, K> {
    /// 替换密钥派生方案
    ///
    /// 容器不记录派生方案，解密端必须使用相同方案。
    pub fn with_kdf<K2: KeyDerivationScheme>(self, kdf: K2) -> SymmetricEncryptor<C, R, K2> {
        SymmetricEncryptor {
            cipher: self.cipher,
            rng: self.rng,
            kdf,
            config: self.config,
        }
    }

    pub fn config(&self) -> &EncryptorConfig {
        &self.config
    }

    /// 容器头长度：salt + IV
    pub fn header_len(&self) -> usize {
        self.config.salt_size + self.cipher.block_size()
    }

    pub(crate) fn key_derivator(
        &self,
        password: &str,
        salt: &[u8],
    ) -> Result<K::Derivator, EncryptorError> {
        self.kdf.derivator(password, salt, self.config.iterations)
    }
}

/// 输入必须是已存在的普通文件
pub(crate) fn check_input_file(input: &Path) -> Result<(), EncryptorError> {
    if !input.is_file() {
        return Err(EncryptorError::NotFound(input.to_path_buf()));
    }
    Ok(())
}

/// 输出已存在时必须显式允许覆盖
pub(crate) fn check_output_file(output: &Path, overwrite: bool) -> Result<(), EncryptorError> {
    if output.exists() && !overwrite {
        return Err(EncryptorError::Conflict(output.to_path_buf()));
    }
    Ok(())
}
