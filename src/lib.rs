//! 基于口令的文件加密库
//!
//! 容器格式为 `[salt][IV][AES-256-CBC 密文]`，密钥由 PBKDF2-HMAC-SHA256 派生。
//! 该格式不含 MAC，只提供机密性，不提供完整性认证。

mod decrypt;
mod encrypt;

pub mod config;
pub mod crypto;
pub mod encryptor;
pub mod error;
pub mod folder;
pub mod format;
pub mod fs;

pub use config::EncryptorConfig;
pub use crypto::{
    Aes256Cbc, CipherTransform, KeyDerivation, KeyDerivationScheme, PasswordGenerator,
    Pbkdf2KeyDerivator, Pbkdf2Sha256, RandomSource, SymmetricCipher,
};
pub use encryptor::SymmetricEncryptor;
pub use error::EncryptorError;
pub use folder::{decrypt_folder, encrypt_folder};

use std::path::Path;

/// 使用默认参数加密单个文件
pub fn encrypt(
    input: &Path,
    output: &Path,
    password: &str,
    overwrite: bool,
) -> Result<(), EncryptorError> {
    SymmetricEncryptor::new().encrypt_file(input, output, password, overwrite)
}

/// 使用默认参数解密单个文件
pub fn decrypt(
    input: &Path,
    output: &Path,
    password: &str,
    overwrite: bool,
) -> Result<(), EncryptorError> {
    SymmetricEncryptor::new().decrypt_file(input, output, password, overwrite)
}
