//! 密码学能力抽象
//!
//! 加解密流程只依赖以下三个能力：
//! - [`KeyDerivation`]：由密码 + salt 派生密钥（经 [`KeyDerivationScheme`] 注入）
//! - [`SymmetricCipher`]：分组密码及其工作模式
//! - [`RandomSource`]：密码学安全的随机数来源
//!
//! 默认实现分别为 PBKDF2-HMAC-SHA256、AES-256-CBC/PKCS#7 与 `OsRng`。

pub mod cipher;
pub mod kdf;
pub mod password;
pub mod rng;

use zeroize::Zeroizing;

use crate::error::EncryptorError;

pub use cipher::Aes256Cbc;
pub use kdf::{Pbkdf2KeyDerivator, Pbkdf2Sha256};
pub use password::PasswordGenerator;
pub use rng::RandomSource;

/// 密钥派生能力
pub trait KeyDerivation {
    /// 派生 `key_size` 字节密钥，相同输入必须得到相同输出
    fn derive_key(&self, key_size: usize) -> Result<Zeroizing<Vec<u8>>, EncryptorError>;

    /// 当前使用的 salt
    fn salt(&self) -> &[u8];
}

/// 密钥派生方案：由密码 + salt 构造单次调用使用的派生器
pub trait KeyDerivationScheme {
    type Derivator: KeyDerivation;

    fn derivator(
        &self,
        password: &str,
        salt: &[u8],
        iterations: u32,
    ) -> Result<Self::Derivator, EncryptorError>;
}

/// 对称分组密码能力
pub trait SymmetricCipher {
    /// 密钥长度（字节）
    fn key_size(&self) -> usize;

    /// 分组长度（字节），同时也是 IV 长度
    fn block_size(&self) -> usize;

    fn encryptor(&self, key: &[u8], iv: &[u8]) -> Result<Box<dyn CipherTransform>, EncryptorError>;

    fn decryptor(&self, key: &[u8], iv: &[u8]) -> Result<Box<dyn CipherTransform>, EncryptorError>;
}

/// 单向（加密或解密）的有状态分组变换
///
/// 链式模式要求严格按顺序调用 `update`，最后调用一次 `finish`。
pub trait CipherTransform {
    /// 分组长度（字节）
    fn block_size(&self) -> usize;

    /// 原地变换若干完整分组，`blocks.len()` 必须是分组长度的整数倍
    fn update(&mut self, blocks: &mut [u8]) -> Result<(), EncryptorError>;

    /// 处理末尾数据：加密时补齐填充，解密时校验并去除填充
    fn finish(self: Box<Self>, tail: &[u8]) -> Result<Vec<u8>, EncryptorError>;
}
