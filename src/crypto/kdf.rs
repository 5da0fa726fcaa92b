//! 密钥派生函数（KDF）模块
//!
//! 使用 PBKDF2-HMAC-SHA256 将用户密码与 salt 派生为对称密钥。
//!
//! 约束：
//! - salt 至少 8 字节，加密时随机生成，解密时从容器头读取
//! - 迭代次数固定（见 [`PBKDF2_ITERATIONS`]），不写入容器
//! - 派生结果为纯函数：同一 (密码, salt, 迭代次数, 长度) 输出恒定
//! - 密码与密钥在离开作用域后自动清零

use hmac::Hmac;
use pbkdf2::pbkdf2;
use rand::rngs::OsRng;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::config::{MIN_SALT_SIZE, PBKDF2_ITERATIONS};
use crate::crypto::{KeyDerivation, KeyDerivationScheme};
use crate::crypto::rng::{RandomSource, random_bytes};
use crate::error::EncryptorError;

/// 基于 PBKDF2 的密钥派生器
///
/// 生命周期限定在单次加密或解密调用内。
pub struct Pbkdf2KeyDerivator {
    password: Zeroizing<Vec<u8>>,
    salt: Vec<u8>,
    iterations: u32,
}

impl Pbkdf2KeyDerivator {
    /// 使用系统随机源生成 `salt_size` 字节的新 salt
    pub fn new(password: &str, salt_size: usize) -> Result<Self, EncryptorError> {
        Self::generate_with(password, salt_size, &mut OsRng)
    }

    /// 使用指定随机源生成新 salt
    pub fn generate_with<R: RandomSource + ?Sized>(
        password: &str,
        salt_size: usize,
        rng: &mut R,
    ) -> Result<Self, EncryptorError> {
        check_salt_size(salt_size)?;
        let salt = random_bytes(rng, salt_size)?;
        Self::with_salt(password, &salt)
    }

    /// 使用已有 salt（通常来自容器头）
    pub fn with_salt(password: &str, salt: &[u8]) -> Result<Self, EncryptorError> {
        check_salt_size(salt.len())?;

        Ok(Self {
            password: Zeroizing::new(password.as_bytes().to_vec()),
            salt: salt.to_vec(),
            iterations: PBKDF2_ITERATIONS,
        })
    }

    /// 覆盖默认迭代次数
    ///
    /// 改变迭代次数会使已有容器无法用默认参数解密。
    pub fn with_iterations(mut self, iterations: u32) -> Result<Self, EncryptorError> {
        if iterations == 0 {
            return Err(EncryptorError::invalid_argument(
                "PBKDF2 iterations must be at least 1",
            ));
        }
        self.iterations = iterations;
        Ok(self)
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

impl KeyDerivation for Pbkdf2KeyDerivator {
    fn derive_key(&self, key_size: usize) -> Result<Zeroizing<Vec<u8>>, EncryptorError> {
        if key_size == 0 {
            return Err(EncryptorError::invalid_argument(
                "key size must be greater than zero",
            ));
        }

        let mut key = Zeroizing::new(vec![0u8; key_size]);

        pbkdf2::<Hmac<Sha256>>(&self.password, &self.salt, self.iterations, &mut key[..])
            .map_err(|e| EncryptorError::invalid_argument(format!("PBKDF2 failed: {e}")))?;

        Ok(key)
    }

    fn salt(&self) -> &[u8] {
        &self.salt
    }
}

/// 默认派生方案：PBKDF2-HMAC-SHA256
#[derive(Debug, Clone, Copy, Default)]
pub struct Pbkdf2Sha256;

impl KeyDerivationScheme for Pbkdf2Sha256 {
    type Derivator = Pbkdf2KeyDerivator;

    fn derivator(
        &self,
        password: &str,
        salt: &[u8],
        iterations: u32,
    ) -> Result<Pbkdf2KeyDerivator, EncryptorError> {
        Pbkdf2KeyDerivator::with_salt(password, salt)?.with_iterations(iterations)
    }
}

fn check_salt_size(salt_size: usize) -> Result<(), EncryptorError> {
    if salt_size < MIN_SALT_SIZE {
        return Err(EncryptorError::invalid_argument(format!(
            "salt must be at least {MIN_SALT_SIZE} bytes, got {salt_size}"
        )));
    }
    Ok(())
}
