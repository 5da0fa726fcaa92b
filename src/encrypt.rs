//! 加密流程实现
//!
//! 加密流程（严格顺序）：
//! 1. 校验输入存在、输出可写
//! 2. 生成新 salt，经密钥派生方案（默认 PBKDF2）派生密钥
//! 3. 生成新 IV
//! 4. 写入容器头（salt + IV）
//! 5. 流式 CBC 加密，末尾补 PKCS#7 填充
//!
//! 输出经临时文件原子替换，失败时不留下半成品。

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::crypto::rng::random_bytes;
use crate::crypto::{KeyDerivation, KeyDerivationScheme, RandomSource, SymmetricCipher};
use crate::encryptor::{SymmetricEncryptor, check_input_file, check_output_file};
use crate::error::EncryptorError;
use crate::format::header::ContainerHeader;
use crate::format::stream::StreamEncryptor;
use crate::fs::atomic::write_atomic;

impl<C: SymmetricCipher, R: RandomSource, K: KeyDerivationScheme> SymmetricEncryptor<C, R, K> {
    /// 使用密码加密文件
    pub fn encrypt_file(
        &mut self,
        input: &Path,
        output: &Path,
        password: &str,
        overwrite: bool,
    ) -> Result<(), EncryptorError> {
        check_input_file(input)?;
        check_output_file(output, overwrite)?;

        // ---------- salt + KDF ----------
        // salt 先于 IV 从随机源取出
        let salt = random_bytes(&mut self.rng, self.config.salt_size)?;
        let key = self
            .key_derivator(password, &salt)?
            .derive_key(self.cipher.key_size())?;

        // ---------- IV ----------
        let iv = random_bytes(&mut self.rng, self.cipher.block_size())?;

        let header = ContainerHeader::new(salt, iv);
        let transform = self.cipher.encryptor(&key, &header.iv)?;

        let reader = BufReader::new(File::open(input)?);
        let chunk_size = self.config.chunk_size;

        write_atomic(output, |writer| {
            header.write(&mut *writer)?;
            StreamEncryptor::new(transform, chunk_size)?.encrypt(reader, writer)?;
            Ok(())
        })
    }
}
