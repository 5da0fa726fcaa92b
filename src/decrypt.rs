//! 解密流程实现
//!
//! 解密流程（严格顺序）：
//! 1. 校验输入存在、输出可写、密码非空
//! 2. 读取容器头（salt + IV），不足则判定为格式错误
//! 3. 使用头部 salt + 密码派生密钥
//! 4. 流式 CBC 解密，最后一个分组校验并去除填充
//!
//! 填充校验失败（通常是密码错误）时不会留下任何输出文件。

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::crypto::{KeyDerivation, KeyDerivationScheme, RandomSource, SymmetricCipher};
use crate::encryptor::{SymmetricEncryptor, check_input_file, check_output_file};
use crate::error::EncryptorError;
use crate::format::header::ContainerHeader;
use crate::format::stream::StreamDecryptor;
use crate::fs::atomic::write_atomic;

impl<C: SymmetricCipher, R: RandomSource, K: KeyDerivationScheme> SymmetricEncryptor<C, R, K> {
    /// 使用密码解密文件
    pub fn decrypt_file(
        &mut self,
        input: &Path,
        output: &Path,
        password: &str,
        overwrite: bool,
    ) -> Result<(), EncryptorError> {
        check_input_file(input)?;
        check_output_file(output, overwrite)?;

        if password.trim().is_empty() {
            return Err(EncryptorError::invalid_argument(
                "empty password provided for decryption",
            ));
        }

        let block_size = self.cipher.block_size();
        let mut reader = BufReader::new(File::open(input)?);

        // ---------- 读取容器头 ----------
        let header = ContainerHeader::read(&mut reader, self.config.salt_size, block_size)?;

        // ---------- KDF 派生密钥 ----------
        let key = self
            .key_derivator(password, &header.salt)?
            .derive_key(self.cipher.key_size())?;

        let transform = self.cipher.decryptor(&key, &header.iv)?;
        let chunk_size = self.config.chunk_size;

        write_atomic(output, |writer| {
            StreamDecryptor::new(transform, chunk_size)?.decrypt(reader, writer)?;
            Ok(())
        })
    }
}
