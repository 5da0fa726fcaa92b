//! 容器头实现
//!
//! 容器布局（无 magic、无版本号，字节级固定）：
//!
//! ```text
//! offset 0                     : salt，salt_size 字节
//! offset salt_size             : IV，block_size 字节
//! offset salt_size+block_size  : 密文，PKCS#7 填充至 block_size 整数倍
//! ```
//!
//! 由于头部不自描述，salt_size 与 block_size 必须由调用方给出，
//! 且与加密时一致。

use std::io::{ErrorKind, Read, Write};

use crate::error::EncryptorError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHeader {
    pub salt: Vec<u8>,
    pub iv: Vec<u8>,
}

impl ContainerHeader {
    pub fn new(salt: Vec<u8>, iv: Vec<u8>) -> Self {
        Self { salt, iv }
    }

    /// 依次写入 salt 与 IV
    pub fn write<W: Write>(&self, mut writer: W) -> Result<(), EncryptorError> {
        writer.write_all(&self.salt)?;
        writer.write_all(&self.iv)?;
        Ok(())
    }

    /// 从输入流读取 salt 与 IV
    ///
    /// 输入不足 `salt_size + block_size` 字节时返回 MalformedContainer。
    pub fn read<R: Read>(
        mut reader: R,
        salt_size: usize,
        block_size: usize,
    ) -> Result<Self, EncryptorError> {
        let mut salt = vec![0u8; salt_size];
        read_field(&mut reader, &mut salt, "salt")?;

        let mut iv = vec![0u8; block_size];
        read_field(&mut reader, &mut iv, "IV")?;

        Ok(Self { salt, iv })
    }
}

fn read_field<R: Read>(reader: &mut R, buf: &mut [u8], field: &str) -> Result<(), EncryptorError> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            EncryptorError::MalformedContainer(format!(
                "input too short to contain a {}-byte {field}",
                buf.len()
            ))
        } else {
            EncryptorError::Io(e)
        }
    })
}
