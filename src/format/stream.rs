//! 密文流（Stream）实现
//!
//! 负责容器头之后的数据部分：
//! - 将输入按固定大小切分为 chunk（惰性读取，不整体载入内存）
//! - 按顺序送入分组变换（CBC 链式依赖，不可并行、不可乱序）
//! - 加密时在末尾补 PKCS#7 填充，解密时保留最后一个分组用于去填充
//!
//! chunk 大小必须是分组长度的非零整数倍，构造时即校验。

use std::io::{self, Read, Write};

use crate::config::check_chunk_size;
use crate::crypto::CipherTransform;
use crate::error::EncryptorError;

/// 从 reader 惰性产出固定大小 chunk 的迭代器
///
/// 除最后一个外，每个 chunk 都恰好 `chunk_size` 字节；
/// 输入耗尽后结束，不产出空 chunk。
pub struct Chunks<R> {
    reader: R,
    chunk_size: usize,
    done: bool,
}

impl<R: Read> Chunks<R> {
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk_size,
            done: chunk_size == 0,
        }
    }
}

impl<R: Read> Iterator for Chunks<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut buf = vec![0u8; self.chunk_size];
        let mut filled = 0;

        // 短读不代表结束，只有读到 0 字节才是 EOF
        while filled < self.chunk_size {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => {
                    self.done = true;
                    break;
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }

        if filled == 0 {
            return None;
        }

        buf.truncate(filled);
        Some(Ok(buf))
    }
}

/// 流式加密器
pub struct StreamEncryptor {
    transform: Box<dyn CipherTransform>,
    chunk_size: usize,
}

impl StreamEncryptor {
    pub fn new(
        transform: Box<dyn CipherTransform>,
        chunk_size: usize,
    ) -> Result<Self, EncryptorError> {
        check_chunk_size(chunk_size, transform.block_size())?;
        Ok(Self {
            transform,
            chunk_size,
        })
    }

    /// 从 reader 读取明文，加密后写入 writer，返回写出的密文字节数
    pub fn encrypt<R: Read, W: Write>(
        self,
        reader: R,
        mut writer: W,
    ) -> Result<u64, EncryptorError> {
        let Self {
            mut transform,
            chunk_size,
        } = self;

        let mut written = 0u64;
        let mut tail = Vec::new();

        for chunk in Chunks::new(reader, chunk_size) {
            let mut chunk = chunk?;

            // 不满一个 chunk 说明已到输入末尾，留给 finish 补填充
            if chunk.len() < chunk_size {
                tail = chunk;
                break;
            }

            transform.update(&mut chunk)?;
            writer.write_all(&chunk)?;
            written += chunk.len() as u64;
        }

        let last = transform.finish(&tail)?;
        writer.write_all(&last)?;
        written += last.len() as u64;

        Ok(written)
    }
}

/// 流式解密器
pub struct StreamDecryptor {
    transform: Box<dyn CipherTransform>,
    block_size: usize,
    chunk_size: usize,
}

impl StreamDecryptor {
    pub fn new(
        transform: Box<dyn CipherTransform>,
        chunk_size: usize,
    ) -> Result<Self, EncryptorError> {
        let block_size = transform.block_size();
        check_chunk_size(chunk_size, block_size)?;
        Ok(Self {
            transform,
            block_size,
            chunk_size,
        })
    }

    /// 从 reader 读取密文，解密后写入 writer，返回写出的明文字节数
    ///
    /// 空密文视为空明文；密文长度不是分组整数倍或填充非法时
    /// 返回 CryptographicIntegrity。
    pub fn decrypt<R: Read, W: Write>(
        self,
        reader: R,
        mut writer: W,
    ) -> Result<u64, EncryptorError> {
        let Self {
            mut transform,
            block_size,
            chunk_size,
        } = self;

        let mut written = 0u64;

        // 始终保留最近一个 chunk，确认其后没有数据后再去填充
        let mut pending: Option<Vec<u8>> = None;

        for chunk in Chunks::new(reader, chunk_size) {
            let chunk = chunk?;
            if let Some(mut previous) = pending.replace(chunk) {
                transform.update(&mut previous)?;
                writer.write_all(&previous)?;
                written += previous.len() as u64;
            }
        }

        let Some(mut last) = pending else {
            return Ok(0);
        };

        if last.len() % block_size != 0 {
            return Err(EncryptorError::CryptographicIntegrity);
        }

        let split = last.len() - block_size;
        let (body, final_block) = last.split_at_mut(split);
        transform.update(body)?;
        writer.write_all(body)?;
        written += body.len() as u64;

        let plaintext = transform.finish(final_block)?;
        writer.write_all(&plaintext)?;
        written += plaintext.len() as u64;

        Ok(written)
    }
}
