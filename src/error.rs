//! 加解密流程的统一错误类型。

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncryptorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// 输入文件不存在
    #[error("input file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// 输出文件已存在且未允许覆盖
    #[error("output file exists and overwrite has not been set: {}", .0.display())]
    Conflict(PathBuf),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// 填充校验失败或密文长度不合法，通常意味着密码错误
    #[error("invalid password or corrupted ciphertext")]
    CryptographicIntegrity,

    #[error("malformed container: {0}")]
    MalformedContainer(String),
}

impl EncryptorError {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
