//! 原子写入工具。
//!
//! 先写同目录下的临时文件，全部成功后再 rename 替换目标文件。
//! 任一步失败都会删除临时文件，目标文件保持原样。

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::EncryptorError;

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// 原子写文件。
///
/// 流程：
/// 1. 在目标目录创建临时文件；
/// 2. 调用 `write_fn` 向缓冲写入器写入完整内容；
/// 3. flush + fsync 后 rename 到目标路径（Unix 上旧文件在替换前始终可见）。
pub fn write_atomic<T, F>(target: &Path, write_fn: F) -> Result<T, EncryptorError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<T, EncryptorError>,
{
    let parent = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    fs::create_dir_all(&parent)?;

    let tmp_path = build_tmp_path(&parent, target.file_name());
    let tmp_file = File::create(&tmp_path)?;

    match write_and_commit(tmp_file, &tmp_path, target, write_fn) {
        Ok(value) => Ok(value),
        Err(err) => {
            let _ = fs::remove_file(&tmp_path);
            Err(err)
        }
    }
}

fn write_and_commit<T, F>(
    tmp_file: File,
    tmp_path: &Path,
    target: &Path,
    write_fn: F,
) -> Result<T, EncryptorError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<T, EncryptorError>,
{
    let mut writer = BufWriter::new(tmp_file);
    let value = write_fn(&mut writer)?;

    writer.flush()?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    drop(file);

    // Unix 的 rename 会原子替换已存在的目标
    #[cfg(windows)]
    if target.exists() {
        fs::remove_file(target)?;
    }

    fs::rename(tmp_path, target)?;

    Ok(value)
}

fn build_tmp_path(parent: &Path, file_name: Option<&std::ffi::OsStr>) -> PathBuf {
    let base_name = file_name
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("file-encryptor-output");

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();

    let counter = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);

    parent.join(format!(
        ".{base_name}.partial-{}-{timestamp}-{counter}",
        std::process::id()
    ))
}
