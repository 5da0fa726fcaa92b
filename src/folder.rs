//! 目录批量加密/解密（非打包、非压缩）
//!
//! 设计要点：
//! - 递归遍历目录，保持相对路径结构，不跟随符号链接。
//! - 每个文件走独立的单文件流程，各自拥有新的 salt 与 IV。
//! - 严格校验相对路径组件，防止路径穿越写出到目标目录之外。
//! - 输出目录不能等于或位于输入目录之内，否则遍历会进入自己的输出。

use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::crypto::{KeyDerivationScheme, RandomSource, SymmetricCipher};
use crate::encryptor::SymmetricEncryptor;
use crate::error::EncryptorError;

/// 加密文件扩展名
pub const ENCRYPTED_EXT: &str = "enc";

/// 将目录中的文件逐个加密到目标目录。
///
/// 普通文件输出为同名 + `.enc`，目录结构原样重建。
/// 返回处理的文件数。
pub fn encrypt_folder<C: SymmetricCipher, R: RandomSource, K: KeyDerivationScheme>(
    encryptor: &mut SymmetricEncryptor<C, R, K>,
    input_dir: &Path,
    output_dir: &Path,
    password: &str,
    overwrite: bool,
) -> Result<usize, EncryptorError> {
    check_input_dir(input_dir)?;
    check_output_outside_input(input_dir, output_dir)?;
    std::fs::create_dir_all(output_dir)?;

    let mut processed = 0;

    for entry in WalkDir::new(input_dir).follow_links(false) {
        let entry = entry.map_err(walkdir_to_io)?;
        let source_path = entry.path();
        let safe_rel = relative_to(source_path, input_dir)?;

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(safe_join(output_dir, &safe_rel)?)?;
            continue;
        }

        if !entry.file_type().is_file() {
            log::debug!("skipping non-regular entry {}", source_path.display());
            continue;
        }

        let name = source_path.file_name().ok_or_else(|| {
            EncryptorError::invalid_argument(format!(
                "cannot encrypt entry without a file name: {}",
                source_path.display()
            ))
        })?;

        let mut target_rel = safe_rel;
        target_rel.set_file_name(append_enc_suffix(name));
        let target_path = safe_join(output_dir, &target_rel)?;

        encryptor.encrypt_file(source_path, &target_path, password, overwrite)?;
        processed += 1;
    }

    Ok(processed)
}

/// 将目录中的 `.enc` 文件逐个解密到目标目录。
///
/// 只处理 `.enc` 文件，其余文件跳过；解密后去掉后缀。
/// 返回处理的文件数。
pub fn decrypt_folder<C: SymmetricCipher, R: RandomSource, K: KeyDerivationScheme>(
    encryptor: &mut SymmetricEncryptor<C, R, K>,
    input_dir: &Path,
    output_dir: &Path,
    password: &str,
    overwrite: bool,
) -> Result<usize, EncryptorError> {
    check_input_dir(input_dir)?;
    check_output_outside_input(input_dir, output_dir)?;
    std::fs::create_dir_all(output_dir)?;

    let mut processed = 0;

    for entry in WalkDir::new(input_dir).follow_links(false) {
        let entry = entry.map_err(walkdir_to_io)?;
        let source_path = entry.path();
        let safe_rel = relative_to(source_path, input_dir)?;

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(safe_join(output_dir, &safe_rel)?)?;
            continue;
        }

        if !entry.file_type().is_file()
            || source_path.extension().and_then(OsStr::to_str) != Some(ENCRYPTED_EXT)
        {
            log::debug!("skipping {}", source_path.display());
            continue;
        }

        let target_rel = remove_enc_extension(&safe_rel)?;
        let target_path = safe_join(output_dir, &target_rel)?;

        encryptor.decrypt_file(source_path, &target_path, password, overwrite)?;
        processed += 1;
    }

    Ok(processed)
}

fn check_input_dir(input_dir: &Path) -> Result<(), EncryptorError> {
    if !input_dir.is_dir() {
        return Err(EncryptorError::NotFound(input_dir.to_path_buf()));
    }
    Ok(())
}

fn check_output_outside_input(input_dir: &Path, output_dir: &Path) -> Result<(), EncryptorError> {
    let input = input_dir.canonicalize()?;
    let output = resolve_path(output_dir)?;

    if output.starts_with(&input) {
        return Err(EncryptorError::invalid_argument(format!(
            "output directory {} must not be inside input directory {}",
            output_dir.display(),
            input_dir.display()
        )));
    }
    Ok(())
}

/// 解析可能尚不存在的路径：规范化最近的已存在祖先，再拼回其余组件
fn resolve_path(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name);
                existing = parent;
            }
            _ => break,
        }
    }

    let mut resolved = existing.canonicalize()?;
    for name in missing.into_iter().rev() {
        resolved.push(name);
    }
    Ok(resolved)
}

fn relative_to(path: &Path, root: &Path) -> Result<PathBuf, EncryptorError> {
    let rel = path.strip_prefix(root).map_err(|e| {
        EncryptorError::invalid_argument(format!("cannot compute relative path: {e}"))
    })?;
    validate_relative_path(rel)
}

fn append_enc_suffix(name: &OsStr) -> OsString {
    let mut s = name.to_os_string();
    s.push(".");
    s.push(ENCRYPTED_EXT);
    s
}

fn remove_enc_extension(rel_path: &Path) -> Result<PathBuf, EncryptorError> {
    let origin_name = rel_path
        .file_stem()
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| {
            EncryptorError::invalid_argument(format!(
                "file name is empty after removing .{ENCRYPTED_EXT}: {}",
                rel_path.display()
            ))
        })?;

    let mut out = rel_path.to_path_buf();
    out.set_file_name(origin_name);
    Ok(out)
}

/// 校验相对路径仅包含安全组件，拒绝 `..`、绝对路径、盘符路径。
fn validate_relative_path(rel: &Path) -> Result<PathBuf, EncryptorError> {
    let mut safe = PathBuf::new();
    for comp in rel.components() {
        match comp {
            Component::CurDir => {}
            Component::Normal(v) => safe.push(v),
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(EncryptorError::invalid_argument(format!(
                    "unsafe path component in {}",
                    rel.display()
                )));
            }
        }
    }
    Ok(safe)
}

/// 在目标根目录下拼接已校验的相对路径，并再次校验结果不越界。
fn safe_join(root: &Path, rel: &Path) -> Result<PathBuf, EncryptorError> {
    let joined = root.join(rel);
    if !joined.starts_with(root) {
        return Err(EncryptorError::invalid_argument(format!(
            "target path escapes output directory: {}",
            joined.display()
        )));
    }
    Ok(joined)
}

fn walkdir_to_io(err: walkdir::Error) -> io::Error {
    io::Error::other(err.to_string())
}

