//! file-encryptor 命令行入口
//!
//! 用法：
//!   file-encryptor encrypt <input> <output> [--password <P>] [--overwrite] [--recursive]
//!   file-encryptor decrypt <input> <output> [--password <P>] [--overwrite] [--recursive]
//!
//! - 加密时未提供密码：自动生成并打印一次
//! - 解密时未提供密码：在终端提示输入
//! - 日志级别由环境变量 FILE_ENCRYPTOR_LOG 控制（默认 warn）

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use zeroize::Zeroizing;

use file_encryptor::config::GENERATED_PASSWORD_LENGTH;
use file_encryptor::{PasswordGenerator, SymmetricEncryptor, decrypt_folder, encrypt_folder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Operation {
    Encrypt,
    Decrypt,
}

#[derive(Debug, Parser)]
#[command(name = "file-encryptor", version, about = "Encrypt and decrypt files with a password.")]
struct Cli {
    /// Operation to execute
    #[arg(value_enum)]
    operation: Operation,

    /// Input file (or directory with --recursive)
    input: PathBuf,

    /// Output file (or directory with --recursive)
    output: PathBuf,

    /// Password; generated on encrypt and prompted on decrypt when omitted
    #[arg(long, default_value = "")]
    password: String,

    /// Overwrite the output if it already exists
    #[arg(long)]
    overwrite: bool,

    /// Process every file under the input directory
    #[arg(long)]
    recursive: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("FILE_ENCRYPTOR_LOG", "warn"))
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut encryptor = SymmetricEncryptor::new();
    log::debug!("using {:?}", encryptor.config());

    match cli.operation {
        Operation::Encrypt => {
            let password = if cli.password.trim().is_empty() {
                let generated = Zeroizing::new(
                    PasswordGenerator::new()
                        .generate(GENERATED_PASSWORD_LENGTH)
                        .context("failed to generate password")?,
                );
                println!("Encrypting with generated password: {}", generated.as_str());
                generated
            } else {
                Zeroizing::new(cli.password)
            };

            if cli.recursive {
                let count = encrypt_folder(
                    &mut encryptor,
                    &cli.input,
                    &cli.output,
                    &password,
                    cli.overwrite,
                )
                .with_context(|| format!("failed to encrypt folder {}", cli.input.display()))?;
                log::info!("encrypted {count} files into {}", cli.output.display());
            } else {
                encryptor
                    .encrypt_file(&cli.input, &cli.output, &password, cli.overwrite)
                    .with_context(|| format!("failed to encrypt {}", cli.input.display()))?;
                log::info!("encrypted {} -> {}", cli.input.display(), cli.output.display());
            }
        }
        Operation::Decrypt => {
            let password = if cli.password.trim().is_empty() {
                Zeroizing::new(
                    rpassword::prompt_password("Password: ").context("failed to read password")?,
                )
            } else {
                Zeroizing::new(cli.password)
            };

            if password.trim().is_empty() {
                bail!("decrypt operation requires a password");
            }

            if cli.recursive {
                let count = decrypt_folder(
                    &mut encryptor,
                    &cli.input,
                    &cli.output,
                    &password,
                    cli.overwrite,
                )
                .with_context(|| format!("failed to decrypt folder {}", cli.input.display()))?;
                log::info!("decrypted {count} files into {}", cli.output.display());
            } else {
                encryptor
                    .decrypt_file(&cli.input, &cli.output, &password, cli.overwrite)
                    .with_context(|| format!("failed to decrypt {}", cli.input.display()))?;
                log::info!("decrypted {} -> {}", cli.input.display(), cli.output.display());
            }
        }
    }

    Ok(())
}
