use std::fs;
use std::path::Path;

use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, KeyIvInit};
use file_encryptor::{
    Aes256Cbc, EncryptorConfig, EncryptorError, KeyDerivation, KeyDerivationScheme,
    Pbkdf2KeyDerivator, SymmetricEncryptor,
};
use rand::rngs::StdRng;
use rand::{CryptoRng, RngCore, SeedableRng};
use tempfile::tempdir;
use zeroize::Zeroizing;

const SALT_SIZE: usize = 16;
const BLOCK_SIZE: usize = 16;
const TEST_ITERATIONS: u32 = 1_000;

fn test_config() -> EncryptorConfig {
    EncryptorConfig {
        iterations: TEST_ITERATIONS,
        ..EncryptorConfig::default()
    }
}

fn encryptor() -> SymmetricEncryptor {
    SymmetricEncryptor::with_config(test_config()).expect("valid config")
}

fn write_file(path: &Path, contents: &[u8]) {
    fs::write(path, contents).expect("write input");
}

/// 依次输出 n, n+1, n+2, ... 的随机源，salt 与 IV 完全可预测
struct CountingRng(u8);

impl RngCore for CountingRng {
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        self.fill_bytes(&mut buf);
        u32::from_le_bytes(buf)
    }

    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        self.fill_bytes(&mut buf);
        u64::from_le_bytes(buf)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for byte in dest {
            *byte = self.0;
            self.0 = self.0.wrapping_add(1);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl CryptoRng for CountingRng {}

/// 忽略密码、始终返回同一把密钥的派生方案
struct FixedKeyScheme;

struct FixedKey {
    salt: Vec<u8>,
}

impl KeyDerivation for FixedKey {
    fn derive_key(&self, key_size: usize) -> Result<Zeroizing<Vec<u8>>, EncryptorError> {
        Ok(Zeroizing::new(vec![0x42; key_size]))
    }

    fn salt(&self) -> &[u8] {
        &self.salt
    }
}

impl KeyDerivationScheme for FixedKeyScheme {
    type Derivator = FixedKey;

    fn derivator(
        &self,
        _password: &str,
        salt: &[u8],
        _iterations: u32,
    ) -> Result<FixedKey, EncryptorError> {
        Ok(FixedKey {
            salt: salt.to_vec(),
        })
    }
}

#[test]
fn encrypt_decrypt_roundtrip() {
    let temp_dir = tempdir().expect("create temp dir");
    let input_path = temp_dir.path().join("input.txt");
    let encrypted_path = temp_dir.path().join("output.enc");
    let decrypted_path = temp_dir.path().join("decrypted.txt");

    let plaintext = b"file encryptor test payload";
    write_file(&input_path, plaintext);

    let mut encryptor = encryptor();
    encryptor
        .encrypt_file(&input_path, &encrypted_path, "test-password", false)
        .expect("encrypt file");
    encryptor
        .decrypt_file(&encrypted_path, &decrypted_path, "test-password", false)
        .expect("decrypt file");

    assert_eq!(fs::read(&decrypted_path).expect("read decrypted"), plaintext);
}

#[test]
fn roundtrip_with_default_parameters() {
    // 默认迭代次数走一遍完整流程
    let temp_dir = tempdir().expect("create temp dir");
    let input_path = temp_dir.path().join("input.bin");
    let encrypted_path = temp_dir.path().join("input.bin.enc");
    let decrypted_path = temp_dir.path().join("decrypted.bin");

    write_file(&input_path, b"default parameters");

    file_encryptor::encrypt(&input_path, &encrypted_path, "pw", false).expect("encrypt");
    file_encryptor::decrypt(&encrypted_path, &decrypted_path, "pw", false).expect("decrypt");

    assert_eq!(fs::read(&decrypted_path).expect("read"), b"default parameters");
}

#[test]
fn roundtrip_across_chunk_and_block_boundaries() {
    // chunk 为 2 个分组，覆盖分组 / chunk 边界两侧的长度
    let config = EncryptorConfig {
        chunk_size: 2 * BLOCK_SIZE,
        ..test_config()
    };
    let mut encryptor = SymmetricEncryptor::with_config(config).expect("valid config");
    let temp_dir = tempdir().expect("create temp dir");

    for len in [1usize, 15, 16, 17, 31, 32, 33, 64, 1000, 70_001] {
        let plaintext: Vec<u8> = (0..len).map(|i| (i * 31 % 251) as u8).collect();
        let input_path = temp_dir.path().join(format!("in-{len}"));
        let encrypted_path = temp_dir.path().join(format!("in-{len}.enc"));
        let decrypted_path = temp_dir.path().join(format!("out-{len}"));
        write_file(&input_path, &plaintext);

        encryptor
            .encrypt_file(&input_path, &encrypted_path, "chunky", false)
            .expect("encrypt");

        let container_len = fs::metadata(&encrypted_path).expect("metadata").len() as usize;
        let padded_len = (len / BLOCK_SIZE + 1) * BLOCK_SIZE;
        assert_eq!(container_len, SALT_SIZE + BLOCK_SIZE + padded_len, "len {len}");

        encryptor
            .decrypt_file(&encrypted_path, &decrypted_path, "chunky", false)
            .expect("decrypt");
        assert_eq!(fs::read(&decrypted_path).expect("read"), plaintext, "len {len}");
    }
}

#[test]
fn empty_file_produces_single_padding_block() {
    let temp_dir = tempdir().expect("create temp dir");
    let input_path = temp_dir.path().join("empty");
    let encrypted_path = temp_dir.path().join("empty.enc");
    let decrypted_path = temp_dir.path().join("empty.out");
    write_file(&input_path, b"");

    let mut encryptor = encryptor();
    encryptor
        .encrypt_file(&input_path, &encrypted_path, "pw123", false)
        .expect("encrypt");

    let size = fs::metadata(&encrypted_path).expect("metadata").len() as usize;
    assert_eq!(encryptor.header_len(), SALT_SIZE + BLOCK_SIZE);
    assert_eq!(size, SALT_SIZE + BLOCK_SIZE + BLOCK_SIZE);

    encryptor
        .decrypt_file(&encrypted_path, &decrypted_path, "pw123", false)
        .expect("decrypt");
    assert_eq!(fs::metadata(&decrypted_path).expect("metadata").len(), 0);
}

#[test]
fn ten_byte_file_scenario() {
    let temp_dir = tempdir().expect("create temp dir");
    let input_path = temp_dir.path().join("digits.txt");
    let encrypted_path = temp_dir.path().join("digits.enc");
    let decrypted_path = temp_dir.path().join("digits.out");
    let wrong_path = temp_dir.path().join("digits.wrong");
    write_file(&input_path, b"0123456789");

    // salt = 00..0f，IV = 10..1f
    let mut encryptor =
        SymmetricEncryptor::with_parts(Aes256Cbc, CountingRng(0), test_config()).expect("config");
    encryptor
        .encrypt_file(&input_path, &encrypted_path, "pw123", false)
        .expect("encrypt");

    let container = fs::read(&encrypted_path).expect("read");
    let expected_header: Vec<u8> = (0u8..32).collect();
    assert_eq!(container.len(), SALT_SIZE + BLOCK_SIZE + BLOCK_SIZE);
    assert_eq!(container[..SALT_SIZE + BLOCK_SIZE], expected_header[..]);
    assert_eq!(
        container[SALT_SIZE + BLOCK_SIZE..],
        [
            0x76, 0x02, 0x6e, 0xf3, 0x4d, 0x06, 0x11, 0x00, 0xfa, 0x72, 0xf9, 0x64, 0x02, 0xbf,
            0xdf, 0x81,
        ]
    );

    encryptor
        .decrypt_file(&encrypted_path, &decrypted_path, "pw123", false)
        .expect("decrypt");
    assert_eq!(fs::read(&decrypted_path).expect("read"), b"0123456789");

    // 该容器在密码 "wrong" 下解出的末字节为 0x2e，填充必然非法
    let err = encryptor
        .decrypt_file(&encrypted_path, &wrong_path, "wrong", false)
        .expect_err("wrong password");
    assert!(matches!(err, EncryptorError::CryptographicIntegrity));
    assert!(!wrong_path.exists());
}

#[test]
fn custom_key_derivation_scheme_is_used() {
    let temp_dir = tempdir().expect("create temp dir");
    let input_path = temp_dir.path().join("input.txt");
    let encrypted_path = temp_dir.path().join("input.enc");
    let decrypted_path = temp_dir.path().join("output.txt");
    let plaintext = b"key comes from the injected scheme";
    write_file(&input_path, plaintext);

    let mut encryptor = encryptor().with_kdf(FixedKeyScheme);
    encryptor
        .encrypt_file(&input_path, &encrypted_path, "alpha", false)
        .expect("encrypt");

    // 固定密钥与密码无关，换密码同样能解开
    encryptor
        .decrypt_file(&encrypted_path, &decrypted_path, "beta", false)
        .expect("decrypt");
    assert_eq!(fs::read(&decrypted_path).expect("read"), plaintext);

    let container = fs::read(&encrypted_path).expect("read");
    let (_, rest) = container.split_at(SALT_SIZE);
    let (iv, body) = rest.split_at(BLOCK_SIZE);
    let mut buf = body.to_vec();
    let decrypted = cbc::Decryptor::<Aes256>::new_from_slices(&[0x42; 32], iv)
        .expect("key and iv lengths")
        .decrypt_padded_mut::<Pkcs7>(&mut buf)
        .expect("valid padding");
    assert_eq!(decrypted, plaintext);
}

#[test]
fn wrong_password_is_detected_in_most_cases() {
    let temp_dir = tempdir().expect("create temp dir");
    let input_path = temp_dir.path().join("input.txt");
    write_file(&input_path, b"sixteen byte msg and then some more");

    let mut encryptor = encryptor();
    let mut detected = 0;

    for i in 0..16 {
        let encrypted_path = temp_dir.path().join(format!("{i}.enc"));
        let output_path = temp_dir.path().join(format!("{i}.out"));
        encryptor
            .encrypt_file(&input_path, &encrypted_path, "correct-password", false)
            .expect("encrypt");

        match encryptor.decrypt_file(&encrypted_path, &output_path, &format!("wrong-{i}"), false) {
            Err(EncryptorError::CryptographicIntegrity) => {
                assert!(!output_path.exists(), "no output after failed decrypt");
                detected += 1;
            }
            Ok(()) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert!(detected >= 12, "only {detected} of 16 wrong passwords detected");
}

#[test]
fn encrypting_twice_yields_different_containers() {
    let temp_dir = tempdir().expect("create temp dir");
    let input_path = temp_dir.path().join("input.txt");
    let first = temp_dir.path().join("first.enc");
    let second = temp_dir.path().join("second.enc");
    write_file(&input_path, b"same plaintext, same password");

    let mut encryptor = encryptor();
    encryptor.encrypt_file(&input_path, &first, "pw", false).expect("encrypt");
    encryptor.encrypt_file(&input_path, &second, "pw", false).expect("encrypt");

    let first_bytes = fs::read(&first).expect("read");
    let second_bytes = fs::read(&second).expect("read");
    assert_ne!(first_bytes[..SALT_SIZE], second_bytes[..SALT_SIZE], "salt reused");
    assert_ne!(
        first_bytes[SALT_SIZE..SALT_SIZE + BLOCK_SIZE],
        second_bytes[SALT_SIZE..SALT_SIZE + BLOCK_SIZE],
        "IV reused"
    );

    for (i, container) in [&first, &second].into_iter().enumerate() {
        let out = temp_dir.path().join(format!("out-{i}"));
        encryptor.decrypt_file(container, &out, "pw", false).expect("decrypt");
        assert_eq!(fs::read(&out).expect("read"), b"same plaintext, same password");
    }
}

#[test]
fn seeded_random_source_gives_reproducible_containers() {
    let temp_dir = tempdir().expect("create temp dir");
    let input_path = temp_dir.path().join("input.txt");
    let first = temp_dir.path().join("first.enc");
    let second = temp_dir.path().join("second.enc");
    write_file(&input_path, b"deterministic");

    for path in [&first, &second] {
        let mut encryptor = SymmetricEncryptor::with_parts(
            Aes256Cbc,
            StdRng::seed_from_u64(7),
            test_config(),
        )
        .expect("valid config");
        encryptor.encrypt_file(&input_path, path, "pw", false).expect("encrypt");
    }

    assert_eq!(fs::read(&first).expect("read"), fs::read(&second).expect("read"));
}

#[test]
fn container_layout_is_salt_iv_ciphertext() {
    // 不经过本 crate 的流式解密，直接按布局解析容器
    let temp_dir = tempdir().expect("create temp dir");
    let input_path = temp_dir.path().join("input.txt");
    let encrypted_path = temp_dir.path().join("input.enc");
    let plaintext = b"layout check: salt, then IV, then CBC ciphertext";
    write_file(&input_path, plaintext);

    encryptor()
        .encrypt_file(&input_path, &encrypted_path, "layout", false)
        .expect("encrypt");

    let container = fs::read(&encrypted_path).expect("read");
    let (salt, rest) = container.split_at(SALT_SIZE);
    let (iv, body) = rest.split_at(BLOCK_SIZE);
    assert_eq!(body.len() % BLOCK_SIZE, 0);

    let key = Pbkdf2KeyDerivator::with_salt("layout", salt)
        .and_then(|d| d.with_iterations(TEST_ITERATIONS))
        .expect("derivator")
        .derive_key(32)
        .expect("derive key");

    let mut buf = body.to_vec();
    let decrypted = cbc::Decryptor::<Aes256>::new_from_slices(&key, iv)
        .expect("key and iv lengths")
        .decrypt_padded_mut::<Pkcs7>(&mut buf)
        .expect("valid padding");

    assert_eq!(decrypted, plaintext);
}

#[test]
fn missing_input_is_not_found() {
    let temp_dir = tempdir().expect("create temp dir");
    let missing = temp_dir.path().join("missing.txt");
    let output_path = temp_dir.path().join("output.enc");

    let mut encryptor = encryptor();

    let err = encryptor
        .encrypt_file(&missing, &output_path, "pw", false)
        .expect_err("encrypt should fail");
    assert!(matches!(err, EncryptorError::NotFound(_)));

    let err = encryptor
        .decrypt_file(&missing, &output_path, "pw", false)
        .expect_err("decrypt should fail");
    assert!(matches!(err, EncryptorError::NotFound(_)));

    assert!(!output_path.exists());
}

#[test]
fn existing_output_requires_overwrite() {
    let temp_dir = tempdir().expect("create temp dir");
    let input_path = temp_dir.path().join("input.txt");
    let output_path = temp_dir.path().join("output.enc");
    let decrypted_path = temp_dir.path().join("decrypted.txt");
    write_file(&input_path, b"payload");
    write_file(&output_path, b"keep me");
    write_file(&decrypted_path, b"keep me too");

    let mut encryptor = encryptor();

    let err = encryptor
        .encrypt_file(&input_path, &output_path, "pw", false)
        .expect_err("conflict");
    assert!(matches!(err, EncryptorError::Conflict(_)));
    assert_eq!(fs::read(&output_path).expect("read"), b"keep me");

    encryptor
        .encrypt_file(&input_path, &output_path, "pw", true)
        .expect("overwrite");
    assert_ne!(fs::read(&output_path).expect("read"), b"keep me");

    let err = encryptor
        .decrypt_file(&output_path, &decrypted_path, "pw", false)
        .expect_err("conflict");
    assert!(matches!(err, EncryptorError::Conflict(_)));
    assert_eq!(fs::read(&decrypted_path).expect("read"), b"keep me too");

    encryptor
        .decrypt_file(&output_path, &decrypted_path, "pw", true)
        .expect("overwrite");
    assert_eq!(fs::read(&decrypted_path).expect("read"), b"payload");
}

#[test]
fn decrypt_rejects_blank_password() {
    let temp_dir = tempdir().expect("create temp dir");
    let input_path = temp_dir.path().join("input.txt");
    let encrypted_path = temp_dir.path().join("input.enc");
    let output_path = temp_dir.path().join("output.txt");
    write_file(&input_path, b"payload");

    let mut encryptor = encryptor();
    encryptor
        .encrypt_file(&input_path, &encrypted_path, "pw", false)
        .expect("encrypt");

    for password in ["", "   ", "\t\n"] {
        let err = encryptor
            .decrypt_file(&encrypted_path, &output_path, password, false)
            .expect_err("blank password");
        assert!(matches!(err, EncryptorError::InvalidArgument(_)));
    }
    assert!(!output_path.exists());
}

#[test]
fn decrypt_rejects_truncated_header() {
    let temp_dir = tempdir().expect("create temp dir");
    let output_path = temp_dir.path().join("output.txt");

    for len in [0usize, 8, SALT_SIZE, SALT_SIZE + BLOCK_SIZE - 1] {
        let bad_path = temp_dir.path().join(format!("short-{len}.enc"));
        write_file(&bad_path, &vec![0xAB; len]);

        let err = encryptor()
            .decrypt_file(&bad_path, &output_path, "pw", false)
            .expect_err("short container");
        assert!(matches!(err, EncryptorError::MalformedContainer(_)), "len {len}");
        assert!(!output_path.exists());
    }
}

#[test]
fn header_only_container_decrypts_to_empty_file() {
    let temp_dir = tempdir().expect("create temp dir");
    let container_path = temp_dir.path().join("header-only.enc");
    let output_path = temp_dir.path().join("output.txt");
    write_file(&container_path, &[0x11; SALT_SIZE + BLOCK_SIZE]);

    encryptor()
        .decrypt_file(&container_path, &output_path, "pw", false)
        .expect("decrypt");
    assert_eq!(fs::metadata(&output_path).expect("metadata").len(), 0);
}

#[test]
fn truncated_ciphertext_fails_integrity_check() {
    let temp_dir = tempdir().expect("create temp dir");
    let input_path = temp_dir.path().join("input.txt");
    let encrypted_path = temp_dir.path().join("input.enc");
    let output_path = temp_dir.path().join("output.txt");
    write_file(&input_path, &[7u8; 100]);

    let mut encryptor = encryptor();
    encryptor
        .encrypt_file(&input_path, &encrypted_path, "pw", false)
        .expect("encrypt");

    let mut container = fs::read(&encrypted_path).expect("read");
    container.truncate(container.len() - 5);
    fs::write(&encrypted_path, &container).expect("rewrite");

    let err = encryptor
        .decrypt_file(&encrypted_path, &output_path, "pw", false)
        .expect_err("truncated");
    assert!(matches!(err, EncryptorError::CryptographicIntegrity));
    assert!(!output_path.exists());
}

#[test]
fn invalid_config_is_rejected() {
    let bad_salt = EncryptorConfig {
        salt_size: 7,
        ..test_config()
    };
    assert!(matches!(
        SymmetricEncryptor::with_config(bad_salt),
        Err(EncryptorError::InvalidArgument(_))
    ));

    let bad_chunk = EncryptorConfig {
        chunk_size: BLOCK_SIZE + 1,
        ..test_config()
    };
    assert!(matches!(
        SymmetricEncryptor::with_config(bad_chunk),
        Err(EncryptorError::InvalidArgument(_))
    ));

    let bad_iterations = EncryptorConfig {
        iterations: 0,
        ..test_config()
    };
    assert!(matches!(
        SymmetricEncryptor::with_config(bad_iterations),
        Err(EncryptorError::InvalidArgument(_))
    ));
}
