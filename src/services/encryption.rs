// 对象加密服务
//
// 整对象加解密：除 id 与 modelVersion 外的全部字段序列化后以
// XChaCha20-Poly1305 加密，密文存入 encryptedDataBase64 字段。
// id（若存在）作为附加认证数据绑定密文，密钥由用户口令经 Argon2id 派生。

use crate::models::record::{Record, ENCRYPTED_DATA_FIELD, ID_FIELD, MODEL_VERSION_FIELD};
use crate::services::filter::FilterOptions;
use argon2::{Algorithm, Argon2, Params, Version};
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;
use chacha20poly1305::aead::{Aead, Payload};
use chacha20poly1305::{KeyInit, XChaCha20Poly1305, XNonce};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

const NONCE_LEN: usize = 24;

/// 加密服务错误类型
#[derive(Error, Debug)]
pub enum EncryptionError {
    /// 转换选项中未携带加密上下文
    #[error("未设置加密上下文，无法加解密对象")]
    MissingContext,

    /// Argon2 密钥派生失败
    #[error("密钥派生失败")]
    KeyDerivation,

    /// 数据库对象缺少密文字段
    #[error("对象缺少加密载荷字段 encryptedDataBase64")]
    MissingCipherField,

    /// 密文不是合法 base64
    #[error("加密载荷 base64 解码失败: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// 密文长度不足以包含 nonce
    #[error("加密载荷过短")]
    CiphertextTooShort,

    /// AEAD 加解密失败（密钥错误或密文被篡改）
    #[error("对象加解密失败")]
    Aead,

    /// 明文载荷序列化/反序列化失败
    #[error("加密载荷序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Argon2id 派生参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KdfParams {
    pub m_cost_kib: u32,
    pub t_cost: u32,
    pub p_cost: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            m_cost_kib: 64 * 1024,
            t_cost: 3,
            p_cost: 1,
        }
    }
}

impl KdfParams {
    /// 测试用低强度参数
    pub fn for_test() -> Self {
        Self {
            m_cost_kib: 1024,
            t_cost: 1,
            p_cost: 1,
        }
    }
}

/// 加密上下文：一次登录会话派生出的对象加密密钥
#[derive(Clone)]
pub struct CryptoContext {
    key: [u8; 32],
}

impl CryptoContext {
    /// 从用户口令派生密钥
    pub fn derive(
        password: &str,
        salt: &[u8],
        params: &KdfParams,
    ) -> Result<Self, EncryptionError> {
        let argon_params = Params::new(params.m_cost_kib, params.t_cost, params.p_cost, Some(32))
            .map_err(|_| EncryptionError::KeyDerivation)?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params);

        let mut key = [0u8; 32];
        argon2
            .hash_password_into(password.as_bytes(), salt, &mut key)
            .map_err(|_| EncryptionError::KeyDerivation)?;
        Ok(Self { key })
    }

    /// 直接使用既有密钥（用于密钥已由外部保管的场景）
    pub fn from_key(key: [u8; 32]) -> Self {
        Self { key }
    }
}

impl std::fmt::Debug for CryptoContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 密钥不进入日志
        f.debug_struct("CryptoContext").finish_non_exhaustive()
    }
}

/// 加密单个对象（live → database 链的最后一步）
///
/// id 与 modelVersion 保持明文，其余字段整体进入密文。
pub fn encrypt_object(
    mut record: Record,
    options: &FilterOptions,
) -> Result<Record, EncryptionError> {
    let context = options
        .crypto
        .as_ref()
        .ok_or(EncryptionError::MissingContext)?;

    let id = record.remove(ID_FIELD);
    let model_version = record.remove(MODEL_VERSION_FIELD);

    let aad = aad_of(id.as_ref());
    let plaintext = serde_json::to_vec(&record)?;
    let blob = encrypt_bytes(&context.key, &plaintext, aad.as_bytes())?;

    let mut encrypted = Record::new();
    if let Some(id) = id {
        encrypted.insert(ID_FIELD.to_string(), id);
    }
    if let Some(version) = model_version {
        encrypted.insert(MODEL_VERSION_FIELD.to_string(), version);
    }
    encrypted.insert(ENCRYPTED_DATA_FIELD.to_string(), Value::String(B64.encode(blob)));
    Ok(encrypted)
}

/// 解密单个对象（database → live 链的第一步）
///
/// 解密出的字段与外层明文 id/modelVersion 合并，外层值优先。
/// 函数名与批量接口保持一致，实际在管线的逐对象循环中调用。
pub fn decrypt_objects(
    mut record: Record,
    options: &FilterOptions,
) -> Result<Record, EncryptionError> {
    let context = options
        .crypto
        .as_ref()
        .ok_or(EncryptionError::MissingContext)?;

    let encoded = match record.remove(ENCRYPTED_DATA_FIELD) {
        Some(Value::String(encoded)) => encoded,
        _ => return Err(EncryptionError::MissingCipherField),
    };
    let blob = B64.decode(encoded)?;

    let aad = aad_of(record.get(ID_FIELD));
    let plaintext = decrypt_bytes(&context.key, &blob, aad.as_bytes())?;
    let mut decrypted: Record = serde_json::from_slice(&plaintext)?;

    for field in [ID_FIELD, MODEL_VERSION_FIELD] {
        if let Some(value) = record.remove(field) {
            decrypted.insert(field.to_string(), value);
        }
    }
    Ok(decrypted)
}

/// 对象 id 作为附加认证数据；无 id 时为空
fn aad_of(id: Option<&Value>) -> String {
    id.and_then(Value::as_str).unwrap_or_default().to_string()
}

fn encrypt_bytes(key: &[u8; 32], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    let cipher = XChaCha20Poly1305::new_from_slice(key).map_err(|_| EncryptionError::Aead)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = XNonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(
            nonce,
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|_| EncryptionError::Aead)?;

    let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

fn decrypt_bytes(key: &[u8; 32], blob: &[u8], aad: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    if blob.len() < NONCE_LEN {
        return Err(EncryptionError::CiphertextTooShort);
    }

    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
    let cipher = XChaCha20Poly1305::new_from_slice(key).map_err(|_| EncryptionError::Aead)?;
    let nonce = XNonce::from_slice(nonce_bytes);

    cipher
        .decrypt(
            nonce,
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|_| EncryptionError::Aead)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn test_options() -> FilterOptions {
        FilterOptions {
            crypto: Some(Arc::new(CryptoContext::from_key([7u8; 32]))),
            ..Default::default()
        }
    }

    fn record(value: serde_json::Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let options = test_options();
        let original = record(json!({
            "id": "grid-element-1",
            "modelVersion": "1.0.0",
            "label": "Hi",
            "actions": ["speak"]
        }));

        let encrypted = encrypt_object(original.clone(), &options).unwrap();
        assert_eq!(encrypted["id"], "grid-element-1");
        assert_eq!(encrypted["modelVersion"], "1.0.0");
        assert!(encrypted.contains_key(ENCRYPTED_DATA_FIELD));
        assert!(!encrypted.contains_key("label"));

        let decrypted = decrypt_objects(encrypted, &options).unwrap();
        assert_eq!(decrypted, original);
    }

    #[test]
    fn test_encrypt_without_id() {
        let options = test_options();
        let original = record(json!({ "label": "Bye" }));
        let encrypted = encrypt_object(original.clone(), &options).unwrap();
        let decrypted = decrypt_objects(encrypted, &options).unwrap();
        assert_eq!(decrypted, original);
    }

    #[test]
    fn test_decrypt_rejects_tampered_payload() {
        let options = test_options();
        let encrypted = encrypt_object(record(json!({"id": "e1", "label": "Hi"})), &options).unwrap();

        let mut tampered = encrypted.clone();
        let mut blob = B64
            .decode(tampered[ENCRYPTED_DATA_FIELD].as_str().unwrap())
            .unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0xff;
        tampered.insert(
            ENCRYPTED_DATA_FIELD.to_string(),
            Value::String(B64.encode(blob)),
        );

        assert!(matches!(
            decrypt_objects(tampered, &options),
            Err(EncryptionError::Aead)
        ));
    }

    #[test]
    fn test_decrypt_rejects_foreign_id() {
        // id 参与认证，换 id 后解密必须失败
        let options = test_options();
        let mut encrypted =
            encrypt_object(record(json!({"id": "e1", "label": "Hi"})), &options).unwrap();
        encrypted.insert(ID_FIELD.to_string(), json!("e2"));

        assert!(matches!(
            decrypt_objects(encrypted, &options),
            Err(EncryptionError::Aead)
        ));
    }

    #[test]
    fn test_decrypt_requires_cipher_field() {
        let options = test_options();
        let result = decrypt_objects(record(json!({"label": "plain"})), &options);
        assert!(matches!(result, Err(EncryptionError::MissingCipherField)));
    }

    #[test]
    fn test_missing_context() {
        let options = FilterOptions::default();
        let result = encrypt_object(record(json!({"label": "Hi"})), &options);
        assert!(matches!(result, Err(EncryptionError::MissingContext)));
    }

    #[test]
    fn test_derive_key_is_deterministic() {
        let params = KdfParams::for_test();
        let a = CryptoContext::derive("password", b"salt-123456", &params).unwrap();
        let b = CryptoContext::derive("password", b"salt-123456", &params).unwrap();
        assert_eq!(a.key, b.key);

        let c = CryptoContext::derive("other", b"salt-123456", &params).unwrap();
        assert_ne!(a.key, c.key);
    }
}
