use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::errors::AppError;

pub struct PasswordManager;

impl PasswordManager {
    /// 对密码进行哈希加密（Argon2id，PHC 字符串格式）
    pub fn hash_password(password: &str) -> Result<String, AppError> {
        let salt = SaltString::encode_b64(&rand::random::<[u8; 16]>())
            .map_err(|e| AppError::Internal(format!("Password salt failed: {}", e)))?;

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Password hash failed: {}", e)))
    }

    /// 验证密码是否匹配
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Password verify failed: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}
