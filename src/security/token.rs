use rand::Rng;
use rand::distr::Alphanumeric;

/// 生成随机字符串
pub fn generate_random_string(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// 生成初始管理员密码（24字符）
pub fn generate_initial_password() -> String {
    generate_random_string(24)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_initial_password() {
        let password = generate_initial_password();
        assert_eq!(password.len(), 24);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_random_string_length() {
        assert_eq!(generate_random_string(0), "");
        assert_ne!(generate_random_string(32), generate_random_string(32));
    }
}
