//! 迁移文件名解析
//!
//! 文件名约定: `<version>_<description>.<ext>`，`version` 为十进制整数（通常补零到两位）。

use thiserror::Error;

/// 文件名不符合命名约定的原因
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    #[error("missing `_` separator after the version prefix")]
    MissingSeparator,

    #[error("version prefix `{0}` is not a non-negative integer")]
    NotNumeric(String),

    #[error("version prefix `{0}` is out of range")]
    OutOfRange(String),
}

/// 从文件名中解析版本号
///
/// 取第一个 `_` 之前的部分，必须全部为 ASCII 数字（不允许符号和小数点）。
pub fn parse_version(file_name: &str) -> Result<u32, VersionParseError> {
    let (prefix, _) = file_name
        .split_once('_')
        .ok_or(VersionParseError::MissingSeparator)?;

    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VersionParseError::NotNumeric(prefix.to_string()));
    }

    prefix
        .parse::<u32>()
        .map_err(|_| VersionParseError::OutOfRange(prefix.to_string()))
}

/// 记账表中的规范版本字符串（至少两位，补零）
pub fn format_version(version: u32) -> String {
    format!("{:02}", version)
}

/// 解析记账表中保存的版本字符串
pub fn parse_stored_version(stored: &str) -> Option<u32> {
    if stored.is_empty() || !stored.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stored.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version_zero_padded() {
        assert_eq!(parse_version("01_init.sql"), Ok(1));
        assert_eq!(parse_version("12_add_index.sql"), Ok(12));
        assert_eq!(parse_version("007_create_posts_table.sql"), Ok(7));
    }

    #[test]
    fn test_parse_version_only_first_segment_counts() {
        assert_eq!(parse_version("03_2024_backfill.sql"), Ok(3));
    }

    #[test]
    fn test_parse_version_missing_separator() {
        assert_eq!(
            parse_version("README.md"),
            Err(VersionParseError::MissingSeparator)
        );
        assert_eq!(
            parse_version("01.sql"),
            Err(VersionParseError::MissingSeparator)
        );
    }

    #[test]
    fn test_parse_version_rejects_non_numeric_prefix() {
        assert!(matches!(
            parse_version("template_table.sql"),
            Err(VersionParseError::NotNumeric(_))
        ));
        assert!(matches!(
            parse_version("-1_negative.sql"),
            Err(VersionParseError::NotNumeric(_))
        ));
        assert!(matches!(
            parse_version("+2_signed.sql"),
            Err(VersionParseError::NotNumeric(_))
        ));
        assert!(matches!(
            parse_version("1.5_decimal.sql"),
            Err(VersionParseError::NotNumeric(_))
        ));
        assert!(matches!(
            parse_version("_leading.sql"),
            Err(VersionParseError::NotNumeric(_))
        ));
    }

    #[test]
    fn test_parse_version_overflow() {
        assert!(matches!(
            parse_version("99999999999_huge.sql"),
            Err(VersionParseError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_format_and_parse_stored_version() {
        assert_eq!(format_version(1), "01");
        assert_eq!(format_version(42), "42");
        assert_eq!(format_version(120), "120");
        assert_eq!(parse_stored_version("01"), Some(1));
        assert_eq!(parse_stored_version("1"), Some(1));
        assert_eq!(parse_stored_version("v1"), None);
        assert_eq!(parse_stored_version(""), None);
    }
}
