//! 迁移文件发现与序列校验

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::MigrationError;
use crate::tracker::MigrationTracker;
use crate::version::{format_version, parse_version};

/// 磁盘上的一个迁移文件（每次发现时重新构造，不持久化）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationFile {
    pub version: u32,
    pub path: PathBuf,
    pub raw_name: String,
    /// 文件内容的 SHA-256（十六进制）
    pub checksum: String,
}

impl MigrationFile {
    /// 记账表中使用的版本字符串
    pub fn label(&self) -> String {
        format_version(self.version)
    }
}

/// 计算内容校验和
pub fn checksum(content: &[u8]) -> String {
    format!("{:x}", Sha256::digest(content))
}

/// 扫描目录，返回按文件名字典序排列的候选迁移
///
/// 只有两位补零的版本号（01-99）时，字典序等同于版本序。
/// 不符合命名约定的文件会被跳过并记录警告。
pub fn discover(directory: &Path, extension: &str) -> Result<Vec<MigrationFile>, MigrationError> {
    let entries = fs::read_dir(directory).map_err(|source| MigrationError::Directory {
        path: directory.to_path_buf(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| MigrationError::Directory {
            path: directory.to_path_buf(),
            source,
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|ext| ext.to_str()) != Some(extension) {
            continue;
        }
        paths.push(path);
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut candidates = Vec::with_capacity(paths.len());
    for path in paths {
        let raw_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let version = match parse_version(&raw_name) {
            Ok(version) => version,
            Err(reason) => {
                tracing::warn!(
                    file = %raw_name,
                    %reason,
                    "Skipping file that does not follow <version>_<description> naming"
                );
                continue;
            }
        };

        let content = fs::read(&path).map_err(|source| MigrationError::Read {
            path: path.clone(),
            source,
        })?;

        candidates.push(MigrationFile {
            version,
            checksum: checksum(&content),
            path,
            raw_name,
        });
    }

    tracing::debug!(
        directory = %directory.display(),
        count = candidates.len(),
        "Discovered migration candidates"
    );

    Ok(candidates)
}

/// 确认候选集合是从 1 开始的连续整数序列
///
/// 遇到第一个不匹配即停止，整个候选集合被拒绝，不会绕过缺口部分执行。
pub fn validate_sequence(candidates: &[MigrationFile]) -> Result<(), MigrationError> {
    for (index, file) in candidates.iter().enumerate() {
        let expected = index as u32 + 1;
        if file.version != expected {
            tracing::error!(
                expected = %format_version(expected),
                found = %format_version(file.version),
                file = %file.raw_name,
                "Migration sequence is not contiguous"
            );
            return Err(MigrationError::SequenceGap {
                expected,
                found: file.version,
                filename: file.raw_name.clone(),
            });
        }
    }
    Ok(())
}

/// 候选集合中尚未应用的部分，保持升序
pub fn filter_pending(
    candidates: &[MigrationFile],
    applied: &BTreeSet<u32>,
) -> Vec<MigrationFile> {
    let mut pending: Vec<MigrationFile> = candidates
        .iter()
        .filter(|file| !applied.contains(&file.version))
        .cloned()
        .collect();
    pending.sort_by_key(|file| file.version);
    pending
}

/// 发现目录中的迁移，并去掉已记录为已应用的版本
pub async fn pending(
    directory: &Path,
    extension: &str,
    tracker: &MigrationTracker,
) -> Result<Vec<MigrationFile>, MigrationError> {
    let candidates = discover(directory, extension)?;
    let applied = tracker.get_applied_versions().await;
    Ok(filter_pending(&candidates, &applied))
}
