//! 迁移状态报告（只读）

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::discover::{discover, filter_pending, validate_sequence, MigrationFile};
use crate::error::MigrationError;
use crate::runner::MigrationOptions;
use crate::tracker::{MigrationRecord, MigrationTracker};

/// 已应用但磁盘内容已改变的迁移
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecksumDrift {
    pub version: u32,
    pub filename: String,
    pub recorded: String,
    pub current: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    /// 记账表历史，从新到旧
    pub history: Vec<MigrationRecord>,
    /// 已应用版本（升序）
    pub applied: Vec<u32>,
    /// 待执行的迁移（升序）
    pub pending: Vec<MigrationFile>,
    /// 候选集合不连续时的错误描述
    pub sequence_error: Option<String>,
    pub drift: Vec<ChecksumDrift>,
    /// 读取记账表时遇到的错误；非空时报告只反映部分状态
    pub read_errors: Vec<String>,
}

impl StatusReport {
    pub fn is_up_to_date(&self) -> bool {
        self.pending.is_empty() && self.sequence_error.is_none()
    }
}

/// 汇总记账表历史与磁盘上的待执行列表
///
/// 记账表读取失败只降级（空历史、不做漂移检查），待执行列表照常由磁盘计算；
/// 只有迁移目录本身不可读才返回错误。
pub async fn collect_status(
    tracker: &MigrationTracker,
    options: &MigrationOptions,
) -> Result<StatusReport, MigrationError> {
    let candidates = discover(&options.directory, &options.extension)?;
    let mut read_errors = Vec::new();

    let history = tracker.get_history().await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to read migration history");
        read_errors.push(format!("history unavailable: {}", e));
        Vec::new()
    });
    let applied = tracker.get_applied_versions().await;
    let stored = tracker.get_checksums().await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to read stored checksums");
        read_errors.push(format!("checksums unavailable: {}", e));
        BTreeMap::new()
    });

    Ok(assemble(candidates, history, applied, stored, read_errors))
}

/// 无法使用数据库时只根据磁盘汇总，所有候选都列为待执行
pub fn collect_offline_status(
    options: &MigrationOptions,
    reason: &str,
) -> Result<StatusReport, MigrationError> {
    let candidates = discover(&options.directory, &options.extension)?;
    Ok(assemble(
        candidates,
        Vec::new(),
        BTreeSet::new(),
        BTreeMap::new(),
        vec![format!("database unavailable: {}", reason)],
    ))
}

fn assemble(
    candidates: Vec<MigrationFile>,
    history: Vec<MigrationRecord>,
    applied: BTreeSet<u32>,
    stored: BTreeMap<u32, Option<String>>,
    read_errors: Vec<String>,
) -> StatusReport {
    let sequence_error = validate_sequence(&candidates).err().map(|e| e.to_string());
    let pending = filter_pending(&candidates, &applied);

    let drift = candidates
        .iter()
        .filter_map(|file| match stored.get(&file.version) {
            Some(Some(recorded)) if recorded != &file.checksum => Some(ChecksumDrift {
                version: file.version,
                filename: file.raw_name.clone(),
                recorded: recorded.clone(),
                current: file.checksum.clone(),
            }),
            _ => None,
        })
        .collect();

    StatusReport {
        history,
        applied: applied.into_iter().collect(),
        pending,
        sequence_error,
        drift,
        read_errors,
    }
}
