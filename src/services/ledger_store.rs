//! 账本服务 - 业务能力层
//!
//! 每次发布写一份新的快照 `out_<时间戳>.json`，读取时按文件名升序合并，
//! 同名键以后写入的快照为准

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::loaders::{list_files_with_suffix, read_json};
use crate::models::LedgerSnapshot;

const SNAPSHOT_PREFIX: &str = "out_";
const SNAPSHOT_SUFFIX: &str = ".json";

/// 账本存储
#[derive(Debug, Clone)]
pub struct LedgerStore {
    out_folder: PathBuf,
}

impl LedgerStore {
    pub fn new(out_folder: impl Into<PathBuf>) -> Self {
        Self {
            out_folder: out_folder.into(),
        }
    }

    /// 写入一份新快照，从不覆盖已有文件
    pub fn write_snapshot(&self, snapshot: &LedgerSnapshot) -> AppResult<PathBuf> {
        let stamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S%.6f").to_string();
        self.write_snapshot_at(snapshot, &stamp)
    }

    /// 以给定时间戳命名写入；同名文件已存在时追加 `_NNN`
    fn write_snapshot_at(&self, snapshot: &LedgerSnapshot, stamp: &str) -> AppResult<PathBuf> {
        let content = serde_json::to_string_pretty(snapshot)
            .map_err(|e| AppError::file_write_failed(self.out_folder.display().to_string(), e))?;

        let mut attempt = 0usize;
        loop {
            let name = if attempt == 0 {
                format!("{}{}{}", SNAPSHOT_PREFIX, stamp, SNAPSHOT_SUFFIX)
            } else {
                format!("{}{}_{:03}{}", SNAPSHOT_PREFIX, stamp, attempt, SNAPSHOT_SUFFIX)
            };
            let path = self.out_folder.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(content.as_bytes())
                        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
                    info!(
                        "📒 账本快照已保存: {} (题目 {} 个, 资格 {} 个)",
                        path.display(),
                        snapshot.question_map.len(),
                        snapshot.qualification_map.len()
                    );
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(AppError::file_write_failed(path.display().to_string(), e)),
            }
        }
    }

    /// 所有快照文件，按文件名升序
    pub fn snapshot_files(&self) -> AppResult<Vec<PathBuf>> {
        Ok(list_files_with_suffix(&self.out_folder, SNAPSHOT_SUFFIX)?
            .into_iter()
            .filter(|path| is_snapshot(path))
            .collect())
    }

    /// 合并所有快照
    pub fn merged(&self) -> AppResult<LedgerSnapshot> {
        let mut ledger = LedgerSnapshot::default();
        for path in self.snapshot_files()? {
            debug!("合并账本快照: {}", path.display());
            let snapshot: LedgerSnapshot = read_json(&path)?;
            ledger.absorb(snapshot);
        }
        Ok(ledger)
    }
}

fn is_snapshot(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with(SNAPSHOT_PREFIX))
        .unwrap_or(false)
}
