//! 活动日志服务 - 业务能力层
//!
//! 只负责"追加写 log.txt"能力

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::error::{AppError, AppResult};

/// 活动日志
///
/// 每条记录占三行：本地时间、消息、25 个短横线
#[derive(Debug, Clone)]
pub struct ActivityLog {
    log_file_path: PathBuf,
    also_print: bool,
}

impl ActivityLog {
    /// 创建新的活动日志
    pub fn new(log_file_path: impl Into<PathBuf>, also_print: bool) -> Self {
        Self {
            log_file_path: log_file_path.into(),
            also_print,
        }
    }

    /// 追加一条记录，是否输出到控制台由配置决定
    pub fn record(&self, message: &str) -> AppResult<()> {
        self.write_entry(message)?;
        if self.also_print {
            info!("{}", message);
        } else {
            debug!("{}", message);
        }
        Ok(())
    }

    /// 追加一条记录，并总是输出到控制台
    pub fn announce(&self, message: &str) -> AppResult<()> {
        self.write_entry(message)?;
        info!("{}", message);
        Ok(())
    }

    fn write_entry(&self, message: &str) -> AppResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file_path)
            .map_err(|e| AppError::file_write_failed(self.log_file_path.display().to_string(), e))?;

        let entry = format!(
            "{}\n{}\n{}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.6f"),
            message,
            "-".repeat(25)
        );

        file.write_all(entry.as_bytes())
            .map_err(|e| AppError::file_write_failed(self.log_file_path.display().to_string(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_entries_are_appended() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.txt");
        let log = ActivityLog::new(path.clone(), false);

        log.record("first").unwrap();
        log.announce("second").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[1], "first");
        assert_eq!(lines[2], "-".repeat(25));
        assert_eq!(lines[4], "second");
    }
}
