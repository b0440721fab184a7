use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use crate::error::{AppError, AppResult, ConfigError};
use crate::models::loaders::read_json;

/// 共享配置（config.json）
///
/// - `arguments`: CreateHIT 默认参数
/// - `commons`: 渲染时覆盖到每条源记录上的公共字段
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SharedConfig {
    #[serde(default)]
    pub arguments: Map<String, JsonValue>,
    #[serde(default)]
    pub commons: Map<String, JsonValue>,
}

impl SharedConfig {
    pub fn load(path: &Path) -> AppResult<Self> {
        read_json(path)
    }

    /// CreateHIT 的默认标题
    pub fn title(&self, path: &Path) -> AppResult<String> {
        self.arguments
            .get("Title")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::Config(ConfigError::InvalidSharedConfig {
                    path: path.display().to_string(),
                    reason: "arguments.Title 缺失或不是字符串".to_string(),
                })
            })
    }
}

/// CreateHIT 返回的关键 ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedHit {
    pub hit_id: String,
    pub hit_type_id: String,
    pub hit_group_id: String,
}

/// 提交事件通知设置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSpec {
    pub destination: String,
    pub transport: String,
    pub version: String,
    pub event_types: Vec<String>,
}

impl NotificationSpec {
    /// 工人提交作业时通知 SQS 队列
    pub fn assignment_submitted(queue_url: &str) -> Self {
        Self {
            destination: queue_url.to_string(),
            transport: "SQS".to_string(),
            version: "2014-08-15".to_string(),
            event_types: vec!["AssignmentSubmitted".to_string()],
        }
    }
}
