use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{AppError, AppResult, ConfigError};
use crate::models::envelope::HTML_QUESTION_ENVELOPE;
use crate::models::loaders::read_json;
use crate::models::PaymentMode;

/// 工作区参数文件名
pub const DEFAULT_ARGS_FILE: &str = "default_args.json";

/// 程序运行配置（来自环境变量）
#[derive(Clone, Debug)]
pub struct Config {
    /// 工作区目录（包含 default_args.json）
    pub workspace: PathBuf,
    /// 要执行的命令
    pub command: String,
    /// 强制使用真钱模式，未设置时沿用 default_args.json
    pub pay_real_money: Option<bool>,
    /// 发布时按题目名前缀屏蔽已做过的工人
    pub block_by_same_name: bool,
    /// 发布时给标题追加序号
    pub alter_names: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 覆盖 MTurk 端点（测试用）
    pub endpoint_override: Option<String>,
    /// AWS 区域
    pub region: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace: PathBuf::from("."),
            command: "render".to_string(),
            pay_real_money: None,
            block_by_same_name: false,
            alter_names: true,
            verbose_logging: false,
            endpoint_override: None,
            region: "us-east-1".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        let default = Self::default();
        Ok(Self {
            workspace: std::env::var("TURCO_WORKSPACE").map(PathBuf::from).unwrap_or(default.workspace),
            command: std::env::var("TURCO_COMMAND").unwrap_or(default.command),
            pay_real_money: parse_env_flag("TURCO_PAY_REAL_MONEY")?.or(default.pay_real_money),
            block_by_same_name: parse_env_flag("TURCO_BLOCK_BY_SAME_NAME")?.unwrap_or(default.block_by_same_name),
            alter_names: parse_env_flag("TURCO_ALTER_NAMES")?.unwrap_or(default.alter_names),
            verbose_logging: parse_env_flag("VERBOSE_LOGGING")?.unwrap_or(default.verbose_logging),
            endpoint_override: std::env::var("TURCO_MTURK_ENDPOINT").ok().or(default.endpoint_override),
            region: std::env::var("TURCO_REGION").unwrap_or(default.region),
        })
    }
}

fn parse_env_flag(var_name: &str) -> AppResult<Option<bool>> {
    match std::env::var(var_name) {
        Ok(value) => value.parse::<bool>().map(Some).map_err(|_| {
            AppError::Config(ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: "bool".to_string(),
            })
        }),
        Err(_) => Ok(None),
    }
}

/// 工作区参数（default_args.json）
#[derive(Clone, Debug, Deserialize)]
pub struct WorkspaceArgs {
    #[serde(default)]
    pub pay_real_money: bool,
    /// 共享配置（arguments + commons）
    pub config_path: PathBuf,
    /// 密钥文件
    pub secrets_path: PathBuf,
    /// 题目模板
    pub template_path: PathBuf,
    /// 追加写入的活动日志
    pub logs_path: PathBuf,
    pub src_folder_path: PathBuf,
    pub xml_folder_path: PathBuf,
    pub out_folder_path: PathBuf,
    /// 占位资格（bogus）记录文件
    #[serde(default)]
    pub control_qualifications_path: Option<PathBuf>,
    /// 正式资格（*_meta.json 等）所在目录
    #[serde(default)]
    pub qualification_folder_path: Option<PathBuf>,
    /// 提交通知的 SQS 队列
    #[serde(default)]
    pub queue_url: Option<String>,
    /// 题目信封格式，`{0}` 为正文占位符
    #[serde(default = "default_envelope")]
    pub xml: String,
    /// 活动日志是否同时输出到控制台
    #[serde(default = "default_also_print")]
    pub also_print: bool,
}

fn default_envelope() -> String {
    HTML_QUESTION_ENVELOPE.to_string()
}

fn default_also_print() -> bool {
    true
}

impl WorkspaceArgs {
    /// 从工作区目录读取 default_args.json
    pub fn load(workspace: &Path) -> AppResult<Self> {
        let path = workspace.join(DEFAULT_ARGS_FILE);
        if !path.exists() {
            return Err(AppError::Config(ConfigError::MissingDefaultArgs {
                path: path.display().to_string(),
            }));
        }
        read_json(&path)
    }

    /// 当前支付模式
    pub fn payment_mode(&self) -> PaymentMode {
        PaymentMode::from_flag(self.pay_real_money)
    }
}

/// AWS 凭证（secrets.json）
#[derive(Clone, Deserialize)]
pub struct Secrets {
    pub access_key: String,
    pub secret_key: String,
}

impl Secrets {
    pub fn load(path: &Path) -> AppResult<Self> {
        read_json(path)
    }
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("access_key", &self.access_key)
            .field("secret_key", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_missing_default_args_is_config_error() {
        let dir = TempDir::new().unwrap();
        let err = WorkspaceArgs::load(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            AppError::Config(ConfigError::MissingDefaultArgs { .. })
        ));
    }

    #[test]
    fn test_load_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let args = json!({
            "config_path": "config.json",
            "secrets_path": "secrets.json",
            "template_path": "template.html",
            "logs_path": "log.txt",
            "src_folder_path": "src",
            "xml_folder_path": "xml",
            "out_folder_path": "out",
            "control_qualifications_path": null
        });
        std::fs::write(dir.path().join(DEFAULT_ARGS_FILE), args.to_string()).unwrap();

        let loaded = WorkspaceArgs::load(dir.path()).unwrap();
        assert!(!loaded.pay_real_money);
        assert_eq!(loaded.payment_mode(), PaymentMode::FakeMoney);
        assert_eq!(loaded.xml, HTML_QUESTION_ENVELOPE);
        assert!(loaded.queue_url.is_none());
        assert!(loaded.control_qualifications_path.is_none());
        assert!(loaded.also_print);
    }
}
