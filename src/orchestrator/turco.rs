//! Turco 门面 - 编排层
//!
//! ## 职责
//!
//! 1. **初始化**：读取工作区参数、确定支付模式、构建平台客户端
//! 2. **组装服务**：所有服务共享同一个 `Arc<dyn LaborMarket>` 与活动日志
//! 3. **命令分发**：render / publish / collect / 资格管理
//!
//! 平台客户端在这里创建一次，之后只通过参数向下传递

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};
use tracing::info;

use crate::clients::{LaborMarket, MTurkClient};
use crate::config::{Config, Secrets, WorkspaceArgs};
use crate::error::{AppError, AppResult, ConfigError};
use crate::models::{LedgerSnapshot, PaymentMode, QualificationRef};
use crate::services::{
    ActivityLog, CollectReport, HitPublisher, PublishOptions, QualificationService,
    QuestionRenderer, ResultCollector,
};
use crate::utils::logging;

/// 可执行的命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Render,
    Publish,
    Collect,
    CreateQualifications,
    DeleteQualifications,
}

impl FromStr for Command {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "render" => Ok(Command::Render),
            "publish" => Ok(Command::Publish),
            "collect" => Ok(Command::Collect),
            "create-qualifications" => Ok(Command::CreateQualifications),
            "delete-qualifications" => Ok(Command::DeleteQualifications),
            other => Err(AppError::Config(ConfigError::UnknownCommand {
                command: other.to_string(),
            })),
        }
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Command::Render => "render",
            Command::Publish => "publish",
            Command::Collect => "collect",
            Command::CreateQualifications => "create-qualifications",
            Command::DeleteQualifications => "delete-qualifications",
        };
        f.write_str(name)
    }
}

/// 应用门面
pub struct Turco {
    args: WorkspaceArgs,
    renderer: QuestionRenderer,
    qualifications: Arc<QualificationService>,
    publisher: HitPublisher,
    collector: ResultCollector,
}

impl Turco {
    /// 按运行配置初始化
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        let mut args = WorkspaceArgs::load(&config.workspace)?;
        if let Some(pay_real_money) = config.pay_real_money {
            args.pay_real_money = pay_real_money;
        }

        let mode = args.payment_mode();
        let endpoint = config
            .endpoint_override
            .clone()
            .unwrap_or_else(|| mode.endpoint().to_string());

        logging::log_startup(&config.workspace, mode, &endpoint);

        let secrets = Secrets::load(&args.secrets_path)?;
        let market: Arc<dyn LaborMarket> =
            Arc::new(MTurkClient::connect(&endpoint, &config.region, &secrets).await);

        Self::with_market(args, market)
    }

    /// 使用给定的平台客户端组装服务
    pub fn with_market(args: WorkspaceArgs, market: Arc<dyn LaborMarket>) -> AppResult<Self> {
        let log = ActivityLog::new(args.logs_path.clone(), args.also_print);

        let renderer = QuestionRenderer::new(&args, log.clone())?;
        let qualifications = Arc::new(QualificationService::new(market.clone(), &args, log.clone()));
        let publisher = HitPublisher::new(market.clone(), qualifications.clone(), &args, log);
        let collector = ResultCollector::new(market, qualifications.clone(), &args);

        Ok(Self {
            args,
            renderer,
            qualifications,
            publisher,
            collector,
        })
    }

    pub fn payment_mode(&self) -> PaymentMode {
        self.args.payment_mode()
    }

    // ========== 三个阶段 ==========

    /// 渲染全部题目
    pub fn render_all(&self) -> AppResult<Vec<PathBuf>> {
        self.renderer.render_all()
    }

    /// 渲染全部题目，渲染前先对字段做处理
    pub fn render<F>(&self, transform: F) -> AppResult<Vec<PathBuf>>
    where
        F: Fn(Map<String, JsonValue>) -> Map<String, JsonValue>,
    {
        self.renderer.render(transform)
    }

    pub async fn publish(&self, options: &PublishOptions) -> AppResult<LedgerSnapshot> {
        self.publisher.publish(options).await
    }

    pub async fn collect(&self) -> AppResult<CollectReport> {
        self.collector.collect().await
    }

    // ========== 资格管理 ==========

    pub async fn create_bogus_qualification(&self, name: &str) -> AppResult<String> {
        self.qualifications.create_bogus(name).await
    }

    pub async fn delete_bogus_qualification(&self, name: &str) -> AppResult<()> {
        self.qualifications.delete_bogus(name).await
    }

    pub async fn assign_qualification(
        &self,
        worker_id: &str,
        qualification: &QualificationRef,
    ) -> AppResult<()> {
        self.qualifications.assign(worker_id, qualification).await
    }

    pub async fn create_qualifications(&self) -> AppResult<Vec<(String, String)>> {
        self.qualifications.create_scored().await
    }

    pub async fn delete_qualifications(&self, names: Option<&[String]>) -> AppResult<usize> {
        self.qualifications.delete_scored(names).await
    }

    pub fn decode_score(&self, name: &str, score: i64) -> AppResult<Map<String, JsonValue>> {
        self.qualifications.decode_score(name, score)
    }

    /// 执行一条命令
    pub async fn run(&self, command: Command, options: &PublishOptions) -> AppResult<()> {
        info!("▶️ 执行命令: {}", command);

        match command {
            Command::Render => {
                let written = self.render_all()?;
                logging::log_rendered(written.len(), &self.args.xml_folder_path);
            }
            Command::Publish => {
                let snapshot = self.publish(options).await?;
                logging::log_published(snapshot.question_map.len(), self.payment_mode());
            }
            Command::Collect => {
                let report = self.collect().await?;
                logging::log_collected(report.rows, &report.path);
            }
            Command::CreateQualifications => {
                let created = self.create_qualifications().await?;
                info!("✓ 新建资格 {} 个", created.len());
            }
            Command::DeleteQualifications => {
                let deleted = self.delete_qualifications(None).await?;
                info!("✓ 删除资格 {} 个", deleted);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingMarket, Workspace};
    use serde_json::json;

    #[test]
    fn test_command_parsing() {
        assert_eq!("publish".parse::<Command>().unwrap(), Command::Publish);
        assert_eq!(
            "delete-qualifications".parse::<Command>().unwrap(),
            Command::DeleteQualifications
        );
        assert_eq!(Command::CreateQualifications.to_string(), "create-qualifications");
        assert!(matches!(
            "listen".parse::<Command>().unwrap_err(),
            AppError::Config(ConfigError::UnknownCommand { .. })
        ));
    }

    #[tokio::test]
    async fn test_run_dispatches_render_then_publish() {
        let ws = Workspace::new();
        ws.write("template.html", "{{prompt}}");
        ws.write_json("src/q1.json", &json!({"prompt": "hi"}));
        let market = Arc::new(RecordingMarket::default());
        let turco = Turco::with_market(ws.args.clone(), market.clone()).unwrap();

        turco
            .run(Command::Render, &PublishOptions::default())
            .await
            .unwrap();
        turco
            .run(Command::Publish, &PublishOptions::default())
            .await
            .unwrap();

        assert_eq!(market.hits().len(), 1);
        assert_eq!(turco.payment_mode(), PaymentMode::FakeMoney);
    }

    #[tokio::test]
    async fn test_initialize_requires_default_args() {
        let ws = Workspace::new();
        let config = Config {
            workspace: ws.root().to_path_buf(),
            ..Config::default()
        };

        let err = Turco::initialize(&config).await.err().unwrap();
        assert!(matches!(
            err,
            AppError::Config(ConfigError::MissingDefaultArgs { .. })
        ));
    }
}
