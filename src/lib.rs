//! # turco
//!
//! 自动化 Amazon Mechanical Turk 众包任务的 Rust 库
//!
//! ## 架构设计
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 远程平台的唯一入口
//! - `LaborMarket` - 平台能力接口，服务只依赖它
//! - `MTurkClient` - 基于 aws-sdk-mturk 的实现
//!
//! ### ② 业务能力层（Services）
//! - `QuestionRenderer` - 模板 + 源记录 → 题目文件
//! - `QualificationService` - 占位资格 / 正式资格 / 分数解码
//! - `HitPublisher` - 发布 HIT 并写账本快照
//! - `ResultCollector` - 汇总作业导出 CSV
//! - `LedgerStore` / `ActivityLog` - 账本与活动日志
//!
//! ### ③ 流程层（Workflow）
//! - `HitCtx` - 单个 HIT 的上下文（题目名 + 序号）
//! - `HitPlan` - 从共享参数构建独立的 CreateHIT 请求
//!
//! ### ④ 编排层（Orchestration）
//! - `Turco` - 初始化客户端、组装服务、分发命令
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

#[cfg(test)]
mod testing;

// 重新导出常用类型
pub use clients::{LaborMarket, MTurkClient};
pub use config::{Config, Secrets, WorkspaceArgs};
pub use error::{AppError, AppResult};
pub use models::{CreatedHit, LedgerSnapshot, NotificationSpec, PaymentMode, QualificationRef};
pub use orchestrator::{Command, Turco};
pub use services::{CollectReport, PublishOptions};
