//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层只做组装和调度，不包含业务判断。
//!
//! ## 层次关系
//!
//! ```text
//! Turco (命令分发)
//!     ↓
//! services (能力层：渲染 / 发布 / 收集 / 资格 / 账本 / 活动日志)
//!     ↓
//! workflow::HitPlan (单个 HIT 请求的构建)
//!     ↓
//! clients (平台客户端：LaborMarket / MTurkClient)
//! ```

pub mod turco;

pub use turco::{Command, Turco};
