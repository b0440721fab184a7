//! 业务能力层
//!
//! 每个服务只负责一种能力，由编排层组装

pub mod activity_log;
pub mod hit_publisher;
pub mod ledger_store;
pub mod qualification_service;
pub mod question_renderer;
pub mod result_collector;

pub use activity_log::ActivityLog;
pub use hit_publisher::{HitPublisher, PublishOptions};
pub use ledger_store::LedgerStore;
pub use qualification_service::QualificationService;
pub use question_renderer::QuestionRenderer;
pub use result_collector::{CollectReport, ResultCollector};
