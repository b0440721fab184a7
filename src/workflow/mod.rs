//! 流程层
//!
//! 单个 HIT 从共享参数到最终请求的构建过程

pub mod hit_ctx;
pub mod hit_plan;

pub use hit_ctx::HitCtx;
pub use hit_plan::{HitOverrides, HitPlan};
