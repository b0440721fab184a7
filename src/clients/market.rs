//! 众包平台能力接口
//!
//! 所有服务只通过这个接口访问远程平台，客户端在每次运行时构造一次后注入

use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};

use crate::error::AppResult;
use crate::models::{CreatedHit, NotificationSpec};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LaborMarket: Send + Sync {
    /// 创建资格类型，返回 QualificationTypeId
    async fn create_qualification_type(&self, request: Map<String, JsonValue>) -> AppResult<String>;

    async fn delete_qualification_type(&self, qualification_type_id: &str) -> AppResult<()>;

    async fn associate_qualification_with_worker(
        &self,
        qualification_type_id: &str,
        worker_id: &str,
        integer_value: i64,
        send_notification: bool,
    ) -> AppResult<()>;

    /// 工人在某资格上的分数（IntegerValue）
    async fn get_qualification_score(
        &self,
        qualification_type_id: &str,
        worker_id: &str,
    ) -> AppResult<i64>;

    async fn create_hit(&self, request: Map<String, JsonValue>) -> AppResult<CreatedHit>;

    async fn update_notification_settings(
        &self,
        hit_type_id: &str,
        notification: &NotificationSpec,
        active: bool,
    ) -> AppResult<()>;

    /// 单次调用返回的全部作业，不翻页
    async fn list_assignments_for_hit(&self, hit_id: &str) -> AppResult<Vec<Map<String, JsonValue>>>;
}
