//! 请求参数转换
//!
//! 服务层以 MTurk 原生键名（PascalCase）组装 JSON 请求，
//! 这里把它们解析成类型化参数，再交给 SDK 的构建器

use aws_sdk_mturk::error::BuildError;
use aws_sdk_mturk::types::{
    Comparator, EventType, HitAccessActions, Locale, NotificationSpecification,
    NotificationTransport, QualificationRequirement, QualificationTypeStatus,
};
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};
use tracing::warn;

use crate::error::{ApiError, AppError, AppResult};
use crate::models::NotificationSpec;

/// CreateHIT 参数
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HitRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub reward: Option<String>,
    pub max_assignments: Option<i32>,
    pub lifetime_in_seconds: Option<i64>,
    pub assignment_duration_in_seconds: Option<i64>,
    pub auto_approval_delay_in_seconds: Option<i64>,
    pub question: Option<String>,
    pub requester_annotation: Option<String>,
    pub unique_request_token: Option<String>,
    #[serde(rename = "HITLayoutId")]
    pub hit_layout_id: Option<String>,
    pub qualification_requirements: Option<Vec<RequirementRequest>>,
    #[serde(flatten)]
    pub unsupported: Map<String, JsonValue>,
}

/// 单条资格要求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequirementRequest {
    pub qualification_type_id: String,
    pub comparator: String,
    pub integer_values: Option<Vec<i32>>,
    pub locale_values: Option<Vec<LocaleRequest>>,
    pub required_to_preview: Option<bool>,
    pub actions_guarded: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LocaleRequest {
    pub country: String,
    pub subdivision: Option<String>,
}

/// CreateQualificationType 参数
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QualificationTypeRequest {
    pub name: Option<String>,
    pub keywords: Option<String>,
    pub description: Option<String>,
    pub qualification_type_status: Option<String>,
    pub retry_delay_in_seconds: Option<i64>,
    pub test: Option<String>,
    pub answer_key: Option<String>,
    pub test_duration_in_seconds: Option<i64>,
    pub auto_granted: Option<bool>,
    pub auto_granted_value: Option<i32>,
    #[serde(flatten)]
    pub unsupported: Map<String, JsonValue>,
}

impl HitRequest {
    pub fn parse(request: Map<String, JsonValue>) -> AppResult<Self> {
        let parsed: Self = from_request("CreateHIT", request)?;
        warn_unsupported("CreateHIT", &parsed.unsupported);
        Ok(parsed)
    }

    /// 转换资格要求；未设置时返回 None
    pub fn requirements(&mut self) -> AppResult<Option<Vec<QualificationRequirement>>> {
        self.qualification_requirements
            .take()
            .map(|list| {
                list.into_iter()
                    .map(RequirementRequest::into_sdk)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| invalid_request("CreateHIT", e))
            })
            .transpose()
    }
}

impl RequirementRequest {
    pub fn into_sdk(self) -> Result<QualificationRequirement, BuildError> {
        let locales = self
            .locale_values
            .map(|list| {
                list.into_iter()
                    .map(|locale| {
                        Locale::builder()
                            .country(locale.country)
                            .set_subdivision(locale.subdivision)
                            .build()
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        QualificationRequirement::builder()
            .qualification_type_id(self.qualification_type_id)
            .comparator(Comparator::from(self.comparator.as_str()))
            .set_integer_values(self.integer_values)
            .set_locale_values(locales)
            .set_required_to_preview(self.required_to_preview)
            .set_actions_guarded(self.actions_guarded.as_deref().map(HitAccessActions::from))
            .build()
    }
}

impl QualificationTypeRequest {
    pub fn parse(request: Map<String, JsonValue>) -> AppResult<Self> {
        let parsed: Self = from_request("CreateQualificationType", request)?;
        warn_unsupported("CreateQualificationType", &parsed.unsupported);
        Ok(parsed)
    }

    pub fn status(&self) -> Option<QualificationTypeStatus> {
        self.qualification_type_status
            .as_deref()
            .map(QualificationTypeStatus::from)
    }
}

/// 通知设置 → SDK 类型
pub fn notification_specification(spec: &NotificationSpec) -> AppResult<NotificationSpecification> {
    NotificationSpecification::builder()
        .destination(spec.destination.clone())
        .transport(NotificationTransport::from(spec.transport.as_str()))
        .version(spec.version.clone())
        .set_event_types(Some(
            spec.event_types
                .iter()
                .map(|event| EventType::from(event.as_str()))
                .collect(),
        ))
        .build()
        .map_err(|e| invalid_request("UpdateNotificationSettings", e))
}

fn from_request<T: serde::de::DeserializeOwned>(
    action: &str,
    request: Map<String, JsonValue>,
) -> AppResult<T> {
    serde_json::from_value(JsonValue::Object(request)).map_err(|e| invalid_request(action, e))
}

fn invalid_request(action: &str, source: impl std::error::Error + Send + Sync + 'static) -> AppError {
    AppError::Api(ApiError::InvalidRequest {
        action: action.to_string(),
        source: Box::new(source),
    })
}

fn warn_unsupported(action: &str, unsupported: &Map<String, JsonValue>) {
    if !unsupported.is_empty() {
        let keys: Vec<&str> = unsupported.keys().map(String::as_str).collect();
        warn!("⚠️ {} 不支持的参数，已忽略: {}", action, keys.join(", "));
    }
}
