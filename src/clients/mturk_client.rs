/// MTurk 请求者 API 客户端
///
/// 基于 aws-sdk-mturk，凭证来自工作区的 secrets 文件
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_mturk::config::http::HttpResponse;
use aws_sdk_mturk::config::{Credentials, Region};
use aws_sdk_mturk::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_mturk::primitives::DateTime;
use aws_sdk_mturk::types::Assignment;
use aws_sdk_mturk::Client;
use serde_json::{json, Map, Value as JsonValue};
use tracing::debug;

use crate::clients::market::LaborMarket;
use crate::clients::mturk_request::{notification_specification, HitRequest, QualificationTypeRequest};
use crate::config::Secrets;
use crate::error::{ApiError, AppError, AppResult};
use crate::models::{CreatedHit, NotificationSpec};

const CREDENTIALS_PROVIDER: &str = "turco";

/// MTurk 客户端
#[derive(Debug, Clone)]
pub struct MTurkClient {
    client: Client,
}

impl MTurkClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// 连接到指定端点
    ///
    /// # 参数
    /// - `endpoint`: 沙盒、正式或自定义端点
    /// - `region`: 签名使用的区域
    /// - `secrets`: 访问密钥
    pub async fn connect(endpoint: &str, region: &str, secrets: &Secrets) -> Self {
        let credentials = Credentials::new(
            secrets.access_key.clone(),
            secrets.secret_key.clone(),
            None,
            None,
            CREDENTIALS_PROVIDER,
        );

        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .load()
            .await;

        debug!("MTurk 客户端已连接: {} ({})", endpoint, region);
        Self::new(Client::new(&config))
    }
}

/// SDK 错误 → ApiError
///
/// 服务端返回了错误码时为 `BadResponse`，否则视为请求失败
fn map_sdk_error<E>(action: &str, err: SdkError<E, HttpResponse>) -> AppError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    match err.code() {
        Some(code) => AppError::Api(ApiError::BadResponse {
            action: action.to_string(),
            status: err
                .raw_response()
                .map(|response| response.status().as_u16())
                .unwrap_or_default(),
            error_type: Some(code.to_string()),
            message: err.message().map(str::to_string),
        }),
        None => AppError::api_request_failed(action, err),
    }
}

fn required(value: Option<&str>, action: &str, field: &str) -> AppResult<String> {
    value
        .map(str::to_string)
        .ok_or_else(|| AppError::api_missing_field(action, field))
}

fn to_i32(value: i64, action: &str) -> AppResult<i32> {
    i32::try_from(value).map_err(|e| {
        AppError::Api(ApiError::InvalidRequest {
            action: action.to_string(),
            source: Box::new(e),
        })
    })
}

/// 作业 → 以 MTurk 键名组成的记录，时间为 epoch 秒
fn assignment_record(assignment: &Assignment) -> Map<String, JsonValue> {
    let mut record = Map::new();
    let mut text = |key: &str, value: Option<&str>| {
        if let Some(value) = value {
            record.insert(key.to_string(), json!(value));
        }
    };
    text("AssignmentId", assignment.assignment_id());
    text("WorkerId", assignment.worker_id());
    text("HITId", assignment.hit_id());
    text(
        "AssignmentStatus",
        assignment.assignment_status().map(|status| status.as_str()),
    );

    let times: [(&str, Option<&DateTime>); 6] = [
        ("AutoApprovalTime", assignment.auto_approval_time()),
        ("AcceptTime", assignment.accept_time()),
        ("SubmitTime", assignment.submit_time()),
        ("ApprovalTime", assignment.approval_time()),
        ("RejectionTime", assignment.rejection_time()),
        ("Deadline", assignment.deadline()),
    ];
    for (key, time) in times {
        if let Some(time) = time {
            record.insert(key.to_string(), json!(time.as_secs_f64()));
        }
    }

    if let Some(answer) = assignment.answer() {
        record.insert("Answer".to_string(), json!(answer));
    }
    if let Some(feedback) = assignment.requester_feedback() {
        record.insert("RequesterFeedback".to_string(), json!(feedback));
    }
    record
}

#[async_trait]
impl LaborMarket for MTurkClient {
    async fn create_qualification_type(&self, request: Map<String, JsonValue>) -> AppResult<String> {
        let action = "CreateQualificationType";
        let request = QualificationTypeRequest::parse(request)?;
        debug!("MTurk 请求 {}: {:?}", action, request.name);

        let output = self
            .client
            .create_qualification_type()
            .set_qualification_type_status(request.status())
            .set_name(request.name)
            .set_keywords(request.keywords)
            .set_description(request.description)
            .set_retry_delay_in_seconds(request.retry_delay_in_seconds)
            .set_test(request.test)
            .set_answer_key(request.answer_key)
            .set_test_duration_in_seconds(request.test_duration_in_seconds)
            .set_auto_granted(request.auto_granted)
            .set_auto_granted_value(request.auto_granted_value)
            .send()
            .await
            .map_err(|e| map_sdk_error(action, e))?;

        required(
            output
                .qualification_type()
                .and_then(|qualification| qualification.qualification_type_id()),
            action,
            "QualificationType.QualificationTypeId",
        )
    }

    async fn delete_qualification_type(&self, qualification_type_id: &str) -> AppResult<()> {
        self.client
            .delete_qualification_type()
            .qualification_type_id(qualification_type_id)
            .send()
            .await
            .map_err(|e| map_sdk_error("DeleteQualificationType", e))?;
        Ok(())
    }

    async fn associate_qualification_with_worker(
        &self,
        qualification_type_id: &str,
        worker_id: &str,
        integer_value: i64,
        send_notification: bool,
    ) -> AppResult<()> {
        let action = "AssociateQualificationWithWorker";
        self.client
            .associate_qualification_with_worker()
            .qualification_type_id(qualification_type_id)
            .worker_id(worker_id)
            .integer_value(to_i32(integer_value, action)?)
            .send_notification(send_notification)
            .send()
            .await
            .map_err(|e| map_sdk_error(action, e))?;
        Ok(())
    }

    async fn get_qualification_score(
        &self,
        qualification_type_id: &str,
        worker_id: &str,
    ) -> AppResult<i64> {
        let action = "GetQualificationScore";
        let output = self
            .client
            .get_qualification_score()
            .qualification_type_id(qualification_type_id)
            .worker_id(worker_id)
            .send()
            .await
            .map_err(|e| map_sdk_error(action, e))?;

        output
            .qualification()
            .and_then(|qualification| qualification.integer_value())
            .map(i64::from)
            .ok_or_else(|| AppError::api_missing_field(action, "Qualification.IntegerValue"))
    }

    async fn create_hit(&self, request: Map<String, JsonValue>) -> AppResult<CreatedHit> {
        let action = "CreateHIT";
        let mut request = HitRequest::parse(request)?;
        let requirements = request.requirements()?;
        debug!("MTurk 请求 {}: {:?}", action, request.title);

        let output = self
            .client
            .create_hit()
            .set_title(request.title)
            .set_description(request.description)
            .set_keywords(request.keywords)
            .set_reward(request.reward)
            .set_max_assignments(request.max_assignments)
            .set_lifetime_in_seconds(request.lifetime_in_seconds)
            .set_assignment_duration_in_seconds(request.assignment_duration_in_seconds)
            .set_auto_approval_delay_in_seconds(request.auto_approval_delay_in_seconds)
            .set_question(request.question)
            .set_requester_annotation(request.requester_annotation)
            .set_unique_request_token(request.unique_request_token)
            .set_hit_layout_id(request.hit_layout_id)
            .set_qualification_requirements(requirements)
            .send()
            .await
            .map_err(|e| map_sdk_error(action, e))?;

        let hit = output
            .hit()
            .ok_or_else(|| AppError::api_missing_field(action, "HIT"))?;

        Ok(CreatedHit {
            hit_id: required(hit.hit_id(), action, "HIT.HITId")?,
            hit_type_id: required(hit.hit_type_id(), action, "HIT.HITTypeId")?,
            hit_group_id: required(hit.hit_group_id(), action, "HIT.HITGroupId")?,
        })
    }

    async fn update_notification_settings(
        &self,
        hit_type_id: &str,
        notification: &NotificationSpec,
        active: bool,
    ) -> AppResult<()> {
        self.client
            .update_notification_settings()
            .hit_type_id(hit_type_id)
            .notification(notification_specification(notification)?)
            .active(active)
            .send()
            .await
            .map_err(|e| map_sdk_error("UpdateNotificationSettings", e))?;
        Ok(())
    }

    async fn list_assignments_for_hit(&self, hit_id: &str) -> AppResult<Vec<Map<String, JsonValue>>> {
        let output = self
            .client
            .list_assignments_for_hit()
            .hit_id(hit_id)
            .send()
            .await
            .map_err(|e| map_sdk_error("ListAssignmentsForHIT", e))?;

        Ok(output.assignments().iter().map(assignment_record).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const TARGET_PREFIX: &str = "MTurkRequesterServiceV20170117";

    fn secrets() -> Secrets {
        Secrets {
            access_key: "AKID".to_string(),
            secret_key: "secret".to_string(),
        }
    }

    fn target(action: &str) -> String {
        format!("{}.{}", TARGET_PREFIX, action)
    }

    #[tokio::test]
    async fn test_create_hit_sends_signed_json_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("x-amz-target", target("CreateHIT").as_str())
            .match_header(
                "authorization",
                Matcher::Regex("^AWS4-HMAC-SHA256 Credential=AKID/".to_string()),
            )
            .match_body(Matcher::PartialJson(json!({
                "Title": "Label images",
                "MaxAssignments": 2,
                "QualificationRequirements": [
                    {"QualificationTypeId": "Q1", "Comparator": "DoesNotExist"}
                ]
            })))
            .with_status(200)
            .with_body(
                r#"{"HIT": {"HITId": "H1", "HITTypeId": "T1", "HITGroupId": "G1", "Title": "Label images"}}"#,
            )
            .create_async()
            .await;

        let client = MTurkClient::connect(&server.url(), "us-east-1", &secrets()).await;
        let request = json!({
            "Title": "Label images",
            "MaxAssignments": 2,
            "QualificationRequirements": [{"QualificationTypeId": "Q1", "Comparator": "DoesNotExist"}]
        });

        let hit = client
            .create_hit(request.as_object().cloned().unwrap())
            .await
            .unwrap();

        assert_eq!(hit.hit_id, "H1");
        assert_eq!(hit.hit_type_id, "T1");
        assert_eq!(hit.hit_group_id, "G1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_response_becomes_bad_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(400)
            .with_header("content-type", "application/x-amz-json-1.1")
            .with_body(r#"{"__type": "RequestError", "Message": "Qualification type not found"}"#)
            .create_async()
            .await;

        let client = MTurkClient::connect(&server.url(), "us-east-1", &secrets()).await;
        let err = client.delete_qualification_type("Q1").await.unwrap_err();

        match err {
            AppError::Api(ApiError::BadResponse {
                action,
                status,
                error_type,
                message,
            }) => {
                assert_eq!(action, "DeleteQualificationType");
                assert_eq!(status, 400);
                assert_eq!(error_type.as_deref(), Some("RequestError"));
                assert_eq!(message.as_deref(), Some("Qualification type not found"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_score_and_assignments_are_extracted() {
        let mut server = mockito::Server::new_async().await;
        let _score = server
            .mock("POST", "/")
            .match_header("x-amz-target", target("GetQualificationScore").as_str())
            .with_status(200)
            .with_body(r#"{"Qualification": {"QualificationTypeId": "Q1", "WorkerId": "W1", "IntegerValue": 12}}"#)
            .create_async()
            .await;
        let _list = server
            .mock("POST", "/")
            .match_header("x-amz-target", target("ListAssignmentsForHIT").as_str())
            .with_status(200)
            .with_body(
                r#"{"NumResults": 1, "Assignments": [{"AssignmentId": "A1", "WorkerId": "W1", "HITId": "H1", "AssignmentStatus": "Submitted", "AcceptTime": 100, "SubmitTime": 142.5, "Answer": "<a/>"}]}"#,
            )
            .create_async()
            .await;

        let client = MTurkClient::connect(&server.url(), "us-east-1", &secrets()).await;

        assert_eq!(client.get_qualification_score("Q1", "W1").await.unwrap(), 12);
        let assignments = client.list_assignments_for_hit("H1").await.unwrap();
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0]["AssignmentId"], "A1");
        assert_eq!(assignments[0]["AssignmentStatus"], "Submitted");
        assert_eq!(assignments[0]["AcceptTime"], json!(100.0));
        assert_eq!(assignments[0]["SubmitTime"], json!(142.5));
        assert_eq!(assignments[0]["Answer"], "<a/>");
        assert!(assignments[0].get("ApprovalTime").is_none());
    }

    #[tokio::test]
    async fn test_create_qualification_type_returns_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("x-amz-target", target("CreateQualificationType").as_str())
            .match_body(Matcher::PartialJson(json!({
                "Name": "blocker",
                "QualificationTypeStatus": "Active",
                "AutoGranted": false
            })))
            .with_status(200)
            .with_body(r#"{"QualificationType": {"QualificationTypeId": "QNEW", "Name": "blocker"}}"#)
            .create_async()
            .await;

        let client = MTurkClient::connect(&server.url(), "us-east-1", &secrets()).await;
        let request = json!({
            "Name": "blocker",
            "Keywords": "None",
            "Description": "None",
            "QualificationTypeStatus": "Active",
            "AutoGranted": false
        });

        let id = client
            .create_qualification_type(request.as_object().cloned().unwrap())
            .await
            .unwrap();

        assert_eq!(id, "QNEW");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_out_of_range_value_is_rejected_before_sending() {
        let server = mockito::Server::new_async().await;
        let client = MTurkClient::connect(&server.url(), "us-east-1", &secrets()).await;

        let err = client
            .associate_qualification_with_worker("Q1", "W1", i64::MAX, false)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Api(ApiError::InvalidRequest { .. })));
    }
}
