//! 单元测试用的记录型平台

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Map, Value as JsonValue};
use tempfile::TempDir;

use crate::clients::LaborMarket;
use crate::config::WorkspaceArgs;
use crate::error::{ApiError, AppError, AppResult};
use crate::models::envelope::HTML_QUESTION_ENVELOPE;
use crate::models::{CreatedHit, NotificationSpec};

/// 记录所有调用并返回递增 ID 的平台
#[derive(Default)]
pub struct RecordingMarket {
    counter: AtomicUsize,
    pub created_qualifications: Mutex<Vec<Map<String, JsonValue>>>,
    pub deleted_qualifications: Mutex<Vec<String>>,
    pub associations: Mutex<Vec<(String, String, i64, bool)>>,
    pub created_hits: Mutex<Vec<Map<String, JsonValue>>>,
    pub notifications: Mutex<Vec<(String, NotificationSpec, bool)>>,
    pub assignments: Mutex<HashMap<String, Vec<Map<String, JsonValue>>>>,
    pub scores: Mutex<HashMap<(String, String), i64>>,
    /// 第 n 次（从 0 开始）CreateHIT 调用返回错误
    pub fail_hit_at: Option<usize>,
}

impl RecordingMarket {
    /// 第 `n` 次 CreateHIT 失败的平台
    pub fn failing_at(n: usize) -> Self {
        Self {
            fail_hit_at: Some(n),
            ..Self::default()
        }
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn hits(&self) -> Vec<Map<String, JsonValue>> {
        self.created_hits.lock().unwrap().clone()
    }
}

#[async_trait]
impl LaborMarket for RecordingMarket {
    async fn create_qualification_type(&self, request: Map<String, JsonValue>) -> AppResult<String> {
        self.created_qualifications.lock().unwrap().push(request);
        Ok(self.next_id("QUAL"))
    }

    async fn delete_qualification_type(&self, qualification_type_id: &str) -> AppResult<()> {
        self.deleted_qualifications
            .lock()
            .unwrap()
            .push(qualification_type_id.to_string());
        Ok(())
    }

    async fn associate_qualification_with_worker(
        &self,
        qualification_type_id: &str,
        worker_id: &str,
        integer_value: i64,
        send_notification: bool,
    ) -> AppResult<()> {
        self.associations.lock().unwrap().push((
            qualification_type_id.to_string(),
            worker_id.to_string(),
            integer_value,
            send_notification,
        ));
        Ok(())
    }

    async fn get_qualification_score(
        &self,
        qualification_type_id: &str,
        worker_id: &str,
    ) -> AppResult<i64> {
        Ok(self
            .scores
            .lock()
            .unwrap()
            .get(&(qualification_type_id.to_string(), worker_id.to_string()))
            .copied()
            .unwrap_or(0))
    }

    async fn create_hit(&self, request: Map<String, JsonValue>) -> AppResult<CreatedHit> {
        let mut hits = self.created_hits.lock().unwrap();
        if self.fail_hit_at == Some(hits.len()) {
            return Err(AppError::Api(ApiError::BadResponse {
                action: "CreateHIT".to_string(),
                status: 400,
                error_type: Some("ServiceFault".to_string()),
                message: None,
            }));
        }
        hits.push(request);
        let n = hits.len();
        Ok(CreatedHit {
            hit_id: format!("HIT{}", n),
            hit_type_id: format!("TYPE{}", n),
            hit_group_id: format!("GROUP{}", n),
        })
    }

    async fn update_notification_settings(
        &self,
        hit_type_id: &str,
        notification: &NotificationSpec,
        active: bool,
    ) -> AppResult<()> {
        self.notifications.lock().unwrap().push((
            hit_type_id.to_string(),
            notification.clone(),
            active,
        ));
        Ok(())
    }

    async fn list_assignments_for_hit(&self, hit_id: &str) -> AppResult<Vec<Map<String, JsonValue>>> {
        Ok(self
            .assignments
            .lock()
            .unwrap()
            .get(hit_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// 测试用工作区：目录结构与 default_args.json 一致
pub struct Workspace {
    pub dir: TempDir,
    pub args: WorkspaceArgs,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_path_buf();
        for sub in ["src", "xml", "out", "quals"] {
            std::fs::create_dir_all(root.join(sub)).unwrap();
        }
        std::fs::write(
            root.join("control.json"),
            json!({"RealMoney": {}, "FakeMoney": {}}).to_string(),
        )
        .unwrap();
        std::fs::write(
            root.join("config.json"),
            json!({
                "arguments": {
                    "Title": "Label things",
                    "MaxAssignments": 3,
                    "QualificationRequirements": []
                },
                "commons": {}
            })
            .to_string(),
        )
        .unwrap();

        let args = WorkspaceArgs {
            pay_real_money: false,
            config_path: root.join("config.json"),
            secrets_path: root.join("secrets.json"),
            template_path: root.join("template.html"),
            logs_path: root.join("log.txt"),
            src_folder_path: root.join("src"),
            xml_folder_path: root.join("xml"),
            out_folder_path: root.join("out"),
            control_qualifications_path: Some(root.join("control.json")),
            qualification_folder_path: Some(root.join("quals")),
            queue_url: None,
            xml: HTML_QUESTION_ENVELOPE.to_string(),
            also_print: false,
        };

        Self { dir, args }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root().join(relative);
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn write_json(&self, relative: &str, value: &JsonValue) -> PathBuf {
        self.write(relative, &value.to_string())
    }

    pub fn read_json(&self, relative: &str) -> JsonValue {
        let content = std::fs::read_to_string(self.root().join(relative)).unwrap();
        serde_json::from_str(&content).unwrap()
    }
}
