//! 结果收集服务 - 业务能力层
//!
//! 合并账本 → 拉取每个 HIT 的作业 → 附加用时、题目名与资格答案 → 导出 CSV

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{json, Map, Value as JsonValue};
use tracing::{debug, info};

use crate::clients::LaborMarket;
use crate::config::WorkspaceArgs;
use crate::error::{AppError, AppResult};
use crate::services::{LedgerStore, QualificationService};

const LIST_ASSIGNMENTS: &str = "ListAssignmentsForHIT";

/// 导出结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectReport {
    pub path: PathBuf,
    pub rows: usize,
}

/// 结果收集服务
pub struct ResultCollector {
    market: Arc<dyn LaborMarket>,
    qualifications: Arc<QualificationService>,
    ledger: LedgerStore,
    out_folder: PathBuf,
}

impl ResultCollector {
    pub fn new(
        market: Arc<dyn LaborMarket>,
        qualifications: Arc<QualificationService>,
        args: &WorkspaceArgs,
    ) -> Self {
        Self {
            market,
            qualifications,
            ledger: LedgerStore::new(args.out_folder_path.clone()),
            out_folder: args.out_folder_path.clone(),
        }
    }

    /// 收集所有已发布 HIT 的作业并导出
    pub async fn collect(&self) -> AppResult<CollectReport> {
        let ledger = self.ledger.merged()?;
        info!(
            "📥 开始收集: {} 个 HIT, {} 个资格",
            ledger.question_map.len(),
            ledger.qualification_map.len()
        );

        let mut rows = Vec::new();

        for (task_name, hit_id) in &ledger.question_map {
            let assignments = self.market.list_assignments_for_hit(hit_id).await?;
            debug!("{} ({}) 共 {} 份作业", task_name, hit_id, assignments.len());

            for mut assignment in assignments {
                let time_spent = time_spent(&assignment)?;
                assignment.insert("TimeSpent".to_string(), json!(time_spent));
                assignment.insert("Question".to_string(), json!(task_name));

                let worker_id = assignment
                    .get("WorkerId")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| AppError::api_missing_field(LIST_ASSIGNMENTS, "WorkerId"))?
                    .to_string();

                for (name, qualification_id) in &ledger.qualification_map {
                    let score = self
                        .market
                        .get_qualification_score(qualification_id, &worker_id)
                        .await?;
                    let answers = self.qualifications.decode_score(name, score)?;
                    assignment.insert(
                        format!("{}:{}", name, qualification_id),
                        JsonValue::String(JsonValue::Object(answers).to_string()),
                    );
                }

                rows.push(assignment);
            }
        }

        let stamp = chrono::Local::now().format("%Y-%m-%d %H-%M-%S%.6f");
        let path = self.out_folder.join(format!("results_{}.csv", stamp));
        write_csv(&path, &rows)?;

        info!("✓ 已导出 {} 行结果: {}", rows.len(), path.display());
        Ok(CollectReport {
            path,
            rows: rows.len(),
        })
    }
}

/// 提交时间 - 接单时间（秒）
fn time_spent(assignment: &Map<String, JsonValue>) -> AppResult<f64> {
    let submit = timestamp(assignment, "SubmitTime")?;
    let accept = timestamp(assignment, "AcceptTime")?;
    Ok(submit - accept)
}

/// 时间戳可能是 epoch 秒，也可能是 RFC 3339 字符串
fn timestamp(assignment: &Map<String, JsonValue>, field: &str) -> AppResult<f64> {
    let value = assignment
        .get(field)
        .ok_or_else(|| AppError::api_missing_field(LIST_ASSIGNMENTS, field))?;

    if let Some(seconds) = value.as_f64() {
        return Ok(seconds);
    }

    value
        .as_str()
        .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.timestamp_millis() as f64 / 1000.0)
        .ok_or_else(|| AppError::api_missing_field(LIST_ASSIGNMENTS, field))
}

/// 表头为所有行的键按首次出现顺序取并集
fn write_csv(path: &std::path::Path, rows: &[Map<String, JsonValue>]) -> AppResult<()> {
    let mut header: Vec<&str> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !header.contains(&key.as_str()) {
                header.push(key);
            }
        }
    }

    let to_err = |e: csv::Error| AppError::file_write_failed(path.display().to_string(), e);
    let mut writer = csv::Writer::from_path(path).map_err(to_err)?;

    if !header.is_empty() {
        writer.write_record(&header).map_err(to_err)?;
    }
    for row in rows {
        let record: Vec<String> = header
            .iter()
            .map(|key| match row.get(*key) {
                None | Some(JsonValue::Null) => String::new(),
                Some(JsonValue::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            })
            .collect();
        writer.write_record(&record).map_err(to_err)?;
    }

    writer
        .flush()
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
    Ok(())
}
