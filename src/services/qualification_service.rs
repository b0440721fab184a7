//! 资格管理服务 - 业务能力层
//!
//! 两类资格：
//! - 占位资格（bogus）：没有测试，手动授予，名称 → ID 记在 control 文件中
//! - 正式资格：`<前缀>_meta.json` + `<前缀>_question.xml` + `<前缀>_answers.xml`
//!
//! 远程 ID 一旦写入记录文件就不会重新创建

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{json, Map, Value as JsonValue};
use tracing::info;

use crate::clients::LaborMarket;
use crate::config::WorkspaceArgs;
use crate::error::{AppError, AppResult, QualificationError};
use crate::models::loaders::{file_stem, list_files_with_suffix, name_prefix, read_text};
use crate::models::qualification::QUALIFICATION_ID_KEY;
use crate::models::{PaymentMode, QualificationFile, QualificationRef};
use crate::services::ActivityLog;

const META_SUFFIX: &str = "_meta.json";

/// 资格管理服务
pub struct QualificationService {
    market: Arc<dyn LaborMarket>,
    mode: PaymentMode,
    control_path: Option<PathBuf>,
    qualification_folder: Option<PathBuf>,
    log: ActivityLog,
}

impl QualificationService {
    /// 创建新的资格管理服务
    pub fn new(market: Arc<dyn LaborMarket>, args: &WorkspaceArgs, log: ActivityLog) -> Self {
        Self {
            market,
            mode: args.payment_mode(),
            control_path: args.control_qualifications_path.clone(),
            qualification_folder: args.qualification_folder_path.clone(),
            log,
        }
    }

    fn control_path(&self) -> AppResult<&Path> {
        self.control_path
            .as_deref()
            .ok_or_else(|| AppError::missing_setting("control_qualifications_path"))
    }

    fn qualification_folder(&self) -> AppResult<&Path> {
        self.qualification_folder
            .as_deref()
            .ok_or_else(|| AppError::missing_setting("qualification_folder_path"))
    }

    /// 正式资格的元数据文件路径
    pub fn meta_path(&self, name: &str) -> AppResult<PathBuf> {
        Ok(self
            .qualification_folder()?
            .join(format!("{}{}", name, META_SUFFIX)))
    }

    // ========== 占位资格 ==========

    /// 创建占位资格，已存在时直接返回记录中的 ID
    pub async fn create_bogus(&self, name: &str) -> AppResult<String> {
        let path = self.control_path()?;
        let mut file = QualificationFile::load(path)?;

        if let Some(existing) = file.lookup(self.mode, name) {
            let existing = existing.to_string();
            self.log
                .announce(&format!("QualificationID already exists! ({})", existing))?;
            return Ok(existing);
        }

        let mut request = Map::new();
        request.insert("Name".to_string(), json!(name));
        request.insert("Keywords".to_string(), json!("None"));
        request.insert("Description".to_string(), json!("None"));
        request.insert("QualificationTypeStatus".to_string(), json!("Active"));
        request.insert("AutoGranted".to_string(), json!(false));

        let qualification_id = self.market.create_qualification_type(request).await?;

        file.section_mut(self.mode)
            .insert(name.to_string(), json!(qualification_id));
        file.save(path)?;

        self.log.record(&format!(
            "{} (Bogus) Qualification {} was created",
            name, qualification_id
        ))?;

        Ok(qualification_id)
    }

    /// 删除占位资格，不存在时什么都不做
    pub async fn delete_bogus(&self, name: &str) -> AppResult<()> {
        let path = self.control_path()?;
        let mut file = QualificationFile::load(path)?;

        let qualification_id = match file.lookup(self.mode, name) {
            Some(id) => id.to_string(),
            None => {
                self.log.record("QualificationID doesn't exist already!")?;
                return Ok(());
            }
        };

        self.market
            .delete_qualification_type(&qualification_id)
            .await?;

        file.section_mut(self.mode).remove(name);
        file.save(path)?;

        self.log.record(&format!(
            "{} (Bogus) Qualification {} was deleted",
            name, qualification_id
        ))?;

        Ok(())
    }

    /// 占位资格的远程 ID
    pub fn bogus_id(&self, name: &str) -> AppResult<String> {
        let path = self.control_path()?;
        let file = QualificationFile::load(path)?;
        file.lookup(self.mode, name)
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::Qualification(QualificationError::UnknownName {
                    name: name.to_string(),
                    path: path.display().to_string(),
                })
            })
    }

    /// 给工人授予资格（值为 1，不通知）
    pub async fn assign(&self, worker_id: &str, qualification: &QualificationRef) -> AppResult<()> {
        let qualification_id = match qualification {
            QualificationRef::Id(id) => id.clone(),
            QualificationRef::Name(name) => self.bogus_id(name)?,
        };

        self.market
            .associate_qualification_with_worker(&qualification_id, worker_id, 1, false)
            .await?;

        self.log.record(&format!(
            "{} Qualification was assigned to {}",
            qualification_id, worker_id
        ))?;

        Ok(())
    }

    // ========== 正式资格 ==========

    /// 为每个 `*_meta.json` 创建正式资格
    ///
    /// 测试与答案只随请求发送，不写回记录文件
    ///
    /// # 返回
    /// 返回本次新建的 (前缀, ID)
    pub async fn create_scored(&self) -> AppResult<Vec<(String, String)>> {
        let folder = self.qualification_folder()?;
        let mut created = Vec::new();

        for meta_path in list_files_with_suffix(folder, META_SUFFIX)? {
            let mut file = QualificationFile::load(&meta_path)?;

            if let Some(existing) = file.lookup(self.mode, QUALIFICATION_ID_KEY) {
                self.log
                    .announce(&format!("QualificationID already exists! ({})", existing))?;
                continue;
            }

            let stem = file_stem(&meta_path);
            let prefix = name_prefix(&stem).to_string();
            let test = read_text(&folder.join(format!("{}_question.xml", prefix)))?;
            let answer_key = read_text(&folder.join(format!("{}_answers.xml", prefix)))?;

            let mut request = file.section(self.mode).clone();
            request.insert("Test".to_string(), JsonValue::String(test));
            request.insert("AnswerKey".to_string(), JsonValue::String(answer_key));

            let qualification_id = self.market.create_qualification_type(request).await?;

            file.section_mut(self.mode)
                .insert(QUALIFICATION_ID_KEY.to_string(), json!(qualification_id));
            file.save(&meta_path)?;

            self.log.record(&format!(
                "{} Qualification {} was created",
                display_name(&file, self.mode, &prefix),
                qualification_id
            ))?;

            created.push((prefix, qualification_id));
        }

        info!("✓ 新建正式资格 {} 个", created.len());
        Ok(created)
    }

    /// 删除正式资格；`names` 为空时删除全部
    ///
    /// # 返回
    /// 返回实际删除的数量
    pub async fn delete_scored(&self, names: Option<&[String]>) -> AppResult<usize> {
        let folder = self.qualification_folder()?;
        let mut deleted = 0;

        for meta_path in list_files_with_suffix(folder, META_SUFFIX)? {
            let stem = file_stem(&meta_path);
            let prefix = name_prefix(&stem).to_string();

            if let Some(names) = names {
                if !names.iter().any(|n| n == &prefix) {
                    continue;
                }
            }

            let mut file = QualificationFile::load(&meta_path)?;
            let qualification_id = match file.lookup(self.mode, QUALIFICATION_ID_KEY) {
                Some(id) => id.to_string(),
                None => {
                    self.log.announce("QualificationID doesn't exist already!")?;
                    continue;
                }
            };

            self.market
                .delete_qualification_type(&qualification_id)
                .await?;

            file.section_mut(self.mode).remove(QUALIFICATION_ID_KEY);
            file.save(&meta_path)?;

            self.log.record(&format!(
                "{} Qualification {} was deleted",
                display_name(&file, self.mode, &prefix),
                qualification_id
            ))?;
            deleted += 1;
        }

        Ok(deleted)
    }

    /// 正式资格的远程 ID（发布时解析占位要求）
    pub fn scored_id(&self, name: &str) -> AppResult<String> {
        let path = self.meta_path(name)?;
        if !path.exists() {
            return Err(AppError::Qualification(QualificationError::UnknownName {
                name: name.to_string(),
                path: path.display().to_string(),
            }));
        }

        let file = QualificationFile::load(&path)?;
        file.lookup(self.mode, QUALIFICATION_ID_KEY)
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::Qualification(QualificationError::NotCreated {
                    name: name.to_string(),
                    path: path.display().to_string(),
                })
            })
    }

    /// 把分数解码为答案
    pub fn decode_score(&self, name: &str, score: i64) -> AppResult<Map<String, JsonValue>> {
        let file = QualificationFile::load(&self.meta_path(name)?)?;
        let scoring = file.scoring.as_ref().ok_or_else(|| {
            AppError::Qualification(QualificationError::MissingScoring {
                name: name.to_string(),
            })
        })?;
        scoring.decode(name, score)
    }
}

fn display_name(file: &QualificationFile, mode: PaymentMode, fallback: &str) -> String {
    file.lookup(mode, "Name").unwrap_or(fallback).to_string()
}
