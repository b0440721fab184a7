//! HIT 发布服务 - 业务能力层
//!
//! ## 职责
//!
//! 1. 读取共享配置中的 CreateHIT 参数，解析占位资格
//! 2. 为每道题目构建独立的请求并调用 CreateHIT
//! 3. 按需注册提交通知
//! 4. 把本次发布写成一份账本快照（中途失败也会写入已创建的部分）

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info};

use crate::clients::LaborMarket;
use crate::config::WorkspaceArgs;
use crate::error::AppResult;
use crate::models::loaders::{list_files_with_suffix, read_text};
use crate::models::{LedgerSnapshot, NotificationSpec, PaymentMode, SharedConfig};
use crate::services::{ActivityLog, LedgerStore, QualificationService};
use crate::workflow::{HitCtx, HitOverrides, HitPlan};

/// 发布选项
#[derive(Debug, Clone)]
pub struct PublishOptions {
    /// 禁止持有同名占位资格的工人接单
    pub block_by_same_name: bool,
    /// 标题后追加序号
    pub alter_names: bool,
    /// 只发布指定题目，并覆盖其最大作业数
    pub precise: Option<BTreeMap<String, u64>>,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            block_by_same_name: false,
            alter_names: true,
            precise: None,
        }
    }
}

/// HIT 发布服务
pub struct HitPublisher {
    market: Arc<dyn LaborMarket>,
    qualifications: Arc<QualificationService>,
    ledger: LedgerStore,
    log: ActivityLog,
    mode: PaymentMode,
    config_path: PathBuf,
    xml_folder: PathBuf,
    queue_url: Option<String>,
}

impl HitPublisher {
    pub fn new(
        market: Arc<dyn LaborMarket>,
        qualifications: Arc<QualificationService>,
        args: &WorkspaceArgs,
        log: ActivityLog,
    ) -> Self {
        Self {
            market,
            qualifications,
            ledger: LedgerStore::new(args.out_folder_path.clone()),
            log,
            mode: args.payment_mode(),
            config_path: args.config_path.clone(),
            xml_folder: args.xml_folder_path.clone(),
            queue_url: args.queue_url.clone(),
        }
    }

    /// 发布题目
    ///
    /// # 返回
    /// 返回本次写入的账本快照
    pub async fn publish(&self, options: &PublishOptions) -> AppResult<LedgerSnapshot> {
        let shared = SharedConfig::load(&self.config_path)?;
        if options.alter_names {
            shared.title(&self.config_path)?;
        }

        let plan = HitPlan::resolve(shared.arguments, |name| self.qualifications.scored_id(name))?;
        let tasks = self.task_list(options)?;
        info!("📤 准备发布 {} 道题目 ({})", tasks.len(), self.mode);

        let mut snapshot = LedgerSnapshot {
            question_map: BTreeMap::new(),
            qualification_map: plan.resolved_qualifications().clone(),
        };

        let outcome = self.publish_tasks(&plan, tasks, options, &mut snapshot).await;

        match outcome {
            Ok(()) => {
                self.ledger.write_snapshot(&snapshot)?;
                info!("✓ 发布完成，共 {} 个 HIT", snapshot.question_map.len());
                Ok(snapshot)
            }
            Err(e) => {
                error!(
                    "❌ 发布中断: {}，已创建的 {} 个 HIT 仍写入账本",
                    e,
                    snapshot.question_map.len()
                );
                if !snapshot.question_map.is_empty() {
                    self.ledger.write_snapshot(&snapshot)?;
                }
                Err(e)
            }
        }
    }

    /// 待发布的题目
    fn task_list(&self, options: &PublishOptions) -> AppResult<Vec<HitCtx>> {
        let tasks = match &options.precise {
            Some(caps) => caps
                .iter()
                .enumerate()
                .map(|(index, (name, cap))| {
                    HitCtx::new(self.xml_folder.join(format!("{}.xml", name)), index, Some(*cap))
                })
                .collect(),
            None => list_files_with_suffix(&self.xml_folder, ".xml")?
                .into_iter()
                .enumerate()
                .map(|(index, path)| HitCtx::new(path, index, None))
                .collect(),
        };
        Ok(tasks)
    }

    async fn publish_tasks(
        &self,
        plan: &HitPlan,
        tasks: Vec<HitCtx>,
        options: &PublishOptions,
        snapshot: &mut LedgerSnapshot,
    ) -> AppResult<()> {
        for ctx in tasks {
            let blocking_id = if options.block_by_same_name {
                Some(self.qualifications.bogus_id(ctx.name_prefix())?)
            } else {
                None
            };
            let overrides = HitOverrides {
                blocking_qualification: blocking_id.as_deref(),
                alter_title: options.alter_names,
            };

            let question = read_text(&ctx.artifact_path)?;
            let request = plan.build(&ctx, question, &overrides);

            let hit = self.market.create_hit(request).await?;
            self.log.announce(&format!(
                "{} Hit was created\n{}",
                hit.hit_id,
                self.mode.preview_url(&hit.hit_group_id)
            ))?;
            snapshot
                .question_map
                .insert(ctx.task_name.clone(), hit.hit_id.clone());

            if let Some(queue_url) = &self.queue_url {
                let notification = NotificationSpec::assignment_submitted(queue_url);
                self.market
                    .update_notification_settings(&hit.hit_type_id, &notification, true)
                    .await?;
                info!("{} 🔔 已注册提交通知 → {}", ctx, queue_url);
            }
        }
        Ok(())
    }
}
