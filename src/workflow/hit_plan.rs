//! HIT 请求构建 - 流程层
//!
//! 共享的 CreateHIT 参数只解析一次（占位资格替换为真实 ID），
//! 之后每个任务都从这份基础参数复制出一份独立的请求，任务之间互不影响

use std::collections::BTreeMap;

use serde_json::{json, Map, Value as JsonValue};

use crate::error::AppResult;
use crate::workflow::hit_ctx::HitCtx;

const REQUIREMENTS_KEY: &str = "QualificationRequirements";
const PLACEHOLDER_KEY: &str = "Placeholder";
const TYPE_ID_KEY: &str = "QualificationTypeId";

/// 每个任务的附加选项
#[derive(Debug, Clone, Default)]
pub struct HitOverrides<'a> {
    /// 工人不能持有的占位资格 ID
    pub blocking_qualification: Option<&'a str>,
    /// 追加序号后的标题
    pub alter_title: bool,
}

/// 已解析的 CreateHIT 基础参数
#[derive(Debug, Clone)]
pub struct HitPlan {
    base: Map<String, JsonValue>,
    base_title: Option<String>,
    resolved: BTreeMap<String, String>,
}

impl HitPlan {
    /// 解析基础参数中的占位资格要求
    ///
    /// # 参数
    /// - `arguments`: 共享配置中的 CreateHIT 参数
    /// - `resolve`: 资格名 → 远程 ID
    pub fn resolve<F>(mut arguments: Map<String, JsonValue>, mut resolve: F) -> AppResult<Self>
    where
        F: FnMut(&str) -> AppResult<String>,
    {
        let mut resolved = BTreeMap::new();

        if let Some(JsonValue::Array(requirements)) = arguments.get_mut(REQUIREMENTS_KEY) {
            for requirement in requirements.iter_mut() {
                let Some(fields) = requirement.as_object_mut() else {
                    continue;
                };
                if fields.remove(PLACEHOLDER_KEY).is_none() {
                    continue;
                }

                let name = fields
                    .get(TYPE_ID_KEY)
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();
                let qualification_id = resolve(&name)?;

                fields.insert(TYPE_ID_KEY.to_string(), json!(qualification_id));
                resolved.insert(name, qualification_id);
            }
        }

        let base_title = arguments
            .get("Title")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        Ok(Self {
            base: arguments,
            base_title,
            resolved,
        })
    }

    /// 占位资格名 → ID
    pub fn resolved_qualifications(&self) -> &BTreeMap<String, String> {
        &self.resolved
    }

    /// 为单个任务构建完整的 CreateHIT 请求
    pub fn build(&self, ctx: &HitCtx, question: String, overrides: &HitOverrides<'_>) -> Map<String, JsonValue> {
        let mut request = self.base.clone();
        request.insert("Question".to_string(), JsonValue::String(question));

        if let Some(qualification_id) = overrides.blocking_qualification {
            let blocker = json!({
                TYPE_ID_KEY: qualification_id,
                "Comparator": "DoesNotExist"
            });
            match request.get_mut(REQUIREMENTS_KEY) {
                Some(JsonValue::Array(requirements)) => requirements.push(blocker),
                _ => {
                    request.insert(REQUIREMENTS_KEY.to_string(), JsonValue::Array(vec![blocker]));
                }
            }
        }

        if overrides.alter_title {
            if let Some(title) = &self.base_title {
                request.insert("Title".to_string(), json!(format!("{} {}", title, ctx.index)));
            }
        }

        if let Some(max_assignments) = ctx.max_assignments {
            request.insert("MaxAssignments".to_string(), json!(max_assignments));
        }

        request
    }
}
