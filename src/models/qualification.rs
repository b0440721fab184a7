use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::{AppError, AppResult, QualificationError};
use crate::models::loaders::{read_json, write_json};
use crate::models::PaymentMode;

/// 正式资格在分区中记录远程 ID 的键
pub const QUALIFICATION_ID_KEY: &str = "QualificationID";

/// 资格记录文件
///
/// 按支付模式分成 `RealMoney` / `FakeMoney` 两个分区，其余键原样保留
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualificationFile {
    #[serde(rename = "RealMoney", default)]
    pub real_money: Map<String, JsonValue>,
    #[serde(rename = "FakeMoney", default)]
    pub fake_money: Map<String, JsonValue>,
    #[serde(rename = "Scoring", default, skip_serializing_if = "Option::is_none")]
    pub scoring: Option<ScoringTable>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl QualificationFile {
    pub fn load(path: &Path) -> AppResult<Self> {
        read_json(path)
    }

    pub fn save(&self, path: &Path) -> AppResult<()> {
        write_json(path, self)
    }

    /// 当前模式的分区
    pub fn section(&self, mode: PaymentMode) -> &Map<String, JsonValue> {
        match mode {
            PaymentMode::RealMoney => &self.real_money,
            PaymentMode::FakeMoney => &self.fake_money,
        }
    }

    pub fn section_mut(&mut self, mode: PaymentMode) -> &mut Map<String, JsonValue> {
        match mode {
            PaymentMode::RealMoney => &mut self.real_money,
            PaymentMode::FakeMoney => &mut self.fake_money,
        }
    }

    /// 分区中 `key` 对应的字符串
    pub fn lookup(&self, mode: PaymentMode, key: &str) -> Option<&str> {
        self.section(mode).get(key).and_then(|v| v.as_str())
    }
}

/// 评分表：位置 → 数字 → 答案片段
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoringTable(pub BTreeMap<String, BTreeMap<String, Map<String, JsonValue>>>);

impl ScoringTable {
    /// 位置数量，即分数补零后的位数
    pub fn width(&self) -> usize {
        self.0.len()
    }

    /// 把分数解码为合并后的答案
    ///
    /// 分数补零到 `width()` 位，第 i 位数字在位置 i 的子表中取片段，按位置顺序合并
    pub fn decode(&self, name: &str, score: i64) -> AppResult<Map<String, JsonValue>> {
        let width = self.width();
        let digits = format!("{:0>width$}", score, width = width);

        if score < 0 || digits.len() != width {
            return Err(AppError::Qualification(QualificationError::ScoreWidthMismatch {
                name: name.to_string(),
                score,
                width,
            }));
        }

        let digits: Vec<char> = digits.chars().collect();
        let mut merged = Map::new();

        for (position, key, table) in self.ordered_positions(name)? {
            let digit = digits.get(position).copied().ok_or_else(|| {
                AppError::Qualification(QualificationError::InvalidScoring {
                    name: name.to_string(),
                    reason: format!("位置 {} 超出 {} 位", position, width),
                })
            })?;

            let fragment = table.get(digit.to_string().as_str()).ok_or_else(|| {
                AppError::Qualification(QualificationError::MissingFragment {
                    name: name.to_string(),
                    position: key.to_string(),
                    digit,
                })
            })?;

            for (k, v) in fragment {
                merged.insert(k.clone(), v.clone());
            }
        }

        Ok(merged)
    }

    /// 位置键按数值升序排列
    fn ordered_positions(
        &self,
        name: &str,
    ) -> AppResult<Vec<(usize, &str, &BTreeMap<String, Map<String, JsonValue>>)>> {
        let mut positions = Vec::with_capacity(self.0.len());
        for (key, table) in &self.0 {
            let position = key.parse::<usize>().map_err(|_| {
                AppError::Qualification(QualificationError::InvalidScoring {
                    name: name.to_string(),
                    reason: format!("位置键 '{}' 不是数字", key),
                })
            })?;
            positions.push((position, key.as_str(), table));
        }
        positions.sort_by_key(|(position, _, _)| *position);
        Ok(positions)
    }
}

/// 指定资格的方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualificationRef {
    /// 远程 QualificationTypeId
    Id(String),
    /// 占位资格记录中的名称
    Name(String),
}
