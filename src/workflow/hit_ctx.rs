//! HIT 发布上下文
//!
//! 封装"我正在发布第几个任务、它叫什么"这一信息

use std::fmt::Display;
use std::path::PathBuf;

use crate::models::loaders::{file_stem, name_prefix};

/// 单个 HIT 的发布上下文
#[derive(Debug, Clone)]
pub struct HitCtx {
    /// 题目名（题目文件名去掉扩展名）
    pub task_name: String,

    /// 本次发布中的序号（从 0 开始，用于改标题）
    pub index: usize,

    /// 渲染好的题目文件
    pub artifact_path: PathBuf,

    /// 指定的最大作业数
    pub max_assignments: Option<u64>,
}

impl HitCtx {
    /// 创建新的发布上下文
    pub fn new(artifact_path: PathBuf, index: usize, max_assignments: Option<u64>) -> Self {
        Self {
            task_name: file_stem(&artifact_path),
            index,
            artifact_path,
            max_assignments,
        }
    }

    /// 用于匹配占位资格的名称前缀
    pub fn name_prefix(&self) -> &str {
        name_prefix(&self.task_name)
    }
}

impl Display for HitCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[任务 #{} {}]", self.index, self.task_name)
    }
}
