/// 日志工具模块
///
/// 初始化 tracing 订阅者，并提供各阶段的输出格式
use std::path::Path;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::models::PaymentMode;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则默认 `info`，详细模式下为 `debug`
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `workspace`: 工作区目录
/// - `mode`: 支付模式
/// - `endpoint`: MTurk 端点
pub fn log_startup(workspace: &Path, mode: PaymentMode, endpoint: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 turco 启动 - {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    info!("📁 工作区: {}", workspace.display());
    info!("💰 支付模式: {}", mode);
    info!("🌐 端点: {}", endpoint);
    info!("{}", "=".repeat(60));
}

pub fn log_rendered(count: usize, xml_folder: &Path) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 渲染完成: {} 道题目 → {}", count, xml_folder.display());
    info!("{}", "─".repeat(60));
}

pub fn log_published(count: usize, mode: PaymentMode) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 发布完成: {} 个 HIT ({})", count, mode);
    if mode == PaymentMode::RealMoney {
        info!("💸 注意：真钱模式，工人完成后将实际付款");
    }
    info!("{}", "─".repeat(60));
}

/// 打印收集结果
///
/// # 参数
/// - `rows`: 导出的行数
/// - `path`: CSV 文件路径
pub fn log_collected(rows: usize, path: &Path) {
    info!("\n{}", "=".repeat(60));
    info!("📊 收集完成: {} 份作业", rows);
    info!("结果已保存至: {}", path.display());
    info!("{}", "=".repeat(60));
}
