/// 日志工具模块
///
/// 提供日志初始化以及格式化输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::models::{BatchJob, JobHandle};

/// 初始化 tracing 日志
///
/// `RUST_LOG` 优先；否则默认 `info`，`verbose` 时为 `debug`。
/// 重复调用是安全的（测试中常见）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `mode`: 运行模式（prep / submit / poll / cancel）
pub fn log_startup(mode: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - {} 模式", mode);
    info!(
        "启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
}

/// 记录批处理任务创建信息
///
/// 任务名是之后重新连接任务的唯一凭据，必须醒目输出。
pub fn log_job_created(handle: &JobHandle) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 已创建批处理任务: {}", handle);
    info!("💡 进程中断后可使用 `poll --job-id {}` 继续轮询", handle);
    info!("{}", "─".repeat(60));
}

/// 记录单次轮询状态
pub fn log_poll_status(job: &BatchJob, attempt: usize) {
    info!("⏳ [第 {} 次查询] 任务 {} 当前状态: {}", attempt, job.name, job.state);
}

/// 打印最终结果
///
/// # 参数
/// - `success`: 是否成功
/// - `summary`: 成功时的结果摘要（由各流程给出）
pub fn print_final_stats(success: bool, summary: Option<&str>) {
    info!("\n{}", "=".repeat(60));
    info!("📊 处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    match (success, summary) {
        (true, Some(summary)) => info!("✅ {}", summary),
        (true, None) => info!("✅ 处理成功"),
        (false, _) => info!("❌ 处理未能成功完成"),
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
