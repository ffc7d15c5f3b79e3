/// 日志工具模块
///
/// 提供日志初始化以及格式化输出的辅助函数
use std::path::Path;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::RunConfig;
use crate::orchestrator::batch_processor::BatchStats;
use crate::orchestrator::document_processor::DocumentReport;

/// 初始化日志
///
/// 默认级别为 `info`，可通过 `RUST_LOG` 覆盖；`verbose` 为真时使用 `debug`
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,grammar_check={},async_openai=warn",
            default_level
        ))
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(input: &Path, output: Option<&Path>, config: &RunConfig) {
    info!("{}", "=".repeat(60));
    info!("📝 Word文档AI语法检查器");
    info!("📄 输入: {}", input.display());
    if let Some(output) = output {
        info!("📊 输出: {}", output.display());
    }
    info!("🤖 模型: {} ({})", config.model, config.provider);
    info!("🌐 语言: {}", config.language);
    info!("{}", "=".repeat(60));
}

/// 记录文档加载信息
pub fn log_document_loaded(input: &Path, paragraphs: usize, config: &RunConfig) {
    let additional = config
        .additional_checks
        .iter()
        .filter(|c| !c.trim().is_empty())
        .count();
    info!("✓ 已读取 {}: {} 个段落", input.display(), paragraphs);
    info!(
        "📋 每段执行 1 项语法检查 + {} 项额外检查，会话刷新间隔: {}",
        additional, config.session_refresh_interval
    );
}

/// 记录单个文档完成信息
pub fn log_document_report(report: &DocumentReport) {
    info!("\n{}", "=".repeat(60));
    info!("📊 处理完成");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("总段落数: {}", report.paragraphs);
    info!("已完成: {}", report.completed);
    if report.degraded > 0 {
        info!("⚠️ 含失败结果的段落: {}", report.degraded);
    }
    info!("AI会话次数: {}", report.sessions);
    info!("结果文件: {}", report.output.display());
    info!("{}", "=".repeat(60));
}

/// 记录批量处理中单个文档的开始
pub fn log_batch_document_start(index: usize, total: usize, document: &Path) {
    info!("\n{}", "─".repeat(60));
    info!(
        "📦 处理文档 {}/{}: {}",
        index,
        total,
        document.file_name().unwrap_or_default().to_string_lossy()
    );
    info!("{}", "─".repeat(60));
}

/// 打印批量处理统计信息
pub fn log_batch_complete(stats: &BatchStats, output_folder: &Path) {
    info!("\n{}", "=".repeat(60));
    info!("📊 批量处理完成");
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", stats.success, stats.total);
    info!("⏭️ 空文档: {}", stats.empty);
    info!("❌ 失败: {}", stats.failed);
    if stats.cancelled {
        info!("⛔ 已取消，剩余文档未处理");
    }
    info!("输出文件夹: {}", output_folder.display());
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("你好世界", 2), "你好...");
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("", 3), "");
    }
}
