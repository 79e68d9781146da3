/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::SessionHandle;
use crate::workflow::ExportStats;

/// 初始化日志
///
/// `RUST_LOG` 优先；未设置时默认 info，详细模式下为 debug。
/// 重复调用不会报错（测试里可能已经初始化过）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 优学院练习题导出");
    info!(
        "{}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🌐 接口地址: {}", config.base_url);
    info!("📁 输出目录: {}", config.output_dir);
    if config.probe_enabled {
        match config.probe_limit {
            Some(limit) => info!("🔎 探测标准答案: 开启 (最多 {} 题)", limit),
            None => info!("🔎 探测标准答案: 开启"),
        }
    } else {
        info!("🔎 探测标准答案: 关闭");
    }
    info!("{}", "=".repeat(60));
}

/// 记录会话信息（不含凭证）
pub fn log_session(session: &SessionHandle) {
    info!("📋 会话 {}", session);
    info!("🔑 凭证: 已设置 ({} 字符)", session.credential.chars().count());
}

/// 打印最终统计信息
pub fn print_final_stats(stats: &ExportStats, exported: &[String]) {
    info!("\n{}", "=".repeat(60));
    info!("📊 导出完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("📥 拉取题目: {}", stats.fetched);
    info!(
        "🔎 探测答案: {} (占位答案命中 {})",
        stats.probed, stats.lucky_hits
    );
    info!("📝 使用答题卡记录: {}", stats.recorded);
    if stats.unresolved > 0 {
        info!("⚠️ 无答案: {}", stats.unresolved);
    }
    info!(
        "✅ 选择题 {} | 判断题 {} | 填空题 {} | 问答题 {}",
        stats.choice, stats.true_false, stats.fill_blank, stats.essay
    );
    if stats.dropped > 0 {
        info!("❌ 丢弃: {}", stats.dropped);
    }
    info!("{}", "=".repeat(60));
    for path in exported {
        info!("已保存至: {}", path);
    }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("abcdef", 3), "abc...");
        assert_eq!(truncate_text("题干很短", 10), "题干很短");
        assert_eq!(truncate_text("一二三四", 2), "一二...");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(false);
        init(true);
    }
}
