//! 日志工具模块
//!
//! 提供日志初始化和输出的辅助函数

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, StartupOptions};
use crate::models::{Progress, Question};

/// 初始化 tracing 日志
///
/// `RUST_LOG` 优先；否则使用配置中的过滤规则，开启详细日志时为 debug。
/// 重复调用不会报错。
pub fn init(config: &Config) {
    let default_filter = if config.verbose_logging {
        "debug"
    } else {
        config.log_filter.as_str()
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config, options: &StartupOptions) {
    info!("{}", "=".repeat(60));
    info!("🚀 答题会话启动");
    info!("🌐 题库服务: {}", config.server_url);
    if let Some(filter) = &options.initial_filter {
        info!("📚 预设筛选: {}", filter);
    }
    if options.zen_mode {
        info!("🧘 专注模式");
    }
    if options.jump_to_next_unattempted {
        info!("⏭️ 跳到下一道未作答的题");
    }
    info!("{}", "=".repeat(60));
}

/// 记录进度
pub fn log_progress(progress: &Progress) {
    info!(
        "📊 进度: 已答 {}/{} ({:.1}%), 正确 {}",
        progress.attempted, progress.total, progress.percentage, progress.correct
    );
}

/// 记录当前题目
pub fn log_question(index: usize, total: usize, question: &Question) {
    debug!(
        "第 {}/{} 题 [{}]: {}",
        index + 1,
        total,
        question.id,
        truncate_text(&question.content, 80)
    );
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符数）
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
