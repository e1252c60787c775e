use anyhow::Result;
use quiz_progress::utils::logging;
use quiz_progress::{Config, QuizSession, StartupOptions};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logging::init(&config);

    // 启动参数：命令行给出题目地址时优先，否则读环境变量
    let options = match std::env::args().nth(1) {
        Some(url) => StartupOptions::from_url(&url),
        None => StartupOptions::from_env(),
    };
    logging::log_startup(&config, &options);

    let mut session = QuizSession::connect(&config, options);
    session.start().await;

    match session.current_question() {
        Some(question) => info!(
            "当前题目 {}/{}: {} [{}]",
            session.current_index() + 1,
            session.questions().len(),
            logging::truncate_text(&question.content, 80),
            session.current_state()
        ),
        None => info!("暂无可用的题目"),
    }

    session.export_progress(&config.state_export_path).await?;
    session.flush().await;

    Ok(())
}
