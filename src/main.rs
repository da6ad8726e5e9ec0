//! Penny - 销售教练对话助手
//!
//! 入口：加载配置、初始化日志、创建助手编排器与 TUI，并运行主循环。

use anyhow::Context;
use penny::config::{load_config, AppConfig};
use penny::core::create_assistant;
use penny::ui::{run_app, AppOptions, Theme};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (cfg, config_err) = match load_config(std::env::args_os().nth(1).map(Into::into)) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    penny::observability::init(&cfg.app.log_file)
        .with_context(|| format!("Failed to open log file {}", cfg.app.log_file.display()))?;
    if let Some(e) = config_err {
        tracing::warn!("Config load failed ({}), using defaults", e);
    }
    tracing::info!(
        delay_ms = cfg.chat.thinking_delay_ms,
        role = ?cfg.app.role,
        "starting {}",
        cfg.app.name
    );

    // 创建助手：返回命令/状态句柄与后台任务
    let (handle, task) = create_assistant(&cfg);

    let options = AppOptions {
        app_name: cfg.app.name.clone(),
        user_name: cfg.app.user_name.clone(),
        theme: Theme::from_config(&cfg.theme),
    };
    run_app(handle, options).await.context("App run failed")?;

    task.await.context("Assistant task panicked")?;
    Ok(())
}
