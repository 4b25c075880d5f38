use anyhow::Context;
use order_server::{Config, Server, init_logger_with_file, print_banner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (.env, 配置, 日志)
    dotenv::dotenv().ok();
    let config = Config::from_env().context("failed to load configuration")?;

    let log_dir = config.log_dir();
    let _log_guard = init_logger_with_file(None, config.log_json, Some(log_dir.as_path()));

    print_banner();
    tracing::info!(
        work_dir = %config.work_dir.display(),
        database = %config.database_path.display(),
        "Order server starting..."
    );

    // 2. 启动 HTTP 服务器 (Server::run 会初始化状态并启动后台任务)
    let server = Server::new(config);
    if let Err(e) = server.run().await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    Ok(())
}
