//! HTTP Check 主程序入口

use anyhow::{Context, Result};
use clap::Parser;
use http_check::cli::{command_for, Args};
use http_check::logging::{LogConfig, LoggingSystem};
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let args = Args::parse();

    // 初始化日志系统
    let log_config = LogConfig {
        level: args.log_level.clone().into(),
        file_path: args.log_file.clone(),
        json_format: args.json_logs,
    };

    let _logging_system = LoggingSystem::setup_logging(log_config).context("初始化日志系统失败")?;

    debug!("{} v{} 启动", http_check::APP_NAME, http_check::VERSION);

    if let Err(e) = command_for(&args).execute(&args).await {
        eprintln!("错误: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
