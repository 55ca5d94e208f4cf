//! 命令行参数定义
//!
//! 使用clap定义应用程序的命令行接口

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// HTTP Check - 单次HTTP/HTTPS主动检测工具
#[derive(Parser, Debug, Clone)]
#[command(
    name = "http-check",
    version = crate::VERSION,
    about = crate::APP_DESCRIPTION,
    long_about = None
)]
pub struct Args {
    /// 日志级别
    #[arg(
        short,
        long,
        value_enum,
        default_value = "warn",
        help = "日志级别",
        env = "HTTP_CHECK_LOG_LEVEL",
        global = true
    )]
    pub log_level: LogLevel,

    /// 是否输出JSON格式日志
    #[arg(long, help = "输出JSON格式日志", global = true)]
    pub json_logs: bool,

    /// 日志文件路径
    #[arg(
        long,
        value_name = "FILE",
        help = "将日志写入文件而不是stderr",
        global = true
    )]
    pub log_file: Option<PathBuf>,

    /// 是否禁用环境变量替换
    #[arg(long, help = "禁用配置中的 ${VAR} 环境变量替换", global = true)]
    pub no_env: bool,

    /// 子命令
    #[command(subcommand)]
    pub command: Commands,
}

/// 日志级别枚举
#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum LogLevel {
    /// 调试级别
    Debug,
    /// 信息级别
    Info,
    /// 警告级别
    Warn,
    /// 错误级别
    Error,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

/// 输出格式
#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum OutputFormat {
    /// 文本格式
    Text,
    /// JSON格式
    Json,
}

/// 子命令定义
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// 校验检测配置
    Validate {
        /// 配置文件路径（.json 或 .toml）
        #[arg(
            short,
            long,
            value_name = "FILE",
            help = "配置文件路径",
            env = "HTTP_CHECK_CONFIG"
        )]
        config: PathBuf,

        /// 显示解析后的配置
        #[arg(short, long, help = "显示解析后的配置")]
        verbose: bool,
    },

    /// 执行一次检测
    Run {
        /// 配置文件路径（.json 或 .toml）
        #[arg(
            short,
            long,
            value_name = "FILE",
            help = "配置文件路径",
            env = "HTTP_CHECK_CONFIG"
        )]
        config: PathBuf,

        /// 检测截止时间（秒），不指定时不设超时
        #[arg(short, long, value_name = "SECONDS", help = "检测超时时间（秒）")]
        timeout: Option<u64>,

        /// 输出格式
        #[arg(short, long, value_enum, default_value = "text", help = "输出格式")]
        format: OutputFormat,
    },

    /// 显示版本信息
    Version {
        /// 输出格式
        #[arg(short, long, value_enum, default_value = "text", help = "输出格式")]
        format: OutputFormat,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_run_command() {
        let args = Args::try_parse_from([
            "http-check",
            "run",
            "--config",
            "check.toml",
            "--timeout",
            "5",
            "--format",
            "json",
        ])
        .unwrap();

        match args.command {
            Commands::Run {
                config,
                timeout,
                format,
            } => {
                assert_eq!(config, PathBuf::from("check.toml"));
                assert_eq!(timeout, Some(5));
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "http-check",
            "validate",
            "-c",
            "check.json",
            "--log-level",
            "debug",
            "--no-env",
        ])
        .unwrap();

        assert_eq!(args.log_level, LogLevel::Debug);
        assert!(args.no_env);
        assert!(args.log_file.is_none());
        assert!(matches!(args.command, Commands::Validate { verbose: false, .. }));
    }

    #[test]
    fn test_parse_log_file() {
        let args = Args::try_parse_from([
            "http-check",
            "--log-file",
            "/tmp/http-check.log",
            "version",
        ])
        .unwrap();

        assert_eq!(args.log_file, Some(PathBuf::from("/tmp/http-check.log")));
        assert_eq!(args.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
    }
}
