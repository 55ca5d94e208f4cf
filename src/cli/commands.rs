//! 命令处理逻辑
//!
//! 实现各种CLI命令的处理逻辑

use crate::check::{Check, CheckReport, HttpCheck};
use crate::cli::args::{Args, Commands, OutputFormat};
use crate::config::{CheckConfig, ConfigLoader};
use crate::context::CheckContext;
use crate::error::HttpCheckError;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// 命令执行结果
pub type Result<T> = std::result::Result<T, HttpCheckError>;

/// 命令处理器trait
#[async_trait]
pub trait Command: Send + Sync {
    /// 执行命令
    async fn execute(&self, args: &Args) -> Result<()>;
}

/// 根据参数选择命令处理器
pub fn command_for(args: &Args) -> Box<dyn Command> {
    match &args.command {
        Commands::Validate { .. } => Box::new(ValidateCommand),
        Commands::Run { .. } => Box::new(RunCommand),
        Commands::Version { .. } => Box::new(VersionCommand),
    }
}

/// 版本命令
pub struct VersionCommand;

#[async_trait]
impl Command for VersionCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Version { format } = &args.command {
            match format {
                OutputFormat::Json => {
                    let version_info = serde_json::json!({
                        "name": crate::APP_NAME,
                        "version": crate::VERSION,
                        "description": crate::APP_DESCRIPTION
                    });
                    println!("{}", serde_json::to_string_pretty(&version_info)?);
                }
                OutputFormat::Text => {
                    println!("{} v{}", crate::APP_NAME, crate::VERSION);
                    println!("{}", crate::APP_DESCRIPTION);
                }
            }
        }
        Ok(())
    }
}

/// 验证命令
pub struct ValidateCommand;

#[async_trait]
impl Command for ValidateCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Validate { config, verbose } = &args.command {
            self.validate_config_file(config, !args.no_env, *verbose)
                .await
        } else {
            Ok(())
        }
    }
}

impl ValidateCommand {
    /// 验证配置文件
    async fn validate_config_file(
        &self,
        config_path: &Path,
        enable_env: bool,
        verbose: bool,
    ) -> Result<()> {
        let loader = ConfigLoader::new(enable_env);
        let config_text = loader.load_from_file(config_path).await?;

        HttpCheck::new().validate(&config_text)?;

        println!("✓ 配置文件验证通过: {}", config_path.display());
        if verbose {
            let config = CheckConfig::decode(&config_text)?;
            println!("  URL: {}", config.url);
            println!("  方法: {}", config.verb);
            println!("  匹配策略: {}", config.match_type);
            println!("  期望输出: {}", config.expected_output);
            println!("  请求体类型: {}", config.content_type);
            println!(
                "  跳过证书校验: {}",
                if config.insecure { "是" } else { "否" }
            );
        }

        Ok(())
    }
}

/// 检测命令
pub struct RunCommand;

#[async_trait]
impl Command for RunCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Run {
            config,
            timeout,
            format,
        } = &args.command
        {
            self.perform_check(config, !args.no_env, *timeout, format)
                .await
        } else {
            Ok(())
        }
    }
}

impl RunCommand {
    /// 执行检测并输出报告
    async fn perform_check(
        &self,
        config_path: &Path,
        enable_env: bool,
        timeout: Option<u64>,
        format: &OutputFormat,
    ) -> Result<()> {
        let loader = ConfigLoader::new(enable_env);
        let config_text = loader.load_from_file(config_path).await?;

        let ctx = match timeout {
            Some(secs) => CheckContext::background().with_timeout(Duration::from_secs(secs)),
            None => CheckContext::background(),
        };

        let report = CheckReport::capture(&ctx, &config_text).await;

        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            OutputFormat::Text => println!("{}", report),
        }

        if report.success {
            Ok(())
        } else {
            Err(anyhow::anyhow!(report.error.unwrap_or_else(|| "检测失败".to_string())).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn write_config(content: &str, suffix: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_validate_command_accepts_valid_file() {
        let file = write_config(
            "url = \"http://example.com\"\nexpected_output = \"200\"\n",
            ".toml",
        );
        let path = file.path().to_string_lossy().to_string();
        let args =
            Args::try_parse_from(["http-check", "--no-env", "validate", "-c", &path]).unwrap();

        assert!(command_for(&args).execute(&args).await.is_ok());
    }

    #[tokio::test]
    async fn test_validate_command_rejects_invalid_file() {
        let file = write_config(
            r#"{"url": "http://example.com", "expected_output": "700"}"#,
            ".json",
        );
        let path = file.path().to_string_lossy().to_string();
        let args = Args::try_parse_from(["http-check", "validate", "-c", &path]).unwrap();

        let result = command_for(&args).execute(&args).await;
        assert!(matches!(
            result,
            Err(HttpCheckError::Check(crate::error::CheckError::Range(700)))
        ));
    }

    #[tokio::test]
    async fn test_run_command_reports_failure() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .with_status(503)
            .create_async()
            .await;

        let file = write_config(
            &format!(r#"{{"url": "{}/", "expected_output": "200"}}"#, server.url()),
            ".json",
        );
        let path = file.path().to_string_lossy().to_string();
        let args = Args::try_parse_from(["http-check", "run", "-c", &path, "-t", "5"]).unwrap();

        let result = command_for(&args).execute(&args).await;
        assert!(matches!(result, Err(HttpCheckError::Other(_))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_version_command() {
        let args = Args::try_parse_from(["http-check", "version", "--format", "json"]).unwrap();
        assert!(command_for(&args).execute(&args).await.is_ok());
    }
}
