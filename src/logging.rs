//! 日志系统模块
//!
//! 命令行输出占用stdout，日志写到stderr或指定的日志文件

use log::LevelFilter;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter, Layer};

/// 已安装的日志配置，进程内只安装一次
static INSTALLED: OnceLock<Mutex<Option<LogConfig>>> = OnceLock::new();

/// 日志配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// 日志级别
    pub level: LevelFilter,
    /// 日志文件路径，设置后不再写stderr
    pub file_path: Option<PathBuf>,
    /// 是否使用JSON格式
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Warn,
            file_path: None,
            json_format: false,
        }
    }
}

/// 日志系统
#[derive(Debug)]
pub struct LoggingSystem {
    config: LogConfig,
}

impl LoggingSystem {
    /// 安装全局日志订阅器
    ///
    /// 重复调用时保留第一次安装的配置，不会报错
    ///
    /// # 参数
    /// * `config` - 日志配置
    ///
    /// # 返回
    /// * `anyhow::Result<LoggingSystem>` - 初始化结果
    pub fn setup_logging(config: LogConfig) -> anyhow::Result<Self> {
        let slot = INSTALLED.get_or_init(|| Mutex::new(None));
        let mut installed = slot
            .lock()
            .map_err(|_| anyhow::anyhow!("日志状态锁已损坏"))?;

        if installed.is_none() {
            Self::install(&config)?;
            *installed = Some(config.clone());
        }

        Ok(Self { config })
    }

    fn install(config: &LogConfig) -> anyhow::Result<()> {
        // log crate 的记录转发到 tracing
        if let Err(e) = tracing_log::LogTracer::init() {
            tracing::debug!("LogTracer已存在: {}", e);
        }

        let filter = EnvFilter::builder()
            .with_default_directive(level_directive(config.level)?)
            .from_env_lossy();

        let layer = match &config.file_path {
            Some(path) => {
                let file = std::fs::File::create(path)
                    .map_err(|e| anyhow::anyhow!("创建日志文件失败 {}: {}", path.display(), e))?;
                let layer = fmt::layer().with_writer(Mutex::new(file)).with_ansi(false);
                if config.json_format {
                    layer.json().boxed()
                } else {
                    layer.boxed()
                }
            }
            None => {
                let layer = fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_timer(fmt::time::ChronoUtc::rfc_3339());
                if config.json_format {
                    layer.json().boxed()
                } else {
                    layer.with_target(true).boxed()
                }
            }
        };

        if let Err(e) = registry().with(filter).with(layer).try_init() {
            // 测试进程里可能已有其他订阅器
            tracing::debug!("全局日志订阅器已存在: {}", e);
        }

        tracing::debug!("日志系统初始化完成: {:?}", config);
        Ok(())
    }

    /// 当前实例的配置
    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// 实际生效的日志配置（如果已安装）
    pub fn current_config() -> Option<LogConfig> {
        INSTALLED
            .get()
            .and_then(|slot| slot.lock().ok().and_then(|c| c.clone()))
    }
}

/// 将 log::LevelFilter 转换为过滤指令
fn level_directive(level: LevelFilter) -> anyhow::Result<Directive> {
    Ok(match level {
        LevelFilter::Off => "off".parse()?,
        LevelFilter::Error => Directive::from(tracing::Level::ERROR),
        LevelFilter::Warn => Directive::from(tracing::Level::WARN),
        LevelFilter::Info => Directive::from(tracing::Level::INFO),
        LevelFilter::Debug => Directive::from(tracing::Level::DEBUG),
        LevelFilter::Trace => Directive::from(tracing::Level::TRACE),
    })
}
