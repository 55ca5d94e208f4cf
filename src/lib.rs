//! HTTP Check - 单次HTTP/HTTPS主动检测
//!
//! 根据一份声明式配置发送一次HTTP(S)请求，并按以下策略验证响应：
//! - 状态码相等
//! - 响应体包含子串
//! - 响应体完全一致
//! - 响应体匹配正则表达式
//!
//! 校验器 [`validate`] 在编写配置时使用，执行器 [`run`] 在检测时使用，
//! 两者各自解析配置，不共享任何状态。

pub mod check;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;

// 重新导出主要类型
pub use check::{run, validate, Check, CheckReport, HttpCheck};
pub use config::{CheckConfig, ContentType, HttpVerb, MatchType};
pub use context::{CancelHandle, CheckContext, ContextError};
pub use error::{CheckError, HttpCheckError, MatchError, NetworkError};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
