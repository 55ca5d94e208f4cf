//! 配置管理模块
//!
//! 提供检测配置的解码、验证和文件加载功能

pub mod loader;
pub mod types;

// 重新导出主要类型
pub use loader::{ConfigFormat, ConfigLoader};
pub use types::{
    parse_status_code, validate_config, CheckConfig, ContentType, HttpVerb, MatchType,
};
