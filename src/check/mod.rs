//! HTTP检测模块
//!
//! 提供配置校验、请求执行、响应匹配和检测报告功能

pub mod executor;
pub mod matcher;
pub mod result;

// 重新导出主要类型
pub use executor::{run, validate, Check, HttpCheck};
pub use result::CheckReport;
