//! 错误处理模块
//!
//! 定义检测核心与外围（配置加载、命令行）的统一错误类型

use crate::context::ContextError;
use thiserror::Error;

/// 响应体预览的最大字符数
const BODY_PREVIEW_LIMIT: usize = 256;

/// HTTP 检测的主要错误类型
///
/// 校验与执行阶段的每种失败都对应一个变体，错误信息中包含失败的字段或阶段
#[derive(Error, Debug)]
pub enum CheckError {
    /// 配置反序列化失败（格式错误、未知字段或字段类型不匹配）
    #[error("配置解析失败: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// 必填字段缺失或为空
    #[error("缺少必填字段: {field}")]
    MissingField { field: &'static str },

    /// 枚举字段的值不在允许范围内
    #[error("字段 {field} 的值无效: {value:?}，支持的值: {allowed:?}")]
    InvalidEnum {
        field: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },

    /// 不支持的HTTP方法
    #[error("不支持的HTTP方法: {0:?}")]
    UnsupportedVerb(String),

    /// 期望状态码不是整数
    #[error("无效的状态码: {value:?}; {source}")]
    Parse {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// 期望状态码超出 [100, 599]
    #[error("状态码超出范围 [100, 599]: {0}")]
    Range(i64),

    /// 请求构建失败（URL无效或参数非法）
    #[error("构建请求失败: {0}")]
    RequestConstruction(#[source] reqwest::Error),

    /// 网络层失败
    #[error("网络请求失败: {0}")]
    Network(#[from] NetworkError),

    /// 响应不满足期望
    #[error("响应不匹配: {0}")]
    Match(#[from] MatchError),

    /// 正则表达式编译失败
    #[error("无效的正则表达式: {pattern:?}; {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// 网络错误类型
#[derive(Error, Debug)]
pub enum NetworkError {
    /// 发送请求失败（DNS、连接、TLS握手等）
    #[error("发送请求失败: {0}")]
    Send(#[source] reqwest::Error),

    /// 读取响应体失败
    #[error("读取响应体失败: {0}")]
    Body(#[source] reqwest::Error),

    /// 上下文被取消或超过截止时间
    #[error("{0}")]
    Context(#[from] ContextError),
}

impl NetworkError {
    /// 判断是否由上下文取消或超时引起
    pub fn is_context(&self) -> bool {
        matches!(self, NetworkError::Context(_))
    }
}

/// 匹配失败类型
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MatchError {
    /// 状态码不匹配
    #[error("状态码不匹配: 期望 {expected}, 实际 {actual}")]
    StatusCode { expected: u16, actual: u16 },

    /// 响应体中未找到期望的子串
    #[error("响应体中未找到期望的内容 {expected:?}，响应体: {body_preview:?}")]
    SubstringNotFound {
        expected: String,
        body_preview: String,
    },

    /// 响应体与期望内容不完全一致
    #[error("响应体与期望内容不一致: 期望 {expected:?}，实际 {body_preview:?}")]
    ExactMismatch {
        expected: String,
        body_preview: String,
    },

    /// 正则表达式在响应体中没有匹配
    #[error("正则表达式 {pattern:?} 未匹配响应体: {body_preview:?}")]
    RegexNoMatch {
        pattern: String,
        body_preview: String,
    },
}

/// 截取响应体用于错误信息展示
pub(crate) fn body_preview(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    match text.char_indices().nth(BODY_PREVIEW_LIMIT) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.into_owned(),
    }
}

/// 配置加载错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置文件不存在
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    /// 读取配置文件失败
    #[error("读取配置文件失败: {0}")]
    ReadError(#[from] std::io::Error),

    /// 配置文件解析错误
    #[error("配置文件解析失败: {0}")]
    ParseError(String),

    /// 环境变量替换错误
    #[error("环境变量替换失败: {var}")]
    EnvVarError { var: String },
}

/// 应用程序的顶层错误类型
#[derive(Error, Debug)]
pub enum HttpCheckError {
    /// 检测相关错误
    #[error("检测失败: {0}")]
    Check(#[from] CheckError),

    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON序列化/反序列化错误
    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 其他错误
    #[error("其他错误: {0}")]
    Other(#[from] anyhow::Error),
}

/// 检测核心的结果类型别名
pub type Result<T> = std::result::Result<T, CheckError>;
