//! 检测配置数据结构定义
//!
//! 定义检测配置的结构体、枚举字段和验证逻辑

use crate::error::{CheckError, Result};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 最小合法HTTP状态码
pub const MIN_STATUS_CODE: i64 = 100;
/// 最大合法HTTP状态码
pub const MAX_STATUS_CODE: i64 = 599;

/// HTTP方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Connect,
    Trace,
}

impl HttpVerb {
    /// 支持的方法名称
    pub const ALLOWED: &'static [&'static str] = &[
        "GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS", "CONNECT", "TRACE",
    ];

    /// 配置中使用的名称
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Delete => "DELETE",
            HttpVerb::Patch => "PATCH",
            HttpVerb::Head => "HEAD",
            HttpVerb::Options => "OPTIONS",
            HttpVerb::Connect => "CONNECT",
            HttpVerb::Trace => "TRACE",
        }
    }

    /// 转换为reqwest的HTTP方法
    pub fn to_method(self) -> Method {
        match self {
            HttpVerb::Get => Method::GET,
            HttpVerb::Post => Method::POST,
            HttpVerb::Put => Method::PUT,
            HttpVerb::Delete => Method::DELETE,
            HttpVerb::Patch => Method::PATCH,
            HttpVerb::Head => Method::HEAD,
            HttpVerb::Options => Method::OPTIONS,
            HttpVerb::Connect => Method::CONNECT,
            HttpVerb::Trace => Method::TRACE,
        }
    }
}

impl FromStr for HttpVerb {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "GET" => Ok(HttpVerb::Get),
            "POST" => Ok(HttpVerb::Post),
            "PUT" => Ok(HttpVerb::Put),
            "DELETE" => Ok(HttpVerb::Delete),
            "PATCH" => Ok(HttpVerb::Patch),
            "HEAD" => Ok(HttpVerb::Head),
            "OPTIONS" => Ok(HttpVerb::Options),
            "CONNECT" => Ok(HttpVerb::Connect),
            "TRACE" => Ok(HttpVerb::Trace),
            other => Err(CheckError::InvalidEnum {
                field: "verb",
                value: other.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 响应匹配策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum MatchType {
    /// 状态码相等
    #[default]
    StatusCode,
    /// 响应体包含子串
    SubstringMatch,
    /// 响应体完全一致
    ExactMatch,
    /// 响应体匹配正则表达式
    RegexMatch,
}

impl MatchType {
    /// 支持的匹配策略名称
    pub const ALLOWED: &'static [&'static str] =
        &["statusCode", "substringMatch", "exactMatch", "regexMatch"];

    /// 配置中使用的名称
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::StatusCode => "statusCode",
            MatchType::SubstringMatch => "substringMatch",
            MatchType::ExactMatch => "exactMatch",
            MatchType::RegexMatch => "regexMatch",
        }
    }
}

impl FromStr for MatchType {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "statusCode" => Ok(MatchType::StatusCode),
            "substringMatch" => Ok(MatchType::SubstringMatch),
            "exactMatch" => Ok(MatchType::ExactMatch),
            "regexMatch" => Ok(MatchType::RegexMatch),
            other => Err(CheckError::InvalidEnum {
                field: "match_type",
                value: other.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 请求体类型，非 `Empty` 时原样作为 Content-Type 头的值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ContentType {
    #[serde(rename = "plain/text")]
    PlainText,
    #[serde(rename = "application/json")]
    Json,
    #[serde(rename = "x-www-form-urlencoded")]
    FormUrlEncoded,
    #[default]
    #[serde(rename = "empty")]
    Empty,
}

impl ContentType {
    /// 支持的请求体类型名称
    pub const ALLOWED: &'static [&'static str] = &[
        "plain/text",
        "application/json",
        "x-www-form-urlencoded",
        "empty",
    ];

    /// 配置中使用的名称
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::PlainText => "plain/text",
            ContentType::Json => "application/json",
            ContentType::FormUrlEncoded => "x-www-form-urlencoded",
            ContentType::Empty => "empty",
        }
    }

    /// Content-Type 头的值，`Empty` 表示请求不带请求体
    pub fn header_value(&self) -> Option<&'static str> {
        match self {
            ContentType::Empty => None,
            other => Some(other.as_str()),
        }
    }
}

impl FromStr for ContentType {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "plain/text" => Ok(ContentType::PlainText),
            "application/json" => Ok(ContentType::Json),
            "x-www-form-urlencoded" => Ok(ContentType::FormUrlEncoded),
            "empty" => Ok(ContentType::Empty),
            other => Err(CheckError::InvalidEnum {
                field: "content_type",
                value: other.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 序列化形式的检测配置，枚举字段保持字符串以便给出明确的错误
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCheckConfig {
    #[serde(default)]
    url: String,
    #[serde(default = "default_verb")]
    verb: String,
    #[serde(default)]
    expected_output: String,
    #[serde(default = "default_match_type")]
    match_type: String,
    #[serde(default)]
    insecure: bool,
    #[serde(default)]
    body: String,
    #[serde(default = "default_content_type")]
    content_type: String,
}

// 默认值函数
fn default_verb() -> String {
    "GET".to_string()
}
fn default_match_type() -> String {
    "statusCode".to_string()
}
fn default_content_type() -> String {
    "empty".to_string()
}

/// 检测配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckConfig {
    /// 目标URL
    pub url: String,
    /// HTTP方法
    pub verb: HttpVerb,
    /// 期望输出，含义由匹配策略决定
    pub expected_output: String,
    /// 匹配策略
    pub match_type: MatchType,
    /// 是否跳过TLS证书校验
    pub insecure: bool,
    /// 请求体
    pub body: String,
    /// 请求体类型
    pub content_type: ContentType,
}

impl CheckConfig {
    /// 从JSON文本解码检测配置
    ///
    /// 只做结构解码和枚举转换，必填字段与状态码范围由 [`validate_config`] 检查
    ///
    /// # 参数
    /// * `text` - JSON格式的配置文本
    ///
    /// # 返回
    /// * `Result<CheckConfig>` - 解码后的配置或错误
    pub fn decode(text: &str) -> Result<Self> {
        let raw: RawCheckConfig = serde_json::from_str(text)?;
        Self::from_raw(raw)
    }

    /// 解码并完整校验检测配置
    ///
    /// 检查顺序: url、verb、match_type、content_type、expected_output、状态码
    pub fn decode_validated(text: &str) -> Result<Self> {
        let raw: RawCheckConfig = serde_json::from_str(text)?;
        if raw.url.is_empty() {
            return Err(CheckError::MissingField { field: "url" });
        }

        let config = Self::from_raw(raw)?;
        validate_config(&config)?;
        Ok(config)
    }

    fn from_raw(raw: RawCheckConfig) -> Result<Self> {
        Ok(Self {
            verb: raw.verb.parse()?,
            match_type: raw.match_type.parse()?,
            content_type: raw.content_type.parse()?,
            url: raw.url,
            expected_output: raw.expected_output,
            insecure: raw.insecure,
            body: raw.body,
        })
    }

    /// 编码为JSON文本
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// 解析期望状态码
///
/// # 参数
/// * `expected` - 期望输出字段的原始值
///
/// # 返回
/// * `Result<u16>` - [100, 599] 范围内的状态码
pub fn parse_status_code(expected: &str) -> Result<u16> {
    let code: i64 = expected.parse().map_err(|source| CheckError::Parse {
        value: expected.to_string(),
        source,
    })?;

    if !(MIN_STATUS_CODE..=MAX_STATUS_CODE).contains(&code) {
        return Err(CheckError::Range(code));
    }

    Ok(code as u16)
}

/// 配置验证函数
///
/// # 参数
/// * `config` - 要验证的配置
///
/// # 返回
/// * `Result<()>` - 验证结果
pub fn validate_config(config: &CheckConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(CheckError::MissingField { field: "url" });
    }

    if config.expected_output.is_empty() {
        return Err(CheckError::MissingField {
            field: "expected_output",
        });
    }

    if config.match_type == MatchType::StatusCode {
        parse_status_code(&config.expected_output)?;
    }

    Ok(())
}
