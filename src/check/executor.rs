//! HTTP检测执行器实现
//!
//! 解析配置、构建请求、发送并按匹配策略验证响应。
//! 每次调用独立构建客户端，调用之间不共享连接或TLS设置

use crate::check::matcher;
use crate::config::CheckConfig;
use crate::context::CheckContext;
use crate::error::{CheckError, NetworkError, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Request};
use tracing::{debug, warn};

/// 检测插件trait，定义校验与执行接口
#[async_trait]
pub trait Check: Send + Sync {
    /// 检测类型名称
    fn name(&self) -> &'static str;

    /// 校验配置
    ///
    /// # 参数
    /// * `config` - 序列化的检测配置
    ///
    /// # 返回
    /// * `Result<()>` - 配置合法时返回 `Ok(())`
    fn validate(&self, config: &str) -> Result<()>;

    /// 执行检测
    ///
    /// # 参数
    /// * `ctx` - 检测上下文，取消或超时会中止进行中的请求
    /// * `config` - 序列化的检测配置
    ///
    /// # 返回
    /// * `Result<()>` - 服务行为符合期望时返回 `Ok(())`
    async fn run(&self, ctx: &CheckContext, config: &str) -> Result<()>;
}

/// HTTP检测
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpCheck;

impl HttpCheck {
    /// 创建新的HTTP检测
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Check for HttpCheck {
    fn name(&self) -> &'static str {
        "http"
    }

    fn validate(&self, config: &str) -> Result<()> {
        validate(config)
    }

    async fn run(&self, ctx: &CheckContext, config: &str) -> Result<()> {
        run(ctx, config).await
    }
}

/// 校验检测配置
///
/// # 参数
/// * `config` - JSON格式的检测配置
///
/// # 返回
/// * `Result<()>` - 所有规则通过时返回 `Ok(())`
pub fn validate(config: &str) -> Result<()> {
    let config = CheckConfig::decode_validated(config)?;

    debug!(
        url = %config.url,
        verb = %config.verb,
        match_type = %config.match_type,
        "检测配置校验通过"
    );
    Ok(())
}

/// 执行一次HTTP检测
///
/// # 参数
/// * `ctx` - 检测上下文
/// * `config` - JSON格式的检测配置
///
/// # 返回
/// * `Result<()>` - 响应符合期望时返回 `Ok(())`
pub async fn run(ctx: &CheckContext, config: &str) -> Result<()> {
    let config = CheckConfig::decode(config).map_err(|e| match e {
        CheckError::InvalidEnum {
            field: "verb",
            value,
            ..
        } => CheckError::UnsupportedVerb(value),
        other => other,
    })?;

    debug!(
        url = %config.url,
        verb = %config.verb,
        match_type = %config.match_type,
        insecure = config.insecure,
        "开始执行HTTP检测"
    );

    let client = build_client(&config)?;
    let request = build_request(&client, &config)?;

    tokio::select! {
        biased;
        reason = ctx.done() => {
            warn!(url = %config.url, "HTTP检测中止: {}", reason);
            Err(NetworkError::from(reason).into())
        }
        result = exchange(&client, request, &config) => result,
    }
}

/// 构建本次调用专用的HTTP客户端
fn build_client(config: &CheckConfig) -> Result<Client> {
    Client::builder()
        .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
        .danger_accept_invalid_certs(config.insecure)
        .no_proxy()
        .build()
        .map_err(CheckError::RequestConstruction)
}

/// 构建HTTP请求
///
/// `content_type` 为 `empty` 时不带请求体，否则原样设置 Content-Type 头
fn build_request(client: &Client, config: &CheckConfig) -> Result<Request> {
    let mut request = client.request(config.verb.to_method(), config.url.as_str());

    if let Some(content_type) = config.content_type.header_value() {
        request = request
            .header(CONTENT_TYPE, content_type)
            .body(config.body.clone());
    }

    request.build().map_err(CheckError::RequestConstruction)
}

/// 发送请求并验证响应
async fn exchange(client: &Client, request: Request, config: &CheckConfig) -> Result<()> {
    let response = client.execute(request).await.map_err(NetworkError::Send)?;
    debug!(
        url = %config.url,
        status = response.status().as_u16(),
        "收到HTTP响应"
    );

    matcher::verify(config.match_type, &config.expected_output, response).await
}
