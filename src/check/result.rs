//! 检测报告数据结构
//!
//! 记录单次检测的结果，供命令行输出或上层框架汇总

use crate::check::executor;
use crate::config::CheckConfig;
use crate::context::CheckContext;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// 单次检测报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    /// 检测ID
    pub id: Uuid,
    /// 目标URL（配置无法解析时为空）
    pub url: String,
    /// HTTP方法
    pub verb: Option<String>,
    /// 匹配策略
    pub match_type: Option<String>,
    /// 检测开始时间
    pub timestamp: DateTime<Utc>,
    /// 检测耗时
    #[serde(with = "duration_serde")]
    pub elapsed: Duration,
    /// 是否通过
    pub success: bool,
    /// 错误信息（如果有）
    pub error: Option<String>,
}

impl CheckReport {
    /// 执行检测并生成报告
    ///
    /// # 参数
    /// * `ctx` - 检测上下文
    /// * `config` - JSON格式的检测配置
    ///
    /// # 返回
    /// * `CheckReport` - 检测报告
    pub async fn capture(ctx: &CheckContext, config: &str) -> Self {
        let timestamp = Utc::now();
        let start_time = Instant::now();

        let outcome = executor::run(ctx, config).await;
        let elapsed = start_time.elapsed();

        // 仅用于报告标注，检测本身已独立解析配置
        let decoded = CheckConfig::decode(config).ok();

        Self {
            id: Uuid::new_v4(),
            url: decoded.as_ref().map(|c| c.url.clone()).unwrap_or_default(),
            verb: decoded.as_ref().map(|c| c.verb.to_string()),
            match_type: decoded.as_ref().map(|c| c.match_type.to_string()),
            timestamp,
            elapsed,
            success: outcome.is_ok(),
            error: outcome.err().map(|e| e.to_string()),
        }
    }

    /// 获取耗时（毫秒）
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }
}

impl std::fmt::Display for CheckReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = if self.success { "通过" } else { "失败" };
        write!(
            f,
            "[{}] {} {} ({}ms)",
            status,
            self.verb.as_deref().unwrap_or("-"),
            self.url,
            self.elapsed_ms()
        )?;
        if let Some(error) = &self.error {
            write!(f, ": {}", error)?;
        }
        Ok(())
    }
}

/// Duration 以毫秒序列化
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
