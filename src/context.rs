//! 检测执行上下文
//!
//! 提供取消信号与截止时间，网络请求在执行期间持续观察该上下文

use std::future::pending;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};

/// 上下文结束原因
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    /// 调用方主动取消
    #[error("检测已被取消")]
    Cancelled,
    /// 超过截止时间
    #[error("检测超过截止时间")]
    DeadlineExceeded,
}

/// 检测上下文
///
/// 克隆开销很小，克隆出的上下文共享同一个取消信号
#[derive(Debug, Clone, Default)]
pub struct CheckContext {
    /// 取消信号接收端，`None` 表示不可取消
    cancel_rx: Option<watch::Receiver<bool>>,
    /// 截止时间
    deadline: Option<Instant>,
}

/// 取消句柄，调用 [`CancelHandle::cancel`] 结束关联的上下文
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// 取消关联的上下文，重复调用无副作用
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl CheckContext {
    /// 创建永不取消、没有截止时间的上下文
    pub fn background() -> Self {
        Self::default()
    }

    /// 创建可取消的上下文
    ///
    /// # 返回
    /// * `(Self, CancelHandle)` - 上下文和取消句柄
    pub fn with_cancel() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        (
            Self {
                cancel_rx: Some(rx),
                deadline: None,
            },
            CancelHandle { tx },
        )
    }

    /// 设置相对截止时间
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// 设置绝对截止时间，已有更早的截止时间时保留较早者
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// 获取截止时间
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// 判断上下文是否已取消
    pub fn is_cancelled(&self) -> bool {
        self.cancel_rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// 等待上下文结束并返回结束原因
    ///
    /// 不可取消且没有截止时间的上下文永远不会结束
    pub async fn done(&self) -> ContextError {
        let cancelled = async {
            if let Some(rx) = &self.cancel_rx {
                let mut rx = rx.clone();
                // 取消句柄被丢弃时视为永不取消
                if rx.wait_for(|cancelled| *cancelled).await.is_ok() {
                    return;
                }
            }
            pending::<()>().await
        };

        let expired = async {
            match self.deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => ContextError::Cancelled,
            _ = expired => ContextError::DeadlineExceeded,
        }
    }
}
