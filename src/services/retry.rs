//! 重试策略 - 业务能力层
//!
//! 包装 `CompletionClient`：固定间隔重试，全部失败时返回带标记的错误文本，
//! 而不是向上抛出错误。

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::clients::CompletionClient;
use crate::config::RunConfig;
use crate::error::Cancelled;

/// 调用彻底失败时写入结果的固定标记
pub const COMPLETION_FAILED_MARKER: &str = "API调用失败";

/// 生成失败占位文本
pub fn failure_text(error: &str) -> String {
    format!("{}: {}", COMPLETION_FAILED_MARKER, error)
}

/// 判断一条结果是否为失败占位文本
pub fn is_failure_text(text: &str) -> bool {
    text.starts_with(COMPLETION_FAILED_MARKER)
}

/// 固定间隔的重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    retry_delay: Duration,
}

impl RetryPolicy {
    /// 创建重试策略，`max_retries` 至少为 1
    pub fn new(max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            max_retries: max_retries.max(1),
            retry_delay,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// 带重试地调用一次文本生成
    ///
    /// # 返回
    /// - `Ok(text)`: 成功的回复，或所有尝试失败后的占位文本
    /// - `Err(Cancelled)`: 请求前、请求中或重试等待中检测到取消
    pub async fn complete(
        &self,
        client: &dyn CompletionClient,
        prompt: &str,
        config: &RunConfig,
        cancel: &CancellationToken,
    ) -> Result<String, Cancelled> {
        let mut last_error = String::new();

        for attempt in 1..=self.max_retries {
            if cancel.is_cancelled() {
                return Err(Cancelled);
            }

            let result = tokio::select! {
                _ = cancel.cancelled() => return Err(Cancelled),
                result = client.complete(prompt, config.provider, &config.model, &config.credential) => result,
            };

            match result {
                Ok(text) => {
                    if attempt > 1 {
                        debug!("第 {} 次尝试成功", attempt);
                    }
                    return Ok(text);
                }
                Err(e) => {
                    warn!(
                        "⚠️ API 调用失败 (第 {}/{} 次): {:#}",
                        attempt, self.max_retries, e
                    );
                    last_error = format!("{:#}", e);

                    if attempt < self.max_retries {
                        tokio::select! {
                            _ = cancel.cancelled() => return Err(Cancelled),
                            _ = tokio::time::sleep(self.retry_delay) => {}
                        }
                    }
                }
            }
        }

        Ok(failure_text(&last_error))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}
