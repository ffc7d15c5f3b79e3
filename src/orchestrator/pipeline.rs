//! 段落流水线 - 编排层
//!
//! ## 职责
//!
//! 把有序的段落列表和运行配置转换为有序的检查结果列表。
//!
//! ## 处理顺序（每个段落）
//!
//! 1. 检查取消标记
//! 2. 发出进度通知
//! 3. 会话刷新节流：每 `session_refresh_interval` 段暂停 1 秒
//! 4. 委托 `ParagraphFlow` 执行语法检查和额外检查
//! 5. 追加结果
//! 6. 段落间暂停 0.5 秒
//!
//! 段落严格按顺序处理，单项检查失败只会降级为错误文本，不会中断整个运行。

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::clients::CompletionClient;
use crate::config::RunConfig;
use crate::error::ConfigError;
use crate::models::ResultRecord;
use crate::orchestrator::progress::{notify_best_effort, Progress, ProgressSink};
use crate::workflow::{ParagraphCtx, ParagraphFlow};

/// 会话刷新时的暂停时长
pub const SESSION_REFRESH_PAUSE: Duration = Duration::from_secs(1);

/// 段落之间的暂停时长
pub const PARAGRAPH_THROTTLE: Duration = Duration::from_millis(500);

/// 段落流水线
pub struct ParagraphPipeline<'a> {
    client: &'a dyn CompletionClient,
    progress: Option<&'a dyn ProgressSink>,
    cancel: CancellationToken,
}

impl<'a> ParagraphPipeline<'a> {
    pub fn new(client: &'a dyn CompletionClient) -> Self {
        Self {
            client,
            progress: None,
            cancel: CancellationToken::new(),
        }
    }

    /// 设置进度接收方
    pub fn with_progress(mut self, sink: &'a dyn ProgressSink) -> Self {
        self.progress = Some(sink);
        self
    }

    /// 设置取消标记
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// 处理所有段落
    ///
    /// # 返回
    /// - `Ok(records)`: 每个段落一条结果，顺序与输入一致；被取消时只包含已完成的段落
    /// - `Err(ConfigError)`: 缺少 API 密钥，此时不会发起任何调用
    pub async fn process(
        &self,
        paragraphs: &[String],
        config: &RunConfig,
    ) -> Result<Vec<ResultRecord>, ConfigError> {
        config.validate()?;

        let total = paragraphs.len();
        let mut records = Vec::with_capacity(total);

        if total == 0 {
            debug!("没有需要处理的段落");
            return Ok(records);
        }

        let flow = ParagraphFlow::new(self.client, config, &self.cancel);

        for (index, paragraph) in paragraphs.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!("⚠️ 处理已取消，已完成 {}/{} 段", records.len(), total);
                break;
            }

            let ctx = ParagraphCtx::new(index, total);
            notify_best_effort(
                self.progress,
                &Progress::processing(index, total, config.language),
            );

            if config.is_session_refresh_point(index) {
                info!("{} 🔄 刷新AI会话", ctx);
                notify_best_effort(
                    self.progress,
                    &Progress::refreshing_session(index, total, config.language),
                );
                tokio::time::sleep(SESSION_REFRESH_PAUSE).await;
            }

            match flow.run(&ctx, paragraph).await {
                Ok(record) => records.push(record),
                Err(_) => {
                    warn!("{} ⚠️ 处理中途取消，丢弃该段落的未完成结果", ctx);
                    break;
                }
            }

            tokio::time::sleep(PARAGRAPH_THROTTLE).await;
        }

        info!("✓ 段落处理完成: {}/{}", records.len(), total);
        Ok(records)
    }
}

/// 便捷函数：处理所有段落
pub async fn process_paragraphs(
    client: &dyn CompletionClient,
    paragraphs: &[String],
    config: &RunConfig,
    progress: Option<&dyn ProgressSink>,
) -> Result<Vec<ResultRecord>, ConfigError> {
    let mut pipeline = ParagraphPipeline::new(client);
    if let Some(sink) = progress {
        pipeline = pipeline.with_progress(sink);
    }
    pipeline.process(paragraphs, config).await
}
