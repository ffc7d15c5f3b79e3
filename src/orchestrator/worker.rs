//! 后台运行器 - 编排层
//!
//! 在独立的 tokio 任务中运行流水线，通过消息通道把进度和结果送回调用方，
//! 调用方可以随时取消。已完成的结果在取消后仍然会返回。

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::clients::CompletionClient;
use crate::config::RunConfig;
use crate::error::ConfigError;
use crate::models::ResultRecord;
use crate::orchestrator::pipeline::ParagraphPipeline;
use crate::orchestrator::progress::Progress;

/// 后台任务发出的事件
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// 进度通知
    Progress(Progress),
    /// 运行结束
    Finished {
        /// 已完成的段落数
        completed: usize,
        /// 是否因取消而提前结束
        cancelled: bool,
    },
    /// 运行失败（配置错误）
    Failed(String),
}

/// 后台运行的句柄
pub struct PipelineHandle {
    events: UnboundedReceiver<PipelineEvent>,
    cancel: CancellationToken,
    task: JoinHandle<Result<Vec<ResultRecord>, ConfigError>>,
}

impl PipelineHandle {
    /// 接收下一个事件，任务结束且事件取完后返回 `None`
    pub async fn next_event(&mut self) -> Option<PipelineEvent> {
        self.events.recv().await
    }

    /// 请求取消
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// 等待任务结束并取回结果
    pub async fn join(self) -> Result<Vec<ResultRecord>> {
        let records = self.task.await.context("后台任务异常退出")??;
        Ok(records)
    }
}

/// 在后台任务中运行流水线
pub fn spawn_pipeline(
    client: Arc<dyn CompletionClient>,
    paragraphs: Vec<String>,
    config: RunConfig,
) -> PipelineHandle {
    let (tx, events) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let task = tokio::spawn(async move {
        let progress_tx = tx.clone();
        let sink = move |p: &Progress| -> Result<()> {
            progress_tx
                .send(PipelineEvent::Progress(p.clone()))
                .map_err(|_| anyhow::anyhow!("进度接收端已关闭"))
        };

        let result = ParagraphPipeline::new(client.as_ref())
            .with_progress(&sink)
            .with_cancellation(token.clone())
            .process(&paragraphs, &config)
            .await;

        let event = match &result {
            Ok(records) => PipelineEvent::Finished {
                completed: records.len(),
                cancelled: token.is_cancelled(),
            },
            Err(e) => PipelineEvent::Failed(e.to_string()),
        };
        if tx.send(event).is_err() {
            debug!("事件接收端已关闭");
        }

        result
    });

    PipelineHandle {
        events,
        cancel,
        task,
    }
}
