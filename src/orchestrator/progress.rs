//! 进度通知
//!
//! 流水线在固定位置发出进度；通知是尽力而为的，接收方出错或 panic
//! 都不会影响处理结果。

use std::panic::{catch_unwind, AssertUnwindSafe};

use anyhow::Result;
use serde::Serialize;
use tracing::warn;

use crate::models::Language;

/// 进度类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProgressKind {
    /// 开始处理某个段落
    Processing,
    /// 刷新会话（节流暂停）
    RefreshingSession,
}

/// 一次进度通知
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// 段落位置（从0开始）
    pub index: usize,
    /// 段落总数
    pub total: usize,
    pub kind: ProgressKind,
    /// 面向用户的提示信息
    pub message: String,
}

impl Progress {
    pub fn processing(index: usize, total: usize, language: Language) -> Self {
        let message = match language {
            Language::Chinese => format!("处理第 {}/{} 段...", index + 1, total),
            Language::English => format!("Processing paragraph {}/{}...", index + 1, total),
        };
        Self {
            index,
            total,
            kind: ProgressKind::Processing,
            message,
        }
    }

    pub fn refreshing_session(index: usize, total: usize, language: Language) -> Self {
        let message = match language {
            Language::Chinese => format!("刷新AI会话... 第 {}/{} 段", index + 1, total),
            Language::English => {
                format!("Refreshing AI session... paragraph {}/{}", index + 1, total)
            }
        };
        Self {
            index,
            total,
            kind: ProgressKind::RefreshingSession,
            message,
        }
    }
}

/// 进度接收方
pub trait ProgressSink: Send + Sync {
    fn notify(&self, progress: &Progress) -> Result<()>;
}

impl<F> ProgressSink for F
where
    F: Fn(&Progress) -> Result<()> + Send + Sync,
{
    fn notify(&self, progress: &Progress) -> Result<()> {
        self(progress)
    }
}

/// 尽力而为地发出通知：错误和 panic 只记录日志
pub(crate) fn notify_best_effort(sink: Option<&dyn ProgressSink>, progress: &Progress) {
    let Some(sink) = sink else {
        return;
    };

    match catch_unwind(AssertUnwindSafe(|| sink.notify(progress))) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("进度回调失败（已忽略）: {:#}", e),
        Err(_) => warn!("进度回调发生 panic（已忽略）"),
    }
}
