//! 单元测试用的脚本化客户端

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use crate::clients::CompletionClient;
use crate::models::Provider;

/// 按预设脚本回复的客户端，记录调用次数和收到的提示词
pub(crate) struct ScriptedClient {
    fail_first: usize,
    reply: Option<String>,
    error: String,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn new(fail_first: usize, reply: Option<&str>, error: &str) -> Self {
        Self {
            fail_first,
            reply: reply.map(str::to_string),
            error: error.to_string(),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// 始终返回固定内容
    pub fn always_ok(reply: &str) -> Self {
        Self::new(0, Some(reply), "")
    }

    /// 回复由提示词决定，用于验证确定性
    pub fn echo() -> Self {
        Self::new(0, None, "")
    }

    /// 前 `n` 次失败，之后返回固定内容
    pub fn failing_first(n: usize, reply: &str) -> Self {
        Self::new(n, Some(reply), "temporary failure")
    }

    /// 始终失败
    pub fn always_failing(error: &str) -> Self {
        Self::new(usize::MAX, None, error)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(
        &self,
        prompt: &str,
        _provider: Provider,
        _model: &str,
        _credential: &str,
    ) -> Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        if n <= self.fail_first {
            anyhow::bail!("{}", self.error);
        }

        Ok(match &self.reply {
            Some(reply) => reply.clone(),
            None => format!("echo:{}", prompt.chars().count()),
        })
    }
}
