//! 段落检查流程 - 流程层
//!
//! 核心职责：定义"一个段落"的完整检查流程
//!
//! 流程顺序：
//! 1. 语法检查（始终执行）
//! 2. 按声明顺序执行每个非空的额外检查

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::clients::CompletionClient;
use crate::config::RunConfig;
use crate::error::Cancelled;
use crate::models::{numbered_requirements, AdditionalOutcome, CheckSpec, ResultRecord};
use crate::services::{build_prompt, is_failure_text, RetryPolicy};
use crate::utils::logging::truncate_text;
use crate::workflow::paragraph_ctx::ParagraphCtx;

/// 段落检查流程
///
/// - 为每项检查构建提示词并带重试地调用
/// - 单项检查失败只会得到占位文本，不会中断流程
/// - 不持有任何跨段落的状态
pub struct ParagraphFlow<'a> {
    client: &'a dyn CompletionClient,
    config: &'a RunConfig,
    policy: RetryPolicy,
    cancel: &'a CancellationToken,
}

impl<'a> ParagraphFlow<'a> {
    pub fn new(
        client: &'a dyn CompletionClient,
        config: &'a RunConfig,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            client,
            config,
            policy: config.retry_policy(),
            cancel,
        }
    }

    /// 检查单个段落
    ///
    /// 检测到取消时返回 `Err(Cancelled)`，此时该段落没有结果
    pub async fn run(&self, ctx: &ParagraphCtx, text: &str) -> Result<ResultRecord, Cancelled> {
        debug!("{} 内容: {}", ctx, truncate_text(text, 80));

        let grammar_check = self.check(ctx, text, &CheckSpec::Grammar).await?;
        let mut record = ResultRecord::new(text, grammar_check);

        for (index, requirement) in numbered_requirements(&self.config.additional_checks) {
            let outcome = self
                .check(ctx, text, &CheckSpec::Additional(requirement))
                .await?;
            record.additional_checks.push(AdditionalOutcome {
                index,
                requirement: requirement.to_string(),
                outcome,
            });
        }

        Ok(record)
    }

    async fn check(
        &self,
        ctx: &ParagraphCtx,
        text: &str,
        check: &CheckSpec<'_>,
    ) -> Result<String, Cancelled> {
        let prompt = build_prompt(text, self.config.language, check);
        let outcome = self
            .policy
            .complete(self.client, &prompt, self.config, self.cancel)
            .await?;

        let label = match check {
            CheckSpec::Grammar => "语法检查".to_string(),
            CheckSpec::Additional(requirement) => {
                format!("额外检查「{}」", truncate_text(requirement, 20))
            }
        };
        if is_failure_text(&outcome) {
            info!("{} ❌ {} 失败，已记录错误信息", ctx, label);
        } else {
            debug!("{} ✓ {} 完成", ctx, label);
        }

        Ok(outcome)
    }
}
