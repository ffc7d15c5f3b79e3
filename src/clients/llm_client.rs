/// LLM API 客户端
///
/// 封装所有与文本生成服务相关的调用逻辑
///
/// ## 技术栈
/// - 使用 `async-openai` crate 进行 API 调用
/// - OpenAI 与 Gemini 都通过 OpenAI 兼容接口访问
use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::Provider;

/// 文本生成能力
///
/// 流水线只依赖这个 trait，重试策略由调用方负责
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// 发送一次请求并返回模型回复
    async fn complete(
        &self,
        prompt: &str,
        provider: Provider,
        model: &str,
        credential: &str,
    ) -> Result<String>;
}

/// LLM 客户端
pub struct LlmClient {
    openai_base_url: String,
    gemini_base_url: String,
    temperature: f32,
    max_tokens: u32,
}

impl LlmClient {
    /// 创建新的 LLM 客户端
    pub fn new(config: &Config) -> Self {
        Self {
            openai_base_url: config.base_url_for(Provider::OpenAI).to_string(),
            gemini_base_url: config.base_url_for(Provider::Gemini).to_string(),
            temperature: 0.3,
            max_tokens: 500,
        }
    }

    fn base_url(&self, provider: Provider) -> &str {
        match provider {
            Provider::OpenAI => &self.openai_base_url,
            Provider::Gemini => &self.gemini_base_url,
        }
    }
}

#[async_trait]
impl CompletionClient for LlmClient {
    async fn complete(
        &self,
        prompt: &str,
        provider: Provider,
        model: &str,
        credential: &str,
    ) -> Result<String> {
        debug!("调用 LLM API，供应商: {}，模型: {}", provider, model);
        debug!("提示词长度: {} 字符", prompt.chars().count());

        let openai_config = OpenAIConfig::new()
            .with_api_key(credential)
            .with_api_base(self.base_url(provider));
        let client = Client::with_config(openai_config);

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()?;

        let response = client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            anyhow::anyhow!("LLM API 调用失败: {}", e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("LLM 返回内容为空"))?;

        Ok(content.trim().to_string())
    }
}
