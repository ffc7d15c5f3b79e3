//! # Grammar Check
//!
//! 读取 Word 文档，逐段调用 AI 进行语法检查和自定义检查，结果导出为 Excel
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 文本生成服务的访问入口
//! - `CompletionClient` - 发送提示词、取回文本的能力抽象
//! - `LlmClient` - OpenAI 兼容接口实现（OpenAI / Gemini）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `prompt` - 构建语法检查和额外检查的提示词
//! - `retry` - 重试与失败降级
//! - `document_reader` - 读取文档段落
//! - `result_writer` - 写入 Excel
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个段落"的完整处理流程
//! - `ParagraphCtx` - 上下文封装（段落位置）
//! - `ParagraphFlow` - 流程编排（语法检查 → 额外检查）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/pipeline` - 段落流水线，节流、进度与取消
//! - `orchestrator/worker` - 后台运行与事件通道
//! - `orchestrator/document_processor` - 单个文档处理器
//! - `orchestrator/batch_processor` - 批量文档处理器
//!
//! ## 模块结构
//!
//! ```text
//! cli            命令行入口（check / batch）
//! config         配置文件、环境变量与单次运行配置
//! error          错误类型
//! models         语言、供应商、检查项与结果记录
//! clients        文本生成客户端
//! services       提示词、重试、文档读取、结果写入
//! workflow       单个段落的检查流程
//! orchestrator   流水线、后台运行、文档与批量处理
//! utils          日志工具
//! ```

pub mod cli;
pub mod clients;
pub mod config;
pub mod error;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

#[cfg(test)]
mod testing;

// 重新导出常用类型
pub use clients::{CompletionClient, LlmClient};
pub use config::{Config, RunConfig};
pub use error::{AppError, AppResult};
pub use models::{Language, Provider, ResultRecord};
pub use orchestrator::{process_paragraphs, spawn_pipeline, DocumentProcessor, Progress};
pub use workflow::{ParagraphCtx, ParagraphFlow};
