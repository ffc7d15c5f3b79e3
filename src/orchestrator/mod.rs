//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责段落调度、节流与批量处理，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `pipeline` - 段落流水线
//! - 按顺序处理段落列表（Vec<String>）
//! - 会话刷新节流与段落间节流
//! - 进度通知与协作式取消
//!
//! ### `worker` - 后台运行器
//! - 在 tokio 任务中运行流水线
//! - 通过消息通道发送进度和结束事件
//!
//! ### `document_processor` - 单个文档处理器
//! - 读取文档 → 流水线 → 保存 Excel
//! - 保存失败时备用导出
//!
//! ### `batch_processor` - 批量文档处理器
//! - 扫描文件夹，逐个处理文档并汇总统计
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<Document>)
//!     ↓
//! document_processor (处理单个文档)
//!     ↓
//! pipeline (处理 Vec<Paragraph>)
//!     ↓
//! workflow::ParagraphFlow (处理单个段落)
//!     ↓
//! services (能力层：prompt / retry / reader / writer)
//!     ↓
//! clients (文本生成服务)
//! ```

pub mod batch_processor;
pub mod document_processor;
pub mod pipeline;
pub mod progress;
pub mod worker;

// 重新导出主要类型
pub use batch_processor::{BatchProcessor, BatchStats, FilePattern};
pub use document_processor::{default_output_path, DocumentOutcome, DocumentProcessor, DocumentReport};
pub use pipeline::{process_paragraphs, ParagraphPipeline, PARAGRAPH_THROTTLE, SESSION_REFRESH_PAUSE};
pub use progress::{Progress, ProgressKind, ProgressSink};
pub use worker::{spawn_pipeline, PipelineEvent, PipelineHandle};
