//! 单个文档处理器 - 编排层
//!
//! ## 核心功能
//!
//! 1. **读取文档**：拆分为段落
//! 2. **流水线处理**：委托 `ParagraphPipeline`
//! 3. **保存结果**：写入 Excel
//! 4. **备用导出**：保存失败时把结果导出为 JSON 到临时目录

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::clients::CompletionClient;
use crate::config::RunConfig;
use crate::error::{AppResult, PersistError};
use crate::models::ResultRecord;
use crate::orchestrator::pipeline::ParagraphPipeline;
use crate::orchestrator::progress::ProgressSink;
use crate::services::{is_failure_text, read_paragraphs, save_json, ResultWriter};
use crate::utils::logging;

/// 默认输出文件名后缀
pub const OUTPUT_SUFFIX: &str = "_语法检查结果.xlsx";

/// 单个文档的处理结果
#[derive(Debug)]
pub enum DocumentOutcome {
    /// 文档中没有有效段落
    NothingToProcess,
    /// 结果已保存
    Saved(DocumentReport),
    /// 检查完成但保存失败
    SaveFailed {
        error: PersistError,
        /// 备用导出的路径（若成功）
        fallback: Option<PathBuf>,
        records: Vec<ResultRecord>,
    },
}

/// 保存成功时的统计
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReport {
    pub output: PathBuf,
    pub paragraphs: usize,
    pub completed: usize,
    /// 含有失败占位文本的段落数
    pub degraded: usize,
    pub sessions: usize,
}

/// 根据输入路径生成默认输出路径
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    let parent = input.parent().unwrap_or_else(|| Path::new(""));
    parent.join(format!("{}{}", stem, OUTPUT_SUFFIX))
}

/// 单个文档处理器
pub struct DocumentProcessor<'a> {
    pipeline: ParagraphPipeline<'a>,
    config: &'a RunConfig,
}

impl<'a> DocumentProcessor<'a> {
    pub fn new(client: &'a dyn CompletionClient, config: &'a RunConfig) -> Self {
        Self {
            pipeline: ParagraphPipeline::new(client),
            config,
        }
    }

    pub fn with_progress(mut self, sink: &'a dyn ProgressSink) -> Self {
        self.pipeline = self.pipeline.with_progress(sink);
        self
    }

    pub fn with_cancellation(mut self, cancel: tokio_util::sync::CancellationToken) -> Self {
        self.pipeline = self.pipeline.with_cancellation(cancel);
        self
    }

    /// 处理单个文档
    ///
    /// 文档和配置错误通过 `Err` 返回；保存失败通过 `DocumentOutcome::SaveFailed` 返回，
    /// 以便调用方仍能拿到内存中的结果
    pub async fn process(&self, input: &Path, output: &Path) -> AppResult<DocumentOutcome> {
        self.config.validate()?;

        let paragraphs = read_paragraphs(input).await?;
        if paragraphs.is_empty() {
            warn!("⚠️ 未能读取到有效段落: {}", input.display());
            return Ok(DocumentOutcome::NothingToProcess);
        }
        logging::log_document_loaded(input, paragraphs.len(), self.config);

        let records = self.pipeline.process(&paragraphs, self.config).await?;

        let writer = ResultWriter::new(self.config.language);
        if let Err(error) = writer.save(&records, output) {
            error!("❌ {}", error);
            let fallback = export_fallback(&records, output);
            return Ok(DocumentOutcome::SaveFailed {
                error,
                fallback,
                records,
            });
        }

        let degraded = records
            .iter()
            .filter(|r| r.outcomes().any(is_failure_text))
            .count();

        Ok(DocumentOutcome::Saved(DocumentReport {
            output: output.to_path_buf(),
            paragraphs: paragraphs.len(),
            completed: records.len(),
            degraded,
            sessions: self.config.session_count(paragraphs.len()),
        }))
    }
}

/// 保存失败时导出到系统临时目录
fn export_fallback(records: &[ResultRecord], output: &Path) -> Option<PathBuf> {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "grammar_check".to_string());
    let fallback = std::env::temp_dir().join(format!("{}.json", stem));

    match save_json(records, &fallback) {
        Ok(()) => {
            info!("💾 结果已备份到: {}", fallback.display());
            Some(fallback)
        }
        Err(e) => {
            error!("❌ 备用导出也失败了: {}", e);
            None
        }
    }
}
