//! 批量文档处理器 - 编排层
//!
//! ## 职责
//!
//! 扫描文件夹中匹配的文档，逐个委托 `DocumentProcessor` 处理。
//!
//! ## 设计特点
//!
//! - **顺序处理**：一个文档完成后再开始下一个，遵守后端的频率限制
//! - **错误隔离**：单个文档失败只计入统计，不影响其他文档
//! - **配置错误致命**：缺少 API 密钥时在处理任何文档之前直接返回
//! - **可取消**：取消标记同时传给当前文档，之后的文档不再处理

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::clients::CompletionClient;
use crate::config::RunConfig;
use crate::orchestrator::document_processor::{DocumentOutcome, DocumentProcessor, OUTPUT_SUFFIX};
use crate::orchestrator::progress::ProgressSink;
use crate::utils::logging;

/// 批量处理统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchStats {
    pub success: usize,
    pub empty: usize,
    pub failed: usize,
    pub total: usize,
    /// 是否因取消而提前结束
    pub cancelled: bool,
}

/// 文件匹配模式，只支持 `*`、`*.ext` 和完整文件名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePattern {
    extension: Option<String>,
    exact: Option<String>,
}

impl FilePattern {
    pub fn parse(pattern: &str) -> Self {
        let pattern = pattern.trim();
        if pattern == "*" || pattern == "*.*" {
            Self {
                extension: None,
                exact: None,
            }
        } else if let Some(ext) = pattern.strip_prefix("*.") {
            Self {
                extension: Some(ext.to_lowercase()),
                exact: None,
            }
        } else {
            Self {
                extension: None,
                exact: Some(pattern.to_string()),
            }
        }
    }

    pub fn matches(&self, path: &Path) -> bool {
        let file_name = path.file_name().and_then(|s| s.to_str()).unwrap_or_default();
        // Word 打开文档时生成的锁文件
        if file_name.starts_with("~$") {
            return false;
        }
        if let Some(exact) = &self.exact {
            return file_name == exact;
        }
        match &self.extension {
            Some(ext) => path
                .extension()
                .and_then(|s| s.to_str())
                .map(|e| e.to_lowercase() == *ext)
                .unwrap_or(false),
            None => true,
        }
    }
}

/// 扫描文件夹中匹配的文档，按文件名排序
pub async fn find_documents(folder: &Path, pattern: &FilePattern) -> Result<Vec<PathBuf>> {
    if !folder.exists() {
        anyhow::bail!("输入文件夹不存在: {}", folder.display());
    }

    let mut documents = Vec::new();
    let mut entries = tokio::fs::read_dir(folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder.display()))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() && pattern.matches(&path) {
            documents.push(path);
        }
    }

    documents.sort();
    Ok(documents)
}

/// 批量文档处理器
pub struct BatchProcessor<'a> {
    client: &'a dyn CompletionClient,
    config: &'a RunConfig,
    progress: Option<&'a dyn ProgressSink>,
    cancel: CancellationToken,
}

impl<'a> BatchProcessor<'a> {
    pub fn new(client: &'a dyn CompletionClient, config: &'a RunConfig) -> Self {
        Self {
            client,
            config,
            progress: None,
            cancel: CancellationToken::new(),
        }
    }

    /// 设置进度接收方（每个文档内的段落进度）
    pub fn with_progress(mut self, sink: &'a dyn ProgressSink) -> Self {
        self.progress = Some(sink);
        self
    }

    /// 设置取消标记
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// 处理文件夹中所有匹配的文档
    ///
    /// # 参数
    /// - `input_folder`: 输入文件夹
    /// - `output_folder`: 输出文件夹（`None` 时与输入相同）
    /// - `pattern`: 文件匹配模式
    pub async fn run(
        &self,
        input_folder: &Path,
        output_folder: Option<&Path>,
        pattern: &FilePattern,
    ) -> Result<BatchStats> {
        self.config.validate()?;

        let output_folder = output_folder.unwrap_or(input_folder);
        tokio::fs::create_dir_all(output_folder)
            .await
            .with_context(|| format!("无法创建输出文件夹: {}", output_folder.display()))?;

        let documents = find_documents(input_folder, pattern).await?;
        if documents.is_empty() {
            warn!(
                "⚠️ 在 {} 中未找到匹配的文件",
                input_folder.display()
            );
            return Ok(BatchStats::default());
        }

        let total = documents.len();
        info!("📁 找到 {} 个文档需要处理", total);

        let mut processor = DocumentProcessor::new(self.client, self.config)
            .with_cancellation(self.cancel.clone());
        if let Some(sink) = self.progress {
            processor = processor.with_progress(sink);
        }
        let mut stats = BatchStats {
            total,
            ..Default::default()
        };

        for (i, document) in documents.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!("⚠️ 批量处理已取消，剩余 {} 个文档未处理", total - i);
                stats.cancelled = true;
                break;
            }

            logging::log_batch_document_start(i + 1, total, document);

            let output = output_folder.join(output_file_name(document));
            match processor.process(document, &output).await {
                Ok(DocumentOutcome::Saved(report)) => {
                    info!("✓ 完成: {}", display_name(document));
                    logging::log_document_report(&report);
                    stats.success += 1;
                }
                Ok(DocumentOutcome::NothingToProcess) => {
                    warn!("⚠️ 跳过空文档: {}", display_name(document));
                    stats.empty += 1;
                }
                Ok(DocumentOutcome::SaveFailed { error, .. }) => {
                    error!("✗ 保存失败 {}: {}", display_name(document), error);
                    stats.failed += 1;
                }
                Err(e) => {
                    error!("✗ 处理失败 {}: {}", display_name(document), e);
                    stats.failed += 1;
                }
            }
        }

        logging::log_batch_complete(&stats, output_folder);
        Ok(stats)
    }
}

fn output_file_name(document: &Path) -> String {
    let stem = document
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    format!("{}{}", stem, OUTPUT_SUFFIX)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Provider;
    use crate::testing::ScriptedClient;

    #[test]
    fn test_file_pattern() {
        let docx = FilePattern::parse("*.docx");
        assert!(docx.matches(Path::new("a/报告.docx")));
        assert!(docx.matches(Path::new("B.DOCX")));
        assert!(!docx.matches(Path::new("a.txt")));
        assert!(!docx.matches(Path::new("~$报告.docx")));

        let any = FilePattern::parse("*");
        assert!(any.matches(Path::new("x.md")));

        let exact = FilePattern::parse("notes.txt");
        assert!(exact.matches(Path::new("dir/notes.txt")));
        assert!(!exact.matches(Path::new("dir/other.txt")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_counts_each_document() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        std::fs::write(input.path().join("a.txt"), "One.\nTwo.").unwrap();
        std::fs::write(input.path().join("b.txt"), "\n").unwrap();
        std::fs::write(input.path().join("c.md"), "Ignored.").unwrap();

        let client = ScriptedClient::always_ok("Grammar is correct");
        let config = RunConfig::new(Provider::OpenAI, "gpt-4o", "key");

        let stats = BatchProcessor::new(&client, &config)
            .run(input.path(), Some(output.path()), &FilePattern::parse("*.txt"))
            .await
            .unwrap();

        assert_eq!(
            stats,
            BatchStats {
                success: 1,
                empty: 1,
                failed: 0,
                total: 2,
                cancelled: false,
            }
        );
        assert!(output.path().join("a_语法检查结果.xlsx").exists());
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_remaining_documents() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        std::fs::write(input.path().join("a.txt"), "One.\nTwo.").unwrap();
        std::fs::write(input.path().join("b.txt"), "Three.").unwrap();

        let client = ScriptedClient::always_ok("Grammar is correct");
        let config = RunConfig::new(Provider::OpenAI, "gpt-4o", "key");
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        // 第一个文档的第一段开始时取消
        let sink = move |_: &crate::orchestrator::progress::Progress| -> Result<()> {
            trigger.cancel();
            Ok(())
        };

        let stats = BatchProcessor::new(&client, &config)
            .with_progress(&sink)
            .with_cancellation(cancel)
            .run(input.path(), Some(output.path()), &FilePattern::parse("*.txt"))
            .await
            .unwrap();

        assert!(stats.cancelled);
        assert_eq!(stats.total, 2);
        assert_eq!(client.calls(), 0);
        assert!(!output.path().join("b_语法检查结果.xlsx").exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_run_processes_nothing() {
        let input = tempfile::tempdir().unwrap();
        std::fs::write(input.path().join("a.txt"), "One.").unwrap();

        let client = ScriptedClient::always_ok("x");
        let config = RunConfig::new(Provider::OpenAI, "gpt-4o", "key");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let stats = BatchProcessor::new(&client, &config)
            .with_cancellation(cancel)
            .run(input.path(), None, &FilePattern::parse("*.txt"))
            .await
            .unwrap();

        assert!(stats.cancelled);
        assert_eq!(stats.success + stats.empty + stats.failed, 0);
        assert_eq!(client.calls(), 0);
        assert!(!input.path().join("a_语法检查结果.xlsx").exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_folder_is_error() {
        let client = ScriptedClient::always_ok("x");
        let config = RunConfig::new(Provider::OpenAI, "gpt-4o", "key");
        let dir = tempfile::tempdir().unwrap();

        let result = BatchProcessor::new(&client, &config)
            .run(
                &dir.path().join("missing"),
                Some(dir.path()),
                &FilePattern::parse("*.docx"),
            )
            .await;
        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_credential_stops_before_any_document() {
        let input = tempfile::tempdir().unwrap();
        std::fs::write(input.path().join("a.txt"), "One.").unwrap();

        let client = ScriptedClient::always_ok("x");
        let config = RunConfig::new(Provider::Gemini, "gemini-pro", "");

        let result = BatchProcessor::new(&client, &config)
            .run(input.path(), None, &FilePattern::parse("*.txt"))
            .await;
        assert!(result.is_err());
        assert_eq!(client.calls(), 0);
    }
}
