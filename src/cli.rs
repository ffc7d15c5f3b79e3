//! 命令行入口
//!
//! - `check`: 检查单个文档
//! - `batch`: 批量检查文件夹中的文档
//!
//! 配置优先级：命令行参数 > 环境变量 > 配置文件 > 默认值

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::clients::LlmClient;
use crate::config::{Config, ConfigSource, DEFAULT_CONFIG_FILE};
use crate::error::ConfigError;
use crate::models::{Language, Provider};
use crate::orchestrator::{
    default_output_path, BatchProcessor, DocumentOutcome, DocumentProcessor, FilePattern, Progress,
};
use crate::utils::logging;

#[derive(Debug, Parser)]
#[command(name = "grammar_check", version, about = "Word文档AI语法检查器")]
pub struct Cli {
    /// 配置文件路径
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 检查单个文档
    Check {
        /// 输入文档（.docx / .txt / .md）
        document: PathBuf,

        /// 输出 Excel 路径，默认与输入同目录
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },
    /// 批量检查文件夹中的文档
    Batch {
        /// 输入文件夹
        folder: PathBuf,

        /// 输出文件夹，默认与输入相同
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 文件匹配模式
        #[arg(short, long, default_value = "*.docx")]
        pattern: String,

        #[command(flatten)]
        overrides: Overrides,
    },
}

/// 覆盖配置文件的运行参数
#[derive(Debug, Default, Clone, Args)]
pub struct Overrides {
    /// 检查语言（中文 / English）
    #[arg(short, long)]
    pub language: Option<String>,

    /// AI 供应商（openai / gemini）
    #[arg(long)]
    pub provider: Option<String>,

    /// 模型名称
    #[arg(short, long)]
    pub model: Option<String>,

    /// 额外检查要求，可传入多个
    #[arg(short = 'a', long = "additional-checks", num_args = 1..)]
    pub additional_checks: Vec<String>,

    /// 会话刷新间隔（段落数，0 表示不刷新）
    #[arg(long)]
    pub session_refresh_interval: Option<usize>,
}

impl Overrides {
    /// 把命令行参数合并进配置
    pub fn apply(&self, mut config: Config) -> Result<Config, ConfigError> {
        if let Some(value) = &self.language {
            config.language = Language::from_str(value).ok_or_else(|| {
                ConfigError::UnknownLanguage {
                    value: value.clone(),
                }
            })?;
        }
        if let Some(value) = &self.provider {
            config.provider = Some(Provider::from_str(value).ok_or_else(|| {
                ConfigError::UnknownProvider {
                    value: value.clone(),
                }
            })?);
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if !self.additional_checks.is_empty() {
            config.additional_checks = self.additional_checks.clone();
        }
        if let Some(interval) = self.session_refresh_interval {
            config.session_refresh_interval = interval;
        }
        Ok(config)
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match &self.command {
            Command::Check {
                document,
                output,
                overrides,
            } => {
                let config = self.load_config(overrides)?;
                check_document(&config, document, output.as_deref()).await
            }
            Command::Batch {
                folder,
                output,
                pattern,
                overrides,
            } => {
                let config = self.load_config(overrides)?;
                let run_config = config.to_run_config();
                let client = LlmClient::new(&config);
                let cancel = CancellationToken::new();
                let ctrl_c = cancel_on_ctrl_c(cancel.clone());

                let result = BatchProcessor::new(&client, &run_config)
                    .with_progress(&log_progress)
                    .with_cancellation(cancel)
                    .run(folder, output.as_deref(), &FilePattern::parse(pattern))
                    .await;
                ctrl_c.abort();

                result?;
                Ok(())
            }
        }
    }

    fn load_config(&self, overrides: &Overrides) -> Result<Config> {
        let loaded = Config::load(&self.config)?;
        match &loaded.source {
            ConfigSource::File(path) => info!("⚙️ 配置文件: {}", path.display()),
            ConfigSource::Defaults { created: Some(path) } => {
                warn!("⚠️ 未找到配置文件，已创建默认配置: {}", path.display())
            }
            ConfigSource::Defaults { created: None } => {
                warn!("⚠️ 未找到配置文件，使用默认配置")
            }
        }

        let config = overrides.apply(loaded.config.apply_env())?;
        Ok(config)
    }
}

async fn check_document(config: &Config, input: &Path, output: Option<&Path>) -> Result<()> {
    let run_config = config.to_run_config();
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(input));
    logging::log_startup(input, Some(&output), &run_config);

    let client = LlmClient::new(config);
    let cancel = CancellationToken::new();
    let ctrl_c = cancel_on_ctrl_c(cancel.clone());

    let outcome = DocumentProcessor::new(&client, &run_config)
        .with_progress(&log_progress)
        .with_cancellation(cancel)
        .process(input, &output)
        .await;
    ctrl_c.abort();

    match outcome? {
        DocumentOutcome::Saved(report) => logging::log_document_report(&report),
        DocumentOutcome::NothingToProcess => {
            warn!("⚠️ 文档中没有需要检查的段落: {}", input.display())
        }
        DocumentOutcome::SaveFailed {
            error, fallback, ..
        } => {
            match fallback {
                Some(path) => error!("❌ 保存失败，结果已备份到: {}", path.display()),
                None => error!("❌ 保存失败，且备用导出也失败"),
            }
            return Err(error.into());
        }
    }
    Ok(())
}

fn log_progress(progress: &Progress) -> Result<()> {
    info!("⏳ {}", progress.message);
    Ok(())
}

fn cancel_on_ctrl_c(cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("⚠️ 收到中断信号，停止处理，未完成的段落将被丢弃");
            cancel.cancel();
        }
    })
}
