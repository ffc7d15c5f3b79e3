use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::models::{Language, Provider};
use crate::services::RetryPolicy;

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "grammar_check.toml";

/// 程序配置文件
///
/// 对应磁盘上的 TOML 文件，缺失的字段使用默认值
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// AI 供应商，未设置时根据模型名推断
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
    /// 模型名称
    pub model: String,
    // --- 各供应商的 API 密钥 ---
    pub openai_api_key: String,
    pub gemini_api_key: String,
    // --- 可选的自定义 API 地址 ---
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini_base_url: Option<String>,
    /// 默认语言
    pub language: Language,
    /// 默认额外检查要求
    pub additional_checks: Vec<String>,
    /// 最大重试次数
    pub max_retries: u32,
    /// 重试延迟（秒）
    pub retry_delay: f64,
    /// 会话刷新间隔（段落数，0 表示不刷新）
    pub session_refresh_interval: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: None,
            model: Provider::OpenAI.default_model().to_string(),
            openai_api_key: String::new(),
            gemini_api_key: String::new(),
            openai_base_url: None,
            gemini_base_url: None,
            language: Language::Chinese,
            additional_checks: Vec::new(),
            max_retries: 3,
            retry_delay: 1.0,
            session_refresh_interval: 3,
        }
    }
}

/// 配置来源
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigSource {
    /// 从配置文件加载
    File(PathBuf),
    /// 配置文件不存在，使用内置默认值
    Defaults {
        /// 若成功写出了默认配置文件，记录其路径
        created: Option<PathBuf>,
    },
}

/// 配置加载结果
#[derive(Clone, Debug)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: ConfigSource,
}

impl LoadedConfig {
    /// 是否使用了内置默认值（CLI 据此给出提示）
    pub fn used_defaults(&self) -> bool {
        matches!(self.source, ConfigSource::Defaults { .. })
    }
}

impl Config {
    /// 加载配置文件
    ///
    /// 文件不存在时不报错：返回默认配置，并尝试在该路径写出一份默认配置文件
    pub fn load(path: impl AsRef<Path>) -> Result<LoadedConfig, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            let config = Config::default();
            let created = match config.save(path) {
                Ok(()) => Some(path.to_path_buf()),
                Err(e) => {
                    warn!("无法写出默认配置文件: {}", e);
                    None
                }
            };
            return Ok(LoadedConfig {
                config,
                source: ConfigSource::Defaults { created },
            });
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;

        debug!("已加载配置文件: {}", path.display());

        Ok(LoadedConfig {
            config,
            source: ConfigSource::File(path.to_path_buf()),
        })
    }

    /// 从 TOML 文本解析
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 保存配置文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::write_failed(path.display().to_string(), e))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::write_failed(path.display().to_string(), e))?;
        }
        std::fs::write(path, content)
            .map_err(|e| ConfigError::write_failed(path.display().to_string(), e))?;

        debug!("配置已保存到: {}", path.display());
        Ok(())
    }

    /// 使用环境变量覆盖配置
    pub fn apply_env(self) -> Self {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    /// 使用给定的查找函数覆盖配置（便于测试）
    pub fn apply_env_from(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            openai_api_key: non_empty("OPENAI_API_KEY").unwrap_or(self.openai_api_key),
            gemini_api_key: non_empty("GEMINI_API_KEY").unwrap_or(self.gemini_api_key),
            model: non_empty("GRAMMAR_CHECK_MODEL").unwrap_or(self.model),
            ..self
        }
    }

    /// 实际使用的供应商
    pub fn resolved_provider(&self) -> Provider {
        self.provider
            .unwrap_or_else(|| Provider::infer_from_model(&self.model))
    }

    /// 指定供应商的 API 密钥
    pub fn credential_for(&self, provider: Provider) -> &str {
        match provider {
            Provider::OpenAI => &self.openai_api_key,
            Provider::Gemini => &self.gemini_api_key,
        }
    }

    /// 指定供应商的 API 地址（未配置时使用默认地址）
    pub fn base_url_for(&self, provider: Provider) -> &str {
        let custom = match provider {
            Provider::OpenAI => self.openai_base_url.as_deref(),
            Provider::Gemini => self.gemini_base_url.as_deref(),
        };
        custom.unwrap_or_else(|| provider.default_base_url())
    }

    /// 构建单次运行的不可变配置
    pub fn to_run_config(&self) -> RunConfig {
        let provider = self.resolved_provider();
        RunConfig {
            language: self.language,
            provider,
            model: self.model.clone(),
            credential: self.credential_for(provider).to_string(),
            additional_checks: self.additional_checks.clone(),
            session_refresh_interval: self.session_refresh_interval,
            max_retries: self.max_retries,
            retry_delay: Duration::try_from_secs_f64(self.retry_delay.max(0.0))
                .unwrap_or(Duration::ZERO),
        }
    }
}

/// 单次运行的配置
///
/// 在流水线调用时显式传入，运行期间只读
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    pub language: Language,
    pub provider: Provider,
    pub model: String,
    pub credential: String,
    /// 额外检查要求，保持声明顺序
    pub additional_checks: Vec<String>,
    /// 每隔多少段刷新一次会话，0 表示不刷新
    pub session_refresh_interval: usize,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl RunConfig {
    /// 使用默认参数创建运行配置
    pub fn new(provider: Provider, model: impl Into<String>, credential: impl Into<String>) -> Self {
        let defaults = Config::default();
        Self {
            language: defaults.language,
            provider,
            model: model.into(),
            credential: credential.into(),
            additional_checks: Vec::new(),
            session_refresh_interval: defaults.session_refresh_interval,
            max_retries: defaults.max_retries,
            retry_delay: Duration::from_secs(1),
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_additional_checks<I, S>(mut self, checks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.additional_checks = checks.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_session_refresh_interval(mut self, interval: usize) -> Self {
        self.session_refresh_interval = interval;
        self
    }

    pub fn with_retry(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }

    /// 校验 API 密钥是否存在
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.credential.trim().is_empty() {
            return Err(ConfigError::MissingCredential {
                provider: self.provider,
            });
        }
        Ok(())
    }

    /// 重试策略
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.retry_delay)
    }

    /// 是否需要在该位置刷新会话
    pub fn is_session_refresh_point(&self, index: usize) -> bool {
        let interval = self.session_refresh_interval;
        index > 0 && interval > 0 && index % interval == 0
    }

    /// 预计的 AI 会话次数
    pub fn session_count(&self, total: usize) -> usize {
        match self.session_refresh_interval {
            0 => 1,
            interval => total / interval + 1,
        }
    }
}
