use thiserror::Error;

use crate::models::Provider;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误（致命，在任何 API 调用之前抛出）
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文档读取错误
    #[error("文档错误: {0}")]
    Document(#[from] DocumentError),
    /// 结果保存错误（此时所有 AI 调用已经完成）
    #[error("保存错误: {0}")]
    Persist(#[from] PersistError),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 所选供应商缺少 API 密钥
    #[error("缺少 {provider} API 密钥")]
    MissingCredential { provider: Provider },
    /// 无法识别的供应商
    #[error("无法识别的 AI 供应商: {value}")]
    UnknownProvider { value: String },
    /// 无法识别的语言
    #[error("无法识别的语言: {value}")]
    UnknownLanguage { value: String },
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 写入配置文件失败
    #[error("写入配置文件失败 ({path}): {source}")]
    Write {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 文档读取错误
#[derive(Debug, Error)]
pub enum DocumentError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// Word 文档解析失败
    #[error("Word文档解析失败 ({path}): {message}")]
    Parse { path: String, message: String },
    /// 不支持的文件格式
    #[error("不支持的文件格式: {path}")]
    UnsupportedFormat { path: String },
}

/// 结果保存错误
#[derive(Debug, Error)]
pub enum PersistError {
    /// 写入 Excel 失败
    #[error("保存Excel文件失败 ({path}): {source}")]
    Excel {
        path: String,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },
    /// 写入 JSON 失败
    #[error("保存JSON文件失败 ({path}): {source}")]
    Json {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 运行被取消
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("任务已取消")]
pub struct Cancelled;

// ========== 便捷构造函数 ==========

impl ConfigError {
    /// 创建配置写入错误
    pub fn write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConfigError::Write {
            path: path.into(),
            source: Box::new(source),
        }
    }
}

impl DocumentError {
    /// 创建文件读取错误
    pub fn read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        DocumentError::Read {
            path: path.into(),
            source,
        }
    }
}

impl PersistError {
    /// 出错的目标路径
    pub fn path(&self) -> &str {
        match self {
            PersistError::Excel { path, .. } | PersistError::Json { path, .. } => path,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_names_provider() {
        let err = ConfigError::MissingCredential {
            provider: Provider::Gemini,
        };
        assert!(err.to_string().contains("GEMINI"));

        let app: AppError = err.into();
        assert!(matches!(
            app,
            AppError::Config(ConfigError::MissingCredential { .. })
        ));
    }

    #[test]
    fn test_persist_error_path() {
        let err = PersistError::Json {
            path: "out.json".to_string(),
            source: Box::new(std::io::Error::other("disk full")),
        };
        assert_eq!(err.path(), "out.json");
        assert!(err.to_string().contains("disk full"));
    }
}
