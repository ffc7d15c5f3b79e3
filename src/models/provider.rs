use serde::{Deserialize, Serialize};

/// AI 供应商
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI
    #[default]
    OpenAI,
    /// Google Gemini（走 OpenAI 兼容接口）
    Gemini,
}

/// OpenAI 常用模型
const OPENAI_MODELS: &[&str] = &[
    "gpt-4o",
    "gpt-4o-mini",
    "gpt-4-turbo",
    "gpt-4",
    "gpt-3.5-turbo",
];

/// Gemini 常用模型
const GEMINI_MODELS: &[&str] = &[
    "gemini-pro",
    "gemini-pro-vision",
    "gemini-1.5-pro",
    "gemini-1.5-flash",
];

impl Provider {
    /// 配置文件中使用的标识
    pub fn id(self) -> &'static str {
        match self {
            Provider::OpenAI => "openai",
            Provider::Gemini => "gemini",
        }
    }

    /// 默认 API 地址
    pub fn default_base_url(self) -> &'static str {
        match self {
            Provider::OpenAI => "https://api.openai.com/v1",
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
        }
    }

    /// 默认模型
    pub fn default_model(self) -> &'static str {
        match self {
            Provider::OpenAI => "gpt-3.5-turbo",
            Provider::Gemini => "gemini-1.5-flash",
        }
    }

    /// 已知模型列表（静态目录，不做在线查询）
    pub fn known_models(self) -> &'static [&'static str] {
        match self {
            Provider::OpenAI => OPENAI_MODELS,
            Provider::Gemini => GEMINI_MODELS,
        }
    }

    /// 根据模型名推断供应商
    pub fn infer_from_model(model: &str) -> Self {
        if model.to_lowercase().contains("gemini") {
            Provider::Gemini
        } else {
            Provider::OpenAI
        }
    }

    /// 尝试从字符串解析供应商
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Some(Provider::OpenAI),
            "gemini" | "google" => Some(Provider::Gemini),
            _ => None,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id().to_uppercase())
    }
}
