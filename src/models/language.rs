use serde::{Deserialize, Serialize};

/// 提示词与回答所使用的语言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    /// 中文
    #[default]
    #[serde(rename = "中文", alias = "zh", alias = "chinese", alias = "Chinese")]
    Chinese,
    /// 英文
    #[serde(rename = "English", alias = "en", alias = "english")]
    English,
}

impl Language {
    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            Language::Chinese => "中文",
            Language::English => "English",
        }
    }

    /// 尝试从字符串解析语言
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "中文" | "zh" | "chinese" | "Chinese" => Some(Language::Chinese),
            "English" | "en" | "english" | "英文" => Some(Language::English),
            _ => None,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
