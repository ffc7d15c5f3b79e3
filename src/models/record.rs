use serde::{Deserialize, Serialize};

/// 单个额外检查的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalOutcome {
    /// 输出编号（从 1 开始，只对非空要求计数）
    pub index: usize,
    /// 检查要求原文
    pub requirement: String,
    /// AI 返回内容（失败时为带标记的错误文本）
    pub outcome: String,
}

/// 单个段落的检查结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// 原始文本
    pub original_text: String,
    /// 语法检查结果（始终存在）
    pub grammar_check: String,
    /// 额外检查结果，按声明顺序排列
    #[serde(default)]
    pub additional_checks: Vec<AdditionalOutcome>,
}

impl ResultRecord {
    pub fn new(original_text: impl Into<String>, grammar_check: impl Into<String>) -> Self {
        Self {
            original_text: original_text.into(),
            grammar_check: grammar_check.into(),
            additional_checks: Vec::new(),
        }
    }

    /// 按输出编号查找额外检查结果
    pub fn additional(&self, index: usize) -> Option<&str> {
        self.additional_checks
            .iter()
            .find(|c| c.index == index)
            .map(|c| c.outcome.as_str())
    }

    /// 所有结果字段（语法 + 额外）
    pub fn outcomes(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.grammar_check.as_str())
            .chain(self.additional_checks.iter().map(|c| c.outcome.as_str()))
    }
}
