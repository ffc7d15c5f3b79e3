//! 提示词构建 - 业务能力层
//!
//! 纯函数：相同输入总是得到相同的提示词，不做任何 I/O

use crate::models::{CheckSpec, Language};

/// 没有语法错误时模型应当给出的固定回答
pub fn no_error_sentinel(language: Language) -> &'static str {
    match language {
        Language::Chinese => "语法正确",
        Language::English => "Grammar is correct",
    }
}

/// 构建单项检查的提示词
///
/// # 参数
/// - `text`: 段落原文（原样嵌入）
/// - `language`: 提示词及回答语言
/// - `check`: 检查类型，额外检查携带检查要求
pub fn build_prompt(text: &str, language: Language, check: &CheckSpec<'_>) -> String {
    let sentinel = no_error_sentinel(language);
    match (language, check) {
        (Language::Chinese, CheckSpec::Grammar) => format!(
            r#"请检查以下文本的语法错误，只需要指出语法问题并给出简洁的修改建议：

文本：{text}

请用中文回答，格式如下：
- 如果没有语法错误，请仅回答"{sentinel}"
- 如果有语法错误，简洁地指出问题和建议
"#
        ),
        (Language::Chinese, CheckSpec::Additional(requirement)) => format!(
            r#"请对以下文本进行检查：{requirement}

文本：{text}

请用中文给出简洁的评价和建议：
"#
        ),
        (Language::English, CheckSpec::Grammar) => format!(
            r#"Please check the following text for grammar errors and provide concise suggestions:

Text: {text}

Please respond in English:
- If there are no grammar errors, please only respond "{sentinel}"
- If there are grammar errors, briefly point out the issues and suggestions
"#
        ),
        (Language::English, CheckSpec::Additional(requirement)) => format!(
            r#"Please check the following text for: {requirement}

Text: {text}

Please provide concise evaluation and suggestions in English:
"#
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_prompt_contains_sentinel_and_text() {
        let prompt = build_prompt("我昨天去了学校。", Language::Chinese, &CheckSpec::Grammar);
        assert!(prompt.contains("文本：我昨天去了学校。"));
        assert!(prompt.contains("\"语法正确\""));
        assert!(prompt.contains("请用中文回答"));

        let prompt = build_prompt("He go home.", Language::English, &CheckSpec::Grammar);
        assert!(prompt.contains("Text: He go home."));
        assert!(prompt.contains("\"Grammar is correct\""));
        assert!(prompt.contains("respond in English"));
    }

    #[test]
    fn test_additional_prompt_embeds_requirement() {
        let check = CheckSpec::Additional("检查逻辑连贯性");
        let prompt = build_prompt("段落", Language::Chinese, &check);
        assert!(prompt.starts_with("请对以下文本进行检查：检查逻辑连贯性"));
        assert!(!prompt.contains("语法正确"));

        let check = CheckSpec::Additional("word choice");
        let prompt = build_prompt("Some text.", Language::English, &check);
        assert!(prompt.starts_with("Please check the following text for: word choice"));
        assert!(prompt.contains("Text: Some text."));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let a = build_prompt("同一段文字", Language::English, &CheckSpec::Grammar);
        let b = build_prompt("同一段文字", Language::English, &CheckSpec::Grammar);
        assert_eq!(a, b);
    }

    #[test]
    fn test_text_embedded_verbatim() {
        let text = "  含有 {花括号} 和 \"引号\"  ";
        let prompt = build_prompt(text, Language::Chinese, &CheckSpec::Grammar);
        assert!(prompt.contains(text));
    }
}
