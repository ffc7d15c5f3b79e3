/// 单项检查的描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckSpec<'a> {
    /// 语法检查，每个段落都会执行
    Grammar,
    /// 额外检查，携带自由文本的检查要求
    Additional(&'a str),
}

impl CheckSpec<'_> {
    /// 是否为空白的额外检查（应当整体跳过）
    pub fn is_blank(&self) -> bool {
        match self {
            CheckSpec::Grammar => false,
            CheckSpec::Additional(requirement) => requirement.trim().is_empty(),
        }
    }
}

/// 把配置中的额外检查要求展开为带输出编号的列表
///
/// 空白要求被跳过，编号从 1 开始并且只对非空要求递增，保持原始声明顺序。
pub fn numbered_requirements(requirements: &[String]) -> Vec<(usize, &str)> {
    requirements
        .iter()
        .map(String::as_str)
        .filter(|r| !CheckSpec::Additional(r).is_blank())
        .enumerate()
        .map(|(i, r)| (i + 1, r))
        .collect()
}
