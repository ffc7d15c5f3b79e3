//! 段落处理上下文
//!
//! 封装"我正在处理第几段"这一信息

use std::fmt::Display;

/// 段落处理上下文
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParagraphCtx {
    /// 段落位置（从0开始）
    pub index: usize,

    /// 段落总数
    pub total: usize,
}

impl ParagraphCtx {
    pub fn new(index: usize, total: usize) -> Self {
        Self { index, total }
    }

    /// 面向用户的序号（从1开始）
    pub fn number(&self) -> usize {
        self.index + 1
    }
}

impl Display for ParagraphCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[段落 {}/{}]", self.number(), self.total)
    }
}
