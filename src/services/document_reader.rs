//! 文档读取服务 - 业务能力层
//!
//! 把文档拆分为去除首尾空白的非空段落，保持文档顺序

use std::path::Path;

use docx_rs::{read_docx, DocumentChild, ParagraphChild, RunChild};
use tracing::{debug, info};

use crate::error::DocumentError;

/// 读取文档并按段落分割
///
/// 支持 `.docx`（Word）以及 `.txt` / `.md`（每个非空行为一段）。
/// 空文档返回空列表。
pub async fn read_paragraphs(path: &Path) -> Result<Vec<String>, DocumentError> {
    let display = path.display().to_string();

    if !path.exists() {
        return Err(DocumentError::NotFound { path: display });
    }

    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let paragraphs = match extension.as_str() {
        "docx" => {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| DocumentError::read_failed(&display, e))?;
            docx_paragraphs(&bytes).map_err(|message| DocumentError::Parse {
                path: display.clone(),
                message,
            })?
        }
        "txt" | "md" => {
            let content = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| DocumentError::read_failed(&display, e))?;
            text_paragraphs(&content)
        }
        _ => return Err(DocumentError::UnsupportedFormat { path: display }),
    };

    info!("✓ 成功读取文档，共 {} 个段落", paragraphs.len());
    Ok(paragraphs)
}

/// 从 Word 文档字节中提取段落
///
/// 同一段落中的多个 Run 直接拼接
pub fn docx_paragraphs(bytes: &[u8]) -> Result<Vec<String>, String> {
    let docx = read_docx(bytes).map_err(|e| format!("{:?}", e))?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(para) => Some(paragraph_text(para)),
            _ => None,
        })
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect();

    debug!("Word 文档解析完成，段落数: {}", paragraphs.len());
    Ok(paragraphs)
}

fn paragraph_text(para: &docx_rs::Paragraph) -> String {
    let mut text = String::new();
    push_children_text(&para.children, &mut text);
    text
}

/// 超链接内的 Run 也属于段落文本
fn push_children_text(children: &[ParagraphChild], text: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => push_run_text(run, text),
            ParagraphChild::Hyperlink(link) => push_children_text(&link.children, text),
            _ => {}
        }
    }
}

fn push_run_text(run: &docx_rs::Run, text: &mut String) {
    for rc in &run.children {
        match rc {
            RunChild::Text(t) => text.push_str(&t.text),
            RunChild::Tab(_) => text.push('\t'),
            RunChild::Break(_) => text.push('\n'),
            _ => {}
        }
    }
}

/// 纯文本：每个非空行为一段
pub fn text_paragraphs(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Hyperlink, HyperlinkType, Paragraph, Run};
    use std::io::Cursor;

    fn build_docx(paragraphs: &[&[&str]]) -> Vec<u8> {
        let mut docx = Docx::new();
        for runs in paragraphs {
            let mut para = Paragraph::new();
            for run in *runs {
                para = para.add_run(Run::new().add_text(*run));
            }
            docx = docx.add_paragraph(para);
        }

        let mut buffer = Cursor::new(Vec::new());
        docx.build().pack(&mut buffer).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_docx_paragraphs_skip_blank_and_join_runs() {
        let bytes = build_docx(&[&["第一段", "继续"], &["   "], &[], &["  第二段  "]]);
        let paragraphs = docx_paragraphs(&bytes).unwrap();
        assert_eq!(paragraphs, vec!["第一段继续", "第二段"]);
    }

    #[test]
    fn test_docx_paragraphs_keep_hyperlink_text() {
        let para = Paragraph::new()
            .add_run(Run::new().add_text("See "))
            .add_hyperlink(
                Hyperlink::new("https://example.com/docs", HyperlinkType::External)
                    .add_run(Run::new().add_text("the docs")),
            )
            .add_run(Run::new().add_text(" for details."));

        let mut buffer = Cursor::new(Vec::new());
        Docx::new().add_paragraph(para).build().pack(&mut buffer).unwrap();

        let paragraphs = docx_paragraphs(&buffer.into_inner()).unwrap();
        assert_eq!(paragraphs, vec!["See the docs for details."]);
    }

    #[test]
    fn test_docx_tab_becomes_tab_character() {
        let para = Paragraph::new().add_run(
            Run::new().add_text("名称").add_tab().add_text("说明"),
        );

        let mut buffer = Cursor::new(Vec::new());
        Docx::new().add_paragraph(para).build().pack(&mut buffer).unwrap();

        let paragraphs = docx_paragraphs(&buffer.into_inner()).unwrap();
        assert_eq!(paragraphs, vec!["名称\t说明"]);
    }

    #[test]
    fn test_invalid_docx_is_error() {
        assert!(docx_paragraphs(b"not a zip").is_err());
    }

    #[test]
    fn test_text_paragraphs() {
        let paragraphs = text_paragraphs("  a \n\n\t\nb\r\n c");
        assert_eq!(paragraphs, vec!["a", "b", "c"]);
        assert!(text_paragraphs("\n \n").is_empty());
    }

    #[tokio::test]
    async fn test_read_paragraphs_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let txt = dir.path().join("doc.txt");
        std::fs::write(&txt, "one\n\ntwo\n").unwrap();
        assert_eq!(read_paragraphs(&txt).await.unwrap(), vec!["one", "two"]);

        let docx = dir.path().join("doc.docx");
        std::fs::write(&docx, build_docx(&[&["Hello world."]])).unwrap();
        assert_eq!(read_paragraphs(&docx).await.unwrap(), vec!["Hello world."]);

        let empty = dir.path().join("empty.md");
        std::fs::write(&empty, "").unwrap();
        assert!(read_paragraphs(&empty).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_read_paragraphs_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.docx");
        assert!(matches!(
            read_paragraphs(&missing).await,
            Err(DocumentError::NotFound { .. })
        ));

        let pdf = dir.path().join("doc.pdf");
        std::fs::write(&pdf, "%PDF").unwrap();
        assert!(matches!(
            read_paragraphs(&pdf).await,
            Err(DocumentError::UnsupportedFormat { .. })
        ));

        let broken = dir.path().join("broken.docx");
        std::fs::write(&broken, "garbage").unwrap();
        assert!(matches!(
            read_paragraphs(&broken).await,
            Err(DocumentError::Parse { .. })
        ));
    }
}
