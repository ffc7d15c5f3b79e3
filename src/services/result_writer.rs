//! 结果写入服务 - 业务能力层
//!
//! 把检查结果写成 Excel 表格：每个段落一行，列依次为原始文本、语法检查、
//! 以及每个额外检查（按输出编号）

use std::borrow::Cow;
use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use tracing::{info, warn};

use crate::error::PersistError;
use crate::models::{Language, ResultRecord};

/// Excel 单元格的最大字符数
pub const EXCEL_CELL_LIMIT: usize = 32_767;

const TRUNCATED_MARKER: &str = "...";

/// 超出单元格上限的文本截断并以 `...` 结尾
pub fn clamp_cell(value: &str) -> Cow<'_, str> {
    if value.chars().count() <= EXCEL_CELL_LIMIT {
        return Cow::Borrowed(value);
    }
    let keep = EXCEL_CELL_LIMIT - TRUNCATED_MARKER.chars().count();
    let mut clamped: String = value.chars().take(keep).collect();
    clamped.push_str(TRUNCATED_MARKER);
    Cow::Owned(clamped)
}

/// 结果写入服务
pub struct ResultWriter {
    language: Language,
}

impl ResultWriter {
    /// 创建结果写入服务，表头语言与检查语言一致
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    /// 表头
    pub fn headers(&self, records: &[ResultRecord]) -> Vec<String> {
        let additional_columns = additional_column_count(records);
        let (original, grammar) = match self.language {
            Language::Chinese => ("原始文本", "语法检查"),
            Language::English => ("Original Text", "Grammar Check"),
        };

        let mut headers = vec![original.to_string(), grammar.to_string()];
        headers.extend((1..=additional_columns).map(|n| match self.language {
            Language::Chinese => format!("额外检查_{}", n),
            Language::English => format!("Additional Check {}", n),
        }));
        headers
    }

    /// 表格内容（不含表头），缺失的额外检查为空字符串
    pub fn rows(&self, records: &[ResultRecord]) -> Vec<Vec<String>> {
        let additional_columns = additional_column_count(records);
        records
            .iter()
            .map(|record| {
                let mut row = vec![record.original_text.clone(), record.grammar_check.clone()];
                row.extend((1..=additional_columns).map(|n| {
                    record.additional(n).unwrap_or_default().to_string()
                }));
                row
            })
            .collect()
    }

    fn build_workbook(&self, records: &[ResultRecord]) -> Result<Workbook, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        let header_format = Format::new().set_bold();
        let cell_format = Format::new().set_text_wrap();

        for (col, header) in self.headers(records).iter().enumerate() {
            let col = col as u16;
            worksheet.write_string_with_format(0, col, header, &header_format)?;
            worksheet.set_column_width(col, 50)?;
        }

        for (row_index, row) in self.rows(records).iter().enumerate() {
            let row_number = row_index as u32 + 1;
            for (col, value) in row.iter().enumerate() {
                let value = clamp_cell(value);
                if let Cow::Owned(_) = value {
                    warn!(
                        "⚠️ 第 {} 行第 {} 列超过 Excel 单元格上限，已截断",
                        row_number,
                        col + 1
                    );
                }
                worksheet.write_string_with_format(row_number, col as u16, value.as_ref(), &cell_format)?;
            }
        }

        Ok(workbook)
    }

    /// 保存到文件
    pub fn save(&self, records: &[ResultRecord], path: &Path) -> Result<(), PersistError> {
        let excel_error = |source| PersistError::Excel {
            path: path.display().to_string(),
            source,
        };

        let mut workbook = self.build_workbook(records).map_err(excel_error)?;
        workbook.save(path).map_err(excel_error)?;

        info!("✓ 结果已保存到: {}", path.display());
        Ok(())
    }

    /// 写入内存缓冲区（用于下载 / 导出）
    pub fn to_buffer(&self, records: &[ResultRecord]) -> Result<Vec<u8>, PersistError> {
        let excel_error = |source| PersistError::Excel {
            path: "<memory>".to_string(),
            source,
        };

        let mut workbook = self.build_workbook(records).map_err(excel_error)?;
        workbook.save_to_buffer().map_err(excel_error)
    }
}

/// 以 JSON 格式导出结果（Excel 保存失败时的备用方案）
pub fn save_json(records: &[ResultRecord], path: &Path) -> Result<(), PersistError> {
    let json_error = |source: Box<dyn std::error::Error + Send + Sync>| PersistError::Json {
        path: path.display().to_string(),
        source,
    };

    let content = serde_json::to_string_pretty(records).map_err(|e| json_error(Box::new(e)))?;
    std::fs::write(path, content).map_err(|e| json_error(Box::new(e)))?;

    info!("✓ 结果已导出为 JSON: {}", path.display());
    Ok(())
}

fn additional_column_count(records: &[ResultRecord]) -> usize {
    records
        .iter()
        .flat_map(|r| r.additional_checks.iter().map(|c| c.index))
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AdditionalOutcome;

    fn record(text: &str, extra: &[(usize, &str)]) -> ResultRecord {
        let mut record = ResultRecord::new(text, "语法正确");
        record.additional_checks = extra
            .iter()
            .map(|(index, outcome)| AdditionalOutcome {
                index: *index,
                requirement: format!("要求{}", index),
                outcome: outcome.to_string(),
            })
            .collect();
        record
    }

    #[test]
    fn test_headers_follow_language_and_indices() {
        let records = vec![record("a", &[(1, "x"), (2, "y")])];

        let zh = ResultWriter::new(Language::Chinese).headers(&records);
        assert_eq!(zh, vec!["原始文本", "语法检查", "额外检查_1", "额外检查_2"]);

        let en = ResultWriter::new(Language::English).headers(&records);
        assert_eq!(
            en,
            vec!["Original Text", "Grammar Check", "Additional Check 1", "Additional Check 2"]
        );
    }

    #[test]
    fn test_rows_without_additional_checks() {
        let writer = ResultWriter::new(Language::Chinese);
        let records = vec![record("第一段", &[]), record("第二段", &[])];

        assert_eq!(writer.headers(&records).len(), 2);
        assert_eq!(
            writer.rows(&records),
            vec![
                vec!["第一段".to_string(), "语法正确".to_string()],
                vec!["第二段".to_string(), "语法正确".to_string()],
            ]
        );
    }

    #[test]
    fn test_rows_pad_missing_columns() {
        let writer = ResultWriter::new(Language::Chinese);
        let records = vec![record("a", &[(1, "x")]), record("b", &[(1, "p"), (2, "q")])];

        let rows = writer.rows(&records);
        assert_eq!(rows[0], vec!["a", "语法正确", "x", ""]);
        assert_eq!(rows[1], vec!["b", "语法正确", "p", "q"]);
    }

    #[test]
    fn test_buffer_is_xlsx_archive() {
        let writer = ResultWriter::new(Language::English);
        let buffer = writer.to_buffer(&[record("text", &[(1, "ok")])]).unwrap();
        assert!(buffer.starts_with(b"PK"));
    }

    #[test]
    fn test_save_to_path_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![record("text", &[(1, "ok")])];

        let xlsx = dir.path().join("result.xlsx");
        ResultWriter::new(Language::Chinese).save(&records, &xlsx).unwrap();
        assert!(xlsx.exists());

        let json = dir.path().join("result.json");
        save_json(&records, &json).unwrap();
        let loaded: Vec<ResultRecord> =
            serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
        assert_eq!(loaded, records);
    }

    #[test]
    fn test_clamp_cell() {
        assert!(matches!(clamp_cell("短文本"), Cow::Borrowed("短文本")));

        let exact = "字".repeat(EXCEL_CELL_LIMIT);
        assert_eq!(clamp_cell(&exact), exact);

        let long = "字".repeat(EXCEL_CELL_LIMIT + 1);
        let clamped = clamp_cell(&long);
        assert_eq!(clamped.chars().count(), EXCEL_CELL_LIMIT);
        assert!(clamped.ends_with("..."));
    }

    #[test]
    fn test_overlong_cell_still_saves_every_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.xlsx");
        let records = vec![
            ResultRecord::new("a".repeat(40_000), "语法正确"),
            record("第二段", &[(1, &"b".repeat(33_000))]),
        ];

        let writer = ResultWriter::new(Language::Chinese);
        writer.save(&records, &path).unwrap();
        assert!(path.exists());
        assert!(writer.to_buffer(&records).unwrap().starts_with(b"PK"));
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("result.xlsx");

        let err = ResultWriter::new(Language::Chinese)
            .save(&[record("a", &[])], &path)
            .unwrap_err();
        assert!(matches!(err, PersistError::Excel { .. }));
    }
}
