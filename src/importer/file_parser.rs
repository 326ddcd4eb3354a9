// ==========================================
// 厨卫展厅管理后台 - 文件解析器实现
// ==========================================
// 阶段 0: 文件读取与解析
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// ==========================================

use crate::domain::product::{ParsedSheet, RawRow};
use crate::domain::types::FileType;
use crate::importer::error::{ImportError, ImporterResult};
use crate::importer::product_importer_trait::FileParser;
use calamine::{open_workbook_auto_from_rs, Reader};
use csv::ReaderBuilder;
use std::io::Cursor;
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 按表头组装一行；空表头列忽略，全空行返回 None
fn build_row<I>(headers: &[String], cells: I) -> Option<RawRow>
where
    I: Iterator<Item = String>,
{
    let mut row_map = RawRow::new();
    for (col_idx, value) in cells.enumerate() {
        if let Some(header) = headers.get(col_idx) {
            if header.is_empty() {
                continue;
            }
            row_map.insert(header.clone(), value.trim().to_string());
        }
    }

    // 跳过完全空白的行
    if row_map.values().all(|v| v.is_empty()) {
        None
    } else {
        Some(row_map)
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_bytes(&self, bytes: &[u8]) -> ImporterResult<ParsedSheet> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(bytes);

        // 读取表头
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(ImportError::MissingHeader);
        }

        // 读取所有行
        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            if let Some(row) = build_row(&headers, record.iter().map(str::to_string)) {
                rows.push(row);
            }
        }

        Ok(ParsedSheet { headers, rows })
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
// 只读取第一个工作表，第一行为表头
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_bytes(&self, bytes: &[u8]) -> ImporterResult<ParsedSheet> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("workbook has no sheets".to_string()))?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

        // 提取表头（第一行）
        let mut sheet_rows = range.rows();
        let header_row = sheet_rows.next().ok_or(ImportError::MissingHeader)?;

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(ImportError::MissingHeader);
        }

        // 读取数据行
        let mut rows = Vec::new();
        for data_row in sheet_rows {
            if let Some(row) = build_row(&headers, data_row.iter().map(|c| c.to_string())) {
                rows.push(row);
            }
        }

        Ok(ParsedSheet { headers, rows })
    }
}

// ==========================================
// 通用文件解析器（根据类型/扩展名选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn for_type(file_type: FileType) -> Box<dyn FileParser> {
        match file_type {
            FileType::Csv => Box::new(CsvParser),
            FileType::Excel => Box::new(ExcelParser),
        }
    }

    pub fn parse_bytes(&self, bytes: &[u8], file_type: FileType) -> ImporterResult<ParsedSheet> {
        Self::for_type(file_type).parse_bytes(bytes)
    }

    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImporterResult<ParsedSheet> {
        let path = file_path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let file_type =
            FileType::from_extension(&ext).ok_or(ImportError::UnsupportedFormat(ext))?;
        Self::for_type(file_type).parse_path(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_csv_parser_valid_content() {
        let csv = "Product Name,Price,Qty\n\"Kitchen Sink\",299.99,5\nFaucet,89,12\n";

        let sheet = CsvParser.parse_bytes(csv.as_bytes()).unwrap();

        assert_eq!(sheet.headers, vec!["Product Name", "Price", "Qty"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(
            sheet.rows[0].get("Product Name"),
            Some(&"Kitchen Sink".to_string())
        );
        assert_eq!(sheet.rows[1].get("Qty"), Some(&"12".to_string()));
    }

    #[test]
    fn test_csv_parser_skip_empty_rows() {
        let csv = "Name,Price\nSink,1\n,\nTub,2\n";

        let sheet = CsvParser.parse_bytes(csv.as_bytes()).unwrap();

        // 应跳过空行
        assert_eq!(sheet.rows.len(), 2);
    }

    #[test]
    fn test_csv_parser_strips_bom_and_trims_headers() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b" Name , SKU \nVanity,V-01\n");

        let sheet = CsvParser.parse_bytes(&bytes).unwrap();

        assert_eq!(sheet.headers, vec!["Name", "SKU"]);
        assert_eq!(sheet.rows[0].get("SKU"), Some(&"V-01".to_string()));
    }

    #[test]
    fn test_csv_parser_short_rows_allowed() {
        let csv = "Name,Price,Qty\nSink,10\n";

        let sheet = CsvParser.parse_bytes(csv.as_bytes()).unwrap();

        assert_eq!(sheet.rows.len(), 1);
        assert!(sheet.rows[0].get("Qty").is_none());
    }

    #[test]
    fn test_csv_parser_empty_file_has_no_header() {
        let result = CsvParser.parse_bytes(b"");
        assert!(matches!(result, Err(ImportError::MissingHeader)));
    }

    #[test]
    fn test_excel_parser_reads_first_sheet() {
        let bytes = std::fs::read(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/products.xlsx"
        ))
        .unwrap();

        let sheet = ExcelParser.parse_bytes(&bytes).unwrap();

        assert_eq!(sheet.headers, vec!["Product Name", "Price", "Qty"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(
            sheet.rows[0].get("Product Name"),
            Some(&"Kitchen Sink".to_string())
        );
        assert_eq!(sheet.rows[0].get("Price"), Some(&"299.99".to_string()));
        assert_eq!(sheet.rows[0].get("Qty"), Some(&"5".to_string()));
        assert_eq!(sheet.rows[1].get("Qty"), Some(&"12".to_string()));
    }

    #[test]
    fn test_excel_parser_rejects_garbage() {
        let result = ExcelParser.parse_bytes(b"definitely not a workbook");
        assert!(matches!(result, Err(ImportError::ExcelParseError(_))));
    }

    #[test]
    fn test_universal_parser_by_extension() {
        let mut temp_file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(temp_file, "Name,Price").unwrap();
        writeln!(temp_file, "Shower Head,45").unwrap();

        let sheet = UniversalFileParser.parse(temp_file.path()).unwrap();
        assert_eq!(sheet.rows.len(), 1);
    }

    #[test]
    fn test_universal_parser_unsupported_extension() {
        let result = UniversalFileParser.parse("catalog.pdf");
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_parse_path_file_not_found() {
        let result = CsvParser.parse_path(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }
}
