// ==========================================
// 履约中心产能规划系统 - 文件解析器
// ==========================================
// 职责: 表格文件 → 表头 + 原始字符串行
// 支持: CSV (.csv) / Excel (.xlsx/.xls, 首个工作表)
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Duration, NaiveDate};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// 原始表: 表头 + 按列名索引的字符串行
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<HashMap<String, String>>,
}

impl RawTable {
    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// 文件解析接口
pub trait FileParser {
    fn parse(&self, path: &Path) -> ImportResult<RawTable>;
}

fn check_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

// ==========================================
// CSV Parser
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse(&self, path: &Path) -> ImportResult<RawTable> {
        check_exists(path)?;

        let ext = extension_of(path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let row: HashMap<String, String> = headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.clone(), v.trim().to_string()))
                .collect();

            // 跳过完全空白的行
            if row.values().all(|v| v.is_empty()) {
                continue;
            }
            rows.push(row);
        }

        Ok(RawTable { headers, rows })
    }
}

// ==========================================
// Excel Parser
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse(&self, path: &Path) -> ImportResult<RawTable> {
        check_exists(path)?;

        let ext = extension_of(path);
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(path)?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        // 首行为表头
        let mut sheet_rows = range.rows();
        let header_row = sheet_rows
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无表头行".to_string()))?;
        let headers: Vec<String> = header_row.iter().map(cell_text).collect();

        let mut rows = Vec::new();
        for data_row in sheet_rows {
            let row: HashMap<String, String> = headers
                .iter()
                .zip(data_row.iter())
                .map(|(h, cell)| (h.clone(), cell_text(cell)))
                .collect();

            if row.values().all(|v| v.is_empty()) {
                continue;
            }
            rows.push(row);
        }

        Ok(RawTable { headers, rows })
    }
}

/// 单元格 → 文本 (日期单元格转为 ISO 时间戳)
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::DateTime(dt) => excel_serial_to_text(dt.as_f64()),
        other => other.to_string().trim().to_string(),
    }
}

/// Excel 日期序列号 (1900 日期系统) → "YYYY-MM-DDTHH:MM:SS"
fn excel_serial_to_text(serial: f64) -> String {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    let seconds = (serial * 86_400.0).round() as i64;
    (epoch + Duration::seconds(seconds))
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string()
}

// ==========================================
// 通用文件解析器 (根据扩展名自动选择)
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse(&self, path: &Path) -> ImportResult<RawTable> {
        match extension_of(path).as_str() {
            "csv" => CsvParser.parse(path),
            "xlsx" | "xls" => ExcelParser.parse(path),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn csv_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_csv_parser_reads_headers_and_rows() {
        let file = csv_file(&[
            "timestamp,step,demand_units",
            "2024-01-01T00:00:00,receive, 12.5 ",
            "2024-01-01T01:00:00,receive,13",
        ]);
        let table = CsvParser.parse(file.path()).unwrap();

        assert_eq!(table.headers, vec!["timestamp", "step", "demand_units"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0]["demand_units"], "12.5");
        assert!(table.has_column("step"));
    }

    #[test]
    fn test_csv_parser_skips_blank_rows() {
        let file = csv_file(&["step,demand_units", "receive,1", ",", "pick,2"]);
        let table = CsvParser.parse(file.path()).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_header_only_file_is_empty_table() {
        let file = csv_file(&["timestamp,step"]);
        let table = CsvParser.parse(file.path()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.headers.len(), 2);
    }

    #[test]
    fn test_missing_file_and_unsupported_extension() {
        assert!(matches!(
            UniversalFileParser.parse(Path::new("/nonexistent/table.csv")),
            Err(ImportError::FileNotFound(_))
        ));
        assert!(matches!(
            UniversalFileParser.parse(Path::new("table.parquet")),
            Err(ImportError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_excel_serial_conversion() {
        // 45292.5 = 2024-01-01 12:00
        assert_eq!(excel_serial_to_text(45292.5), "2024-01-01T12:00:00");
    }
}
