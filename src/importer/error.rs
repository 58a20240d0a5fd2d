// ==========================================
// 履约中心产能规划系统 - 导入层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 表结构问题一次性列出全部缺失列与非法列
// ==========================================

use crate::domain::types::PipelineStage;
use std::fmt;
use thiserror::Error;

/// 非数值列 (记录首个出错行)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidColumn {
    pub column: String,
    pub row: usize, // 1 起始的数据行号 (不含表头)
    pub value: String,
}

impl fmt::Display for InvalidColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (行 {}: {:?})", self.column, self.row, self.value)
    }
}

fn join_invalid(columns: &[InvalidColumn]) -> String {
    columns
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// 导入层错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 上游产物缺失 =====
    #[error("输入文件不存在: {path}，请先运行 `{producer}` 阶段")]
    MissingInput {
        path: String,
        producer: PipelineStage,
    },

    // ===== 表结构错误 =====
    #[error(
        "表结构校验失败: 缺失列 [{}]; 非数值列 [{}]",
        .missing_columns.join(", "),
        join_invalid(.invalid_columns)
    )]
    Schema {
        missing_columns: Vec<String>,
        invalid_columns: Vec<InvalidColumn>,
    },

    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 数据映射错误 =====
    #[error("类型转换失败 (行 {row}, 字段 {field}): {message}")]
    TypeConversionError {
        row: usize,
        field: String,
        message: String,
    },
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
