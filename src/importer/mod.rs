// ==========================================
// 履约中心产能规划系统 - 导入层
// ==========================================
// 职责: 外部表输入边界,生成强类型记录
// 支持: CSV, Excel
// 流程: 解析 → 表结构校验 → 字段映射
// ==========================================

pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod schema_validator;
pub mod table_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult, InvalidColumn};
pub use field_mapper::{parse_timestamp, FieldMapper};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawTable, UniversalFileParser};
pub use schema_validator::{SchemaValidator, TableSchema, HOURLY_METRIC_SCHEMA, STEP_TABLE_SCHEMA};
pub use table_importer::TableImporter;
