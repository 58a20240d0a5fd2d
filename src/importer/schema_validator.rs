// ==========================================
// 履约中心产能规划系统 - 表结构校验器
// ==========================================
// 职责: 必需列存在性 + 数值列/时间列类型检查
// 红线: 一次性收集全部缺失列与非法列,不在首个错误处中止
// 红线: 校验在任何映射/聚合之前完成
// ==========================================

use crate::importer::error::{ImportError, ImportResult, InvalidColumn};
use crate::importer::field_mapper::parse_timestamp;
use crate::importer::file_parser::RawTable;

/// 表结构定义
#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    pub name: &'static str,
    pub timestamp_column: &'static str,
    pub text_columns: &'static [&'static str],
    pub numeric_columns: &'static [&'static str],
}

impl TableSchema {
    /// 全部必需列 (时间列 → 文本列 → 数值列)
    pub fn required_columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.timestamp_column)
            .chain(self.text_columns.iter().copied())
            .chain(self.numeric_columns.iter().copied())
    }
}

/// 小时工序原始表 (生成产物 / 预处理产物)
pub const STEP_TABLE_SCHEMA: TableSchema = TableSchema {
    name: "hourly_step",
    timestamp_column: "timestamp",
    text_columns: &["step"],
    numeric_columns: &[
        "demand_units",
        "capacity_units",
        "processed_units",
        "backlog_units",
        "utilization",
        "cycle_time_min",
        "uph",
        "labor_hours_used",
        "headcount_used",
    ],
};

/// 小时 × 工序 指标表 (分析产物)
pub const HOURLY_METRIC_SCHEMA: TableSchema = TableSchema {
    name: "hourly_metrics",
    timestamp_column: "timestamp",
    text_columns: &["step"],
    numeric_columns: &[
        "demand_units",
        "capacity_units",
        "processed_units",
        "backlog_units",
        "utilization",
        "cycle_time_min",
        "service_level_hourly",
        "throughput_loss_units",
        "labor_hours_used",
        "headcount_used",
    ],
};

pub struct SchemaValidator;

impl SchemaValidator {
    /// 校验表结构
    ///
    /// # 返回
    /// - Ok(()): 全部必需列存在且类型正确
    /// - Err(ImportError::Schema): 列出全部缺失列与非法列
    pub fn validate(&self, table: &RawTable, schema: &TableSchema) -> ImportResult<()> {
        let missing_columns: Vec<String> = schema
            .required_columns()
            .filter(|c| !table.has_column(c))
            .map(str::to_string)
            .collect();

        let mut invalid_columns = Vec::new();

        if table.has_column(schema.timestamp_column) {
            if let Some(bad) = first_invalid(table, schema.timestamp_column, |v| {
                parse_timestamp(v).is_some()
            }) {
                invalid_columns.push(bad);
            }
        }

        // 文本列不允许空值 (空工序名会混入工序链)
        for column in schema.text_columns {
            if !table.has_column(column) {
                continue;
            }
            if let Some(bad) = first_invalid(table, column, |v| !v.trim().is_empty()) {
                invalid_columns.push(bad);
            }
        }

        for column in schema.numeric_columns {
            if !table.has_column(column) {
                continue;
            }
            if let Some(bad) = first_invalid(table, column, is_numeric) {
                invalid_columns.push(bad);
            }
        }

        if missing_columns.is_empty() && invalid_columns.is_empty() {
            tracing::debug!(table = schema.name, rows = table.len(), "表结构校验通过");
            return Ok(());
        }

        tracing::warn!(
            table = schema.name,
            missing = missing_columns.len(),
            invalid = invalid_columns.len(),
            "表结构校验失败"
        );

        Err(ImportError::Schema {
            missing_columns,
            invalid_columns,
        })
    }
}

/// 有限浮点数
fn is_numeric(value: &str) -> bool {
    value.parse::<f64>().map(f64::is_finite).unwrap_or(false)
}

fn first_invalid<F>(table: &RawTable, column: &str, is_valid: F) -> Option<InvalidColumn>
where
    F: Fn(&str) -> bool,
{
    table.rows.iter().enumerate().find_map(|(idx, row)| {
        let value = row.get(column).map(String::as_str).unwrap_or("");
        if is_valid(value) {
            None
        } else {
            Some(InvalidColumn {
                column: column.to_string(),
                row: idx + 1,
                value: value.to_string(),
            })
        }
    })
}
