// ==========================================
// 履约中心产能规划系统 - 字段映射器
// ==========================================
// 职责: 原始字符串行 → 强类型记录
// 前置: 已通过 SchemaValidator 校验
// ==========================================

use crate::domain::metrics::HourlyMetricRecord;
use crate::domain::record::HourlyStepRecord;
use crate::importer::error::{ImportError, ImportResult};
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// 支持的时间戳格式
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// 解析小时时间戳 ("T" 或空格分隔)
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

pub struct FieldMapper;

impl FieldMapper {
    /// 映射为小时工序记录
    pub fn to_step_record(
        &self,
        row: &HashMap<String, String>,
        row_number: usize,
    ) -> ImportResult<HourlyStepRecord> {
        Ok(HourlyStepRecord {
            timestamp: self.get_timestamp(row, "timestamp", row_number)?,
            step: self.get_string(row, "step"),
            demand_units: self.get_f64(row, "demand_units", row_number)?,
            capacity_units: self.get_f64(row, "capacity_units", row_number)?,
            processed_units: self.get_f64(row, "processed_units", row_number)?,
            backlog_units: self.get_f64(row, "backlog_units", row_number)?,
            utilization: self.get_f64(row, "utilization", row_number)?,
            cycle_time_min: self.get_f64(row, "cycle_time_min", row_number)?,
            uph: self.get_f64(row, "uph", row_number)?,
            labor_hours_used: self.get_f64(row, "labor_hours_used", row_number)?,
            headcount_used: self.get_headcount(row, "headcount_used", row_number)?,
        })
    }

    /// 映射为小时 × 工序 指标记录
    pub fn to_hourly_metric(
        &self,
        row: &HashMap<String, String>,
        row_number: usize,
    ) -> ImportResult<HourlyMetricRecord> {
        Ok(HourlyMetricRecord {
            timestamp: self.get_timestamp(row, "timestamp", row_number)?,
            step: self.get_string(row, "step"),
            demand_units: self.get_f64(row, "demand_units", row_number)?,
            capacity_units: self.get_f64(row, "capacity_units", row_number)?,
            processed_units: self.get_f64(row, "processed_units", row_number)?,
            backlog_units: self.get_f64(row, "backlog_units", row_number)?,
            utilization: self.get_f64(row, "utilization", row_number)?,
            cycle_time_min: self.get_f64(row, "cycle_time_min", row_number)?,
            service_level_hourly: self.get_f64(row, "service_level_hourly", row_number)?,
            throughput_loss_units: self.get_f64(row, "throughput_loss_units", row_number)?,
            labor_hours_used: self.get_f64(row, "labor_hours_used", row_number)?,
            headcount_used: self.get_count(row, "headcount_used", row_number)?,
        })
    }

    fn get_string(&self, row: &HashMap<String, String>, key: &str) -> String {
        row.get(key).map(|v| v.trim().to_string()).unwrap_or_default()
    }

    fn get_f64(&self, row: &HashMap<String, String>, key: &str, row_number: usize) -> ImportResult<f64> {
        let value = self.get_string(row, key);
        value
            .parse::<f64>()
            .map_err(|_| ImportError::TypeConversionError {
                row: row_number,
                field: key.to_string(),
                message: format!("无法解析为浮点数: {}", value),
            })
    }

    /// 计数列 (允许 "3" / "3.0"),负值截断为 0
    fn get_count(&self, row: &HashMap<String, String>, key: &str, row_number: usize) -> ImportResult<u64> {
        let value = self.get_f64(row, key, row_number)?;
        Ok(value.max(0.0).round() as u64)
    }

    /// 工序表人数列 (u32 范围)
    fn get_headcount(&self, row: &HashMap<String, String>, key: &str, row_number: usize) -> ImportResult<u32> {
        let count = self.get_count(row, key, row_number)?;
        u32::try_from(count).map_err(|_| ImportError::TypeConversionError {
            row: row_number,
            field: key.to_string(),
            message: format!("人数超出范围: {}", count),
        })
    }

    fn get_timestamp(
        &self,
        row: &HashMap<String, String>,
        key: &str,
        row_number: usize,
    ) -> ImportResult<NaiveDateTime> {
        let value = self.get_string(row, key);
        parse_timestamp(&value).ok_or_else(|| ImportError::TypeConversionError {
            row: row_number,
            field: key.to_string(),
            message: format!("时间戳格式错误: {}", value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(13, 0, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2024-01-02T13:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-02 13:00:00"), Some(expected));
        assert_eq!(parse_timestamp(" 2024-01-02 13:00 "), Some(expected));
        assert_eq!(parse_timestamp("2024-01-02T13:00:00.000"), Some(expected));
        assert_eq!(parse_timestamp("02/01/2024"), None);
    }

    #[test]
    fn test_step_record_mapping_ignores_extra_columns() {
        let r = row(&[
            ("timestamp", "2024-01-01T05:00:00"),
            ("step", "pick"),
            ("demand_units", "100"),
            ("capacity_units", "80"),
            ("processed_units", "80"),
            ("backlog_units", "20"),
            ("utilization", "0.99"),
            ("cycle_time_min", "30"),
            ("uph", "10"),
            ("labor_hours_used", "7.99"),
            ("headcount_used", "8.0"),
            ("is_weekend", "false"),
        ]);
        let record = FieldMapper.to_step_record(&r, 1).unwrap();
        assert_eq!(record.step, "pick");
        assert_eq!(record.backlog_units, 20.0);
        assert_eq!(record.headcount_used, 8);
        assert_eq!(record.hour(), 5);
    }

    #[test]
    fn test_headcount_beyond_u32_is_rejected() {
        let r = row(&[
            ("timestamp", "2024-01-01T05:00:00"),
            ("step", "pick"),
            ("demand_units", "100"),
            ("capacity_units", "80"),
            ("processed_units", "80"),
            ("backlog_units", "20"),
            ("utilization", "0.99"),
            ("cycle_time_min", "30"),
            ("uph", "10"),
            ("labor_hours_used", "7.99"),
            ("headcount_used", "5000000000"),
        ]);
        match FieldMapper.to_step_record(&r, 3).unwrap_err() {
            ImportError::TypeConversionError { row, field, .. } => {
                assert_eq!(row, 3);
                assert_eq!(field, "headcount_used");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_value_reports_row_and_field() {
        let r = row(&[("timestamp", "2024-01-01T05:00:00"), ("step", "pick"), ("demand_units", "lots")]);
        match FieldMapper.to_hourly_metric(&r, 7).unwrap_err() {
            ImportError::TypeConversionError { row, field, .. } => {
                assert_eq!(row, 7);
                assert_eq!(field, "demand_units");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
