// ==========================================
// 履约中心产能规划系统 - 小时级工序记录
// ==========================================
// 职责: 定义需求序列与 (timestamp, step) 粒度的原子记录
// 红线: 同一工序内按 timestamp 全序,backlog 仅依赖上一小时
// ==========================================

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

// ==========================================
// HourlyDemand - 小时需求
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourlyDemand {
    pub timestamp: NaiveDateTime,
    pub demand_units: f64,
}

// ==========================================
// HourlyStepRecord - 小时 × 工序 原子记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyStepRecord {
    // ===== 主键 =====
    pub timestamp: NaiveDateTime, // 小时时间戳
    pub step: String,             // 工序名称

    // ===== 流量 =====
    pub demand_units: f64,    // 本小时新到需求 (不含积压)
    pub capacity_units: f64,  // 本小时可用产能
    pub processed_units: f64, // 本小时处理量
    pub backlog_units: f64,   // 小时末积压

    // ===== 派生指标 =====
    pub utilization: f64,    // processed / capacity, [0, 1]
    pub cycle_time_min: f64, // 拥堵修正后周期 (分钟)

    // ===== 人力 =====
    pub uph: f64,              // 人均小时产量
    pub labor_hours_used: f64, // 工时
    pub headcount_used: u32,   // ceil(工时)
}

impl HourlyStepRecord {
    /// 自然日
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// 小时 (0-23)
    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }

    /// 星期 (0=周一, 6=周日)
    pub fn day_of_week(&self) -> u32 {
        self.timestamp.weekday().num_days_from_monday()
    }

    /// 是否周末
    pub fn is_weekend(&self) -> bool {
        self.day_of_week() >= 5
    }
}

// ==========================================
// PreparedStepRecord - 预处理后的记录 (附带日历特征)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedStepRecord {
    pub timestamp: NaiveDateTime,
    pub step: String,
    pub demand_units: f64,
    pub capacity_units: f64,
    pub processed_units: f64,
    pub backlog_units: f64,
    pub utilization: f64,
    pub cycle_time_min: f64,
    pub uph: f64,
    pub labor_hours_used: f64,
    pub headcount_used: u32,

    // ===== 日历特征 =====
    pub date: NaiveDate,
    pub dow: u32,
    pub hour: u32,
    pub is_weekend: bool,
}

impl From<&HourlyStepRecord> for PreparedStepRecord {
    fn from(record: &HourlyStepRecord) -> Self {
        Self {
            timestamp: record.timestamp,
            step: record.step.clone(),
            demand_units: record.demand_units,
            capacity_units: record.capacity_units,
            processed_units: record.processed_units,
            backlog_units: record.backlog_units,
            utilization: record.utilization,
            cycle_time_min: record.cycle_time_min,
            uph: record.uph,
            labor_hours_used: record.labor_hours_used,
            headcount_used: record.headcount_used,
            date: record.date(),
            dow: record.day_of_week(),
            hour: record.hour(),
            is_weekend: record.is_weekend(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_at(date: NaiveDate, hour: u32) -> HourlyStepRecord {
        HourlyStepRecord {
            timestamp: date.and_hms_opt(hour, 0, 0).unwrap(),
            step: "receive".to_string(),
            demand_units: 10.0,
            capacity_units: 12.0,
            processed_units: 10.0,
            backlog_units: 0.0,
            utilization: 10.0 / 12.0,
            cycle_time_min: 5.0,
            uph: 20.0,
            labor_hours_used: 0.5,
            headcount_used: 1,
        }
    }

    #[test]
    fn test_calendar_features() {
        // 2024-01-06 是周六
        let saturday = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
        let record = record_at(saturday, 14);
        assert_eq!(record.hour(), 14);
        assert_eq!(record.day_of_week(), 5);
        assert!(record.is_weekend());

        let monday = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let record = record_at(monday, 0);
        assert_eq!(record.day_of_week(), 0);
        assert!(!record.is_weekend());
    }

    #[test]
    fn test_prepared_record_carries_features() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        let prepared = PreparedStepRecord::from(&record_at(date, 9));
        assert_eq!(prepared.date, date);
        assert_eq!(prepared.hour, 9);
        assert_eq!(prepared.dow, 6);
        assert!(prepared.is_weekend);
        assert_eq!(prepared.headcount_used, 1);
    }
}
