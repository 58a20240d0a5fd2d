// ==========================================
// 履约中心产能规划系统 - 派生指标模型
// ==========================================
// 职责: 重算后的小时工序记录 + 三种粒度聚合表
// 口径: 流量类 (需求/产能/处理/损失/工时/人数) 求和
//       水平类 (利用率/周期/服务水平/积压) 求均值
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// RecomputedStepRecord - 重算后的小时工序记录
// ==========================================
// 红线: utilization / service_level / throughput_loss 一律重算,不信任输入列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecomputedStepRecord {
    pub timestamp: NaiveDateTime,
    pub step: String,
    pub demand_units: f64,
    pub capacity_units: f64,
    pub processed_units: f64,
    pub backlog_units: f64,
    pub utilization: f64,
    pub cycle_time_min: f64,
    pub labor_hours_used: f64,
    pub headcount_used: u64,

    // ===== 积压结转口径 =====
    pub backlog_in: f64,   // 上一小时积压 (首小时为 0)
    pub total_demand: f64, // demand + backlog_in

    // ===== 服务指标 =====
    pub service_level_hourly: f64,
    pub throughput_loss_units: f64,
}

// ==========================================
// MetricValues - 聚合度量值
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricValues {
    pub demand_units: f64,
    pub capacity_units: f64,
    pub processed_units: f64,
    pub backlog_units: f64,
    pub utilization: f64,
    pub cycle_time_min: f64,
    pub service_level_hourly: f64,
    pub throughput_loss_units: f64,
    pub labor_hours_used: f64,
    pub headcount_used: u64,
}

/// 小时 × 工序 指标 (瓶颈识别与人力建议的输入表)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyMetricRecord {
    pub timestamp: NaiveDateTime,
    pub step: String,
    pub demand_units: f64,
    pub capacity_units: f64,
    pub processed_units: f64,
    pub backlog_units: f64,
    pub utilization: f64,
    pub cycle_time_min: f64,
    pub service_level_hourly: f64,
    pub throughput_loss_units: f64,
    pub labor_hours_used: f64,
    pub headcount_used: u64,
}

/// 日 × 工序 指标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStepMetricRecord {
    pub date: NaiveDate,
    pub step: String,
    pub demand_units: f64,
    pub capacity_units: f64,
    pub processed_units: f64,
    pub backlog_units: f64,
    pub utilization: f64,
    pub cycle_time_min: f64,
    pub service_level_hourly: f64,
    pub throughput_loss_units: f64,
    pub labor_hours_used: f64,
    pub headcount_used: u64,
}

/// 日 × 全场 指标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteDailyMetricRecord {
    pub date: NaiveDate,
    pub demand_units: f64,
    pub capacity_units: f64,
    pub processed_units: f64,
    pub backlog_units: f64,
    pub utilization: f64,
    pub cycle_time_min: f64,
    pub service_level_hourly: f64,
    pub throughput_loss_units: f64,
    pub labor_hours_used: f64,
    pub headcount_used: u64,
}

impl HourlyMetricRecord {
    pub fn from_values(timestamp: NaiveDateTime, step: String, v: MetricValues) -> Self {
        Self {
            timestamp,
            step,
            demand_units: v.demand_units,
            capacity_units: v.capacity_units,
            processed_units: v.processed_units,
            backlog_units: v.backlog_units,
            utilization: v.utilization,
            cycle_time_min: v.cycle_time_min,
            service_level_hourly: v.service_level_hourly,
            throughput_loss_units: v.throughput_loss_units,
            labor_hours_used: v.labor_hours_used,
            headcount_used: v.headcount_used,
        }
    }
}

impl DailyStepMetricRecord {
    pub fn from_values(date: NaiveDate, step: String, v: MetricValues) -> Self {
        Self {
            date,
            step,
            demand_units: v.demand_units,
            capacity_units: v.capacity_units,
            processed_units: v.processed_units,
            backlog_units: v.backlog_units,
            utilization: v.utilization,
            cycle_time_min: v.cycle_time_min,
            service_level_hourly: v.service_level_hourly,
            throughput_loss_units: v.throughput_loss_units,
            labor_hours_used: v.labor_hours_used,
            headcount_used: v.headcount_used,
        }
    }
}

impl SiteDailyMetricRecord {
    pub fn from_values(date: NaiveDate, v: MetricValues) -> Self {
        Self {
            date,
            demand_units: v.demand_units,
            capacity_units: v.capacity_units,
            processed_units: v.processed_units,
            backlog_units: v.backlog_units,
            utilization: v.utilization,
            cycle_time_min: v.cycle_time_min,
            service_level_hourly: v.service_level_hourly,
            throughput_loss_units: v.throughput_loss_units,
            labor_hours_used: v.labor_hours_used,
            headcount_used: v.headcount_used,
        }
    }
}

// ==========================================
// MetricTables - 一次分析产出的全部聚合表
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricTables {
    pub hourly: Vec<HourlyMetricRecord>,
    pub daily_step: Vec<DailyStepMetricRecord>,
    pub site_daily: Vec<SiteDailyMetricRecord>,
}
