// ==========================================
// 履约中心产能规划系统 - 人力建议模型
// ==========================================
// 职责: 小时工序人力建议 + 人力缺口汇总
// 红线: 仅正缺口计入成本,负缺口(富余)只报告不计价
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 人力建议记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffingRecord {
    pub timestamp: NaiveDateTime,
    pub step: String,
    pub demand_units: f64,
    pub backlog_units: f64,
    pub utilization: f64,

    // ===== 需求口径 =====
    pub backlog_in: f64,
    pub required_units: f64,
    pub required_capacity_units: f64,

    // ===== 人力 =====
    pub uph: f64,
    pub required_labor_hours: f64,
    pub headcount_used: i64,
    pub recommended_headcount: i64,
    pub headcount_gap: i64, // 有符号: 负值表示富余
    pub labor_cost_impact: f64,
}

/// 缺口最大的小时
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffingGap {
    pub timestamp: NaiveDateTime,
    pub step: String,
    pub headcount_used: i64,
    pub recommended_headcount: i64,
    pub headcount_gap: i64,
    pub labor_cost_impact: f64,
    pub utilization: f64,
}

/// 人力建议汇总
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StaffingSummary {
    pub total_headcount_gap_hours: i64,
    pub total_positive_gap_hours: i64,
    pub total_cost_impact: f64,
    pub headcount_gap_by_step: BTreeMap<String, i64>,
    pub avg_gap_by_step: BTreeMap<String, f64>,
    pub top_20_gaps: Vec<StaffingGap>,
}

/// 人力建议输出
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StaffingAnalysis {
    pub records: Vec<StaffingRecord>,
    pub summary: StaffingSummary,
}
