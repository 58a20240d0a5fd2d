// ==========================================
// 履约中心产能规划系统 - KPI 报告模型
// ==========================================
// 职责: 跨表汇总 KPI; 各分区仅在对应输入表存在时出现
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 吞吐与周期 KPI (来自 日×工序 表)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ThroughputKpis {
    pub avg_utilization_by_step: BTreeMap<String, f64>,
    pub total_throughput_processed: f64,
    pub total_throughput_loss: f64,
    pub avg_cycle_time_by_step: BTreeMap<String, f64>,
    pub p90_cycle_time_by_step: BTreeMap<String, f64>,
}

/// 瓶颈 KPI
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BottleneckKpis {
    /// 各工序瓶颈占比 (%)
    pub bottleneck_share_by_step: BTreeMap<String, f64>,
}

/// 人力 KPI
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StaffingKpis {
    pub extra_headcount_hours_needed: i64,
    pub estimated_cost_to_hit_target: f64,
}

/// 全场 KPI
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SiteKpis {
    pub overall_avg_utilization: f64,
    pub overall_avg_service_level: f64,
    pub total_days: usize,
}

/// KPI 报告
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KpiReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throughput: Option<ThroughputKpis>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottleneck: Option<BottleneckKpis>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staffing: Option<StaffingKpis>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<SiteKpis>,
}
