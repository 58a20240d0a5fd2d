// ==========================================
// 履约中心产能规划系统 - 瓶颈标记模型
// ==========================================
// 职责: 小时工序瓶颈标记 + 瓶颈汇总
// 生命周期: 基于完整小时表一次性计算,不做增量重算
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 瓶颈标记记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottleneckRecord {
    pub timestamp: NaiveDateTime,
    pub step: String,
    pub demand_units: f64,
    pub capacity_units: f64,
    pub processed_units: f64,
    pub backlog_units: f64,
    pub utilization: f64,
    pub service_level_hourly: f64,
    pub throughput_loss_units: f64,

    /// 积压变化 (本小时 - 上一小时, 首小时为 0)
    pub backlog_change: f64,

    /// 是否瓶颈
    pub is_bottleneck: bool,

    /// 该小时的限速工序 (每小时至多一个)
    pub bottleneck_step: Option<String>,
}

/// 最差小时 (按吞吐损失)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorstHour {
    pub timestamp: NaiveDateTime,
    pub step: String,
    pub utilization: f64,
    pub throughput_loss_units: f64,
    pub backlog_units: f64,
}

/// 工序计数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepCount {
    pub step: String,
    pub count: usize,
}

/// 瓶颈汇总
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BottleneckSummary {
    /// 瓶颈小时总数
    pub total_bottleneck_hours: usize,

    /// 各工序瓶颈小时数
    pub bottleneck_hours_by_step: BTreeMap<String, usize>,

    /// 吞吐损失最大的 10 条记录
    pub top_10_worst_hours: Vec<WorstHour>,

    /// 瓶颈出现次数分布 (按次数降序)
    pub bottleneck_step_distribution: Vec<StepCount>,
}

/// 瓶颈识别输出
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BottleneckAnalysis {
    pub records: Vec<BottleneckRecord>,
    pub summary: BottleneckSummary,
}
