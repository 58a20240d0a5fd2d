// ==========================================
// 履约中心产能规划系统 - 领域模型层
// ==========================================
// 职责: 定义各阶段表记录与汇总结构
// 红线: 不含数据访问逻辑,不含引擎逻辑
// 红线: 每个阶段产出新表,不原地修改上游表
// ==========================================

pub mod bottleneck;
pub mod kpi;
pub mod metrics;
pub mod record;
pub mod staffing;
pub mod types;

// 重导出核心类型
pub use bottleneck::{BottleneckAnalysis, BottleneckRecord, BottleneckSummary, StepCount, WorstHour};
pub use kpi::{BottleneckKpis, KpiReport, SiteKpis, StaffingKpis, ThroughputKpis};
pub use metrics::{
    DailyStepMetricRecord, HourlyMetricRecord, MetricTables, MetricValues, RecomputedStepRecord,
    SiteDailyMetricRecord,
};
pub use record::{HourlyDemand, HourlyStepRecord, PreparedStepRecord};
pub use staffing::{StaffingAnalysis, StaffingGap, StaffingRecord, StaffingSummary};
pub use types::{clamp_ratio, MetricGrain, PipelineStage, EPSILON};
