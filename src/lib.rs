// ==========================================
// 履约中心产能规划系统 - 核心库
// ==========================================
// 技术栈: Rust + CSV/Excel 表 + YAML 配置
// 系统定位: 决策支持系统 (合成数据 → 指标 → 瓶颈 → 人力建议)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 表记录与汇总结构
pub mod domain;

// 配置层 - 规划配置
pub mod config;

// 导入层 - 外部表输入
pub mod importer;

// 引擎层 - 仿真与分析
pub mod engine;

// 数据仓储层 - 阶段产物
pub mod repository;

// API 层 - 流水线阶段
pub mod api;

// 日志系统
pub mod logging;

// 阶段耗时
pub mod perf;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{MetricGrain, PipelineStage};

// 领域记录
pub use domain::{
    BottleneckRecord, DailyStepMetricRecord, HourlyDemand, HourlyMetricRecord, HourlyStepRecord,
    KpiReport, SiteDailyMetricRecord, StaffingRecord,
};

// 配置
pub use config::{ConfigLoader, PlannerConfig};

// 引擎
pub use engine::{
    BottleneckDetector, DemandGenerator, KpiEngine, MetricsAggregator, SimulationOrchestrator,
    StaffingRecommender, StepSimulator,
};

// API
pub use api::{PipelineApi, PipelineReport, StageReport};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "履约中心产能规划系统";
