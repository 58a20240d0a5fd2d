// ==========================================
// 履约中心产能规划系统 - 引擎层
// ==========================================
// 职责: 需求生成、工序仿真、指标聚合、瓶颈识别、人力建议、KPI 汇总
// 红线: 引擎无状态,不做文件 I/O
// 红线: 参数非法在计算开始前报错,不产出部分结果
// ==========================================

pub mod bottleneck;
pub mod demand;
pub mod error;
pub mod kpi;
pub mod metrics;
pub mod orchestrator;
pub mod random;
pub mod simulator;
pub mod staffing;

// 重导出核心引擎
pub use bottleneck::{BottleneckDetector, DEFAULT_BOTTLENECK_THRESHOLD};
pub use demand::DemandGenerator;
pub use error::{EngineError, EngineResult};
pub use kpi::{KpiEngine, KpiInputs};
pub use metrics::MetricsAggregator;
pub use orchestrator::SimulationOrchestrator;
pub use random::{step_seed, SeededStream};
pub use simulator::{advance_backlog, congestion_factor, utilization, BacklogStep, StepParameters, StepSimulator};
pub use staffing::StaffingRecommender;
