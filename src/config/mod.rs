// ==========================================
// 履约中心产能规划系统 - 配置层
// ==========================================
// 职责: 规划配置的加载、校验与传递
// 格式: YAML / JSON
// ==========================================

pub mod config_loader;
pub mod error;
pub mod planner_config;

// 重导出核心配置类型
pub use config_loader::ConfigLoader;
pub use error::{ConfigError, ConfigResult};
pub use planner_config::{
    CapacityConfig, CycleTimeConfig, DataPaths, DayOfWeekProfile, DemandConfig,
    HourlySeasonality, PlannerConfig, ReportPaths,
};
