// ==========================================
// 履约中心产能规划系统 - API 层
// ==========================================
// 职责: 提供流水线阶段操作,供命令行调用
// ==========================================

pub mod error;
pub mod pipeline_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use pipeline_api::{PipelineApi, PipelineReport, StageReport};
