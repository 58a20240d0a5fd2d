// ==========================================
// 履约中心产能规划系统 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::domain::types::PipelineStage;
use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 产物缺失 =====
    #[error("产物不存在: {path}，请先运行 `{producer}` 阶段")]
    MissingInput {
        path: String,
        producer: PipelineStage,
    },

    // ===== 读写错误 =====
    #[error("文件读写失败 ({path}): {message}")]
    Io { path: String, message: String },

    #[error("CSV 读写失败 ({path}): {message}")]
    Csv { path: String, message: String },

    #[error("JSON 读写失败 ({path}): {message}")]
    Json { path: String, message: String },
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
