// ==========================================
// 履约中心产能规划系统 - API层错误类型
// ==========================================
// 职责: 汇聚各层错误,保留上下文 (路径/列名/参数名)
// ==========================================

use crate::config::ConfigError;
use crate::domain::types::PipelineStage;
use crate::engine::EngineError;
use crate::importer::ImportError;
use crate::repository::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error("输入表错误: {0}")]
    Import(#[from] ImportError),

    #[error("计算错误: {0}")]
    Engine(#[from] EngineError),

    #[error("产物读写错误: {0}")]
    Repository(#[from] RepositoryError),
}

impl ApiError {
    /// 缺失输入时需要 (重新) 运行的阶段
    pub fn rerun_stage(&self) -> Option<PipelineStage> {
        match self {
            ApiError::Import(ImportError::MissingInput { producer, .. })
            | ApiError::Repository(RepositoryError::MissingInput { producer, .. }) => Some(*producer),
            _ => None,
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
