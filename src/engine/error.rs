// ==========================================
// 履约中心产能规划系统 - 引擎层错误类型
// ==========================================
// 红线: 参数错误在计算开始前抛出,不产出部分结果
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("参数非法 ({name}): {message}")]
    InvalidParameter { name: String, message: String },

    #[error("工序 {step} 缺少参数 {parameter}")]
    MissingStepParameter { step: String, parameter: String },

    #[error("并行仿真任务失败: {0}")]
    TaskFailed(String),
}

impl EngineError {
    pub fn invalid(name: &str, message: impl Into<String>) -> Self {
        EngineError::InvalidParameter {
            name: name.to_string(),
            message: message.into(),
        }
    }

    pub fn missing(step: &str, parameter: &str) -> Self {
        EngineError::MissingStepParameter {
            step: step.to_string(),
            parameter: parameter.to_string(),
        }
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
