// ==========================================
// 履约中心产能规划系统 - 配置层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 缺失必填项是致命错误,不做静默默认
// ==========================================

use thiserror::Error;

/// 配置层错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {0}")]
    FileNotFound(String),

    #[error("配置文件格式不支持: {0}（仅支持 .yaml/.yml/.json）")]
    UnsupportedFormat(String),

    #[error("配置文件读取失败: {0}")]
    FileReadError(String),

    /// 反序列化失败（缺失必填键/类型不符均落在此处，消息中包含键名）
    #[error("配置解析失败 ({path}): {message}")]
    Parse { path: String, message: String },

    /// 语义校验失败（一次性列出全部问题）
    #[error("配置校验失败: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::FileReadError(err.to_string())
    }
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
