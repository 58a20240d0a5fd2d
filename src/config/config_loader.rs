// ==========================================
// 履约中心产能规划系统 - 配置加载器
// ==========================================
// 职责: 按扩展名选择 YAML / JSON 解析,并执行语义校验
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::planner_config::PlannerConfig;
use std::path::Path;

pub struct ConfigLoader;

impl ConfigLoader {
    /// 从文件加载并校验配置
    ///
    /// # 参数
    /// - path: `.yaml` / `.yml` / `.json` 文件
    ///
    /// # 返回
    /// - Ok(PlannerConfig): 已通过 `validate()` 的配置
    /// - Err(ConfigError): 文件缺失、格式不支持、缺键或语义校验失败
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<PlannerConfig> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let content = std::fs::read_to_string(path)?;
        let label = path.display().to_string();

        let config = match ext.as_str() {
            "yaml" | "yml" => Self::parse_yaml(&content, &label)?,
            "json" => Self::parse_json(&content, &label)?,
            _ => return Err(ConfigError::UnsupportedFormat(ext)),
        };

        config.validate()?;

        tracing::info!(
            path = %label,
            steps = config.steps.len(),
            num_days = config.num_days,
            "配置加载完成"
        );

        Ok(config)
    }

    /// 解析 YAML 文本（不做语义校验）
    pub fn parse_yaml(content: &str, label: &str) -> ConfigResult<PlannerConfig> {
        serde_yml::from_str(content).map_err(|e| ConfigError::Parse {
            path: label.to_string(),
            message: e.to_string(),
        })
    }

    /// 解析 JSON 文本（不做语义校验）
    pub fn parse_json(content: &str, label: &str) -> ConfigResult<PlannerConfig> {
        serde_json::from_str(content).map_err(|e| ConfigError::Parse {
            path: label.to_string(),
            message: e.to_string(),
        })
    }
}
