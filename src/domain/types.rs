// ==========================================
// 履约中心产能规划系统 - 领域类型定义
// ==========================================
// 职责: 流水线阶段、聚合粒度与全局数值常量
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 除法保护常量（产能/uph/总需求接近 0 时避免除零）
pub const EPSILON: f64 = 1e-6;

/// 将比例值截断到 [0, 1]
pub fn clamp_ratio(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

// ==========================================
// 流水线阶段 (Pipeline Stage)
// ==========================================
// 用途: 缺失输入时提示需要(重新)运行的上游阶段
// 序列化格式: snake_case (与命令行子命令一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Generate,    // 合成数据生成
    Preprocess,  // 校验 + 特征派生
    Analyze,     // 指标重算 + 多粒度聚合
    Bottlenecks, // 瓶颈识别
    Recommend,   // 人力建议
    Report,      // KPI 汇总
}

impl PipelineStage {
    /// 命令行子命令名称
    pub fn command(&self) -> &'static str {
        match self {
            PipelineStage::Generate => "generate",
            PipelineStage::Preprocess => "preprocess",
            PipelineStage::Analyze => "analyze",
            PipelineStage::Bottlenecks => "bottlenecks",
            PipelineStage::Recommend => "recommend",
            PipelineStage::Report => "report",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command())
    }
}

// ==========================================
// 聚合粒度 (Metric Grain)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricGrain {
    HourlyStep, // 小时 × 工序
    DailyStep,  // 日 × 工序
    SiteDaily,  // 日 (全场跨工序)
}

impl fmt::Display for MetricGrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricGrain::HourlyStep => write!(f, "HOURLY_STEP"),
            MetricGrain::DailyStep => write!(f, "DAILY_STEP"),
            MetricGrain::SiteDaily => write!(f, "SITE_DAILY"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_ratio_bounds() {
        assert_eq!(clamp_ratio(1.5), 1.0);
        assert_eq!(clamp_ratio(-0.2), 0.0);
        assert_eq!(clamp_ratio(0.42), 0.42);
        assert_eq!(clamp_ratio(f64::NAN), 0.0);
    }

    #[test]
    fn test_pipeline_stage_display_matches_command() {
        assert_eq!(PipelineStage::Generate.to_string(), "generate");
        assert_eq!(PipelineStage::Analyze.to_string(), "analyze");
        assert_eq!(PipelineStage::Bottlenecks.command(), "bottlenecks");
    }
}
