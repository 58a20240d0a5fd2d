// ==========================================
// 履约中心产能规划系统 - 规划配置
// ==========================================
// 职责: 规划周期、需求画像、工序参数表、全局阈值的强类型配置
// 红线: 配置为不可变值,显式传入各组件,不读全局状态
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

// ==========================================
// PlannerConfig - 顶层配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    // ===== 规划周期 =====
    pub start_date: NaiveDate,
    pub num_days: u32,
    pub random_state: u64,

    /// 工序链 (顺序即链路位置)
    pub steps: Vec<String>,

    // ===== 参数表 =====
    pub demand: DemandConfig,
    pub capacity: CapacityConfig,
    pub uph_by_step: BTreeMap<String, f64>,
    pub cycle_time: CycleTimeConfig,

    // ===== 全局阈值 =====
    pub bottleneck_threshold_util: f64,
    pub service_target: f64,
    pub wage_per_hour: f64,

    // ===== 产物路径 (可选) =====
    #[serde(default)]
    pub data: DataPaths,
    #[serde(default)]
    pub reports: ReportPaths,
}

/// 需求画像
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandConfig {
    pub base_demand_mean: f64,
    pub hourly_seasonality: HourlySeasonality,
    pub day_of_week: DayOfWeekProfile,
    pub promo_days: u32,
    pub promo_multiplier: f64,
}

/// 小时季节性
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlySeasonality {
    pub peak_hours: Vec<u32>,
    pub peak_multiplier: f64,
    pub off_peak_multiplier: f64,
}

/// 星期画像
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayOfWeekProfile {
    pub weekday_multiplier: f64,
    pub weekend_multiplier: f64,
}

/// 产能参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityConfig {
    pub step_capacity_base: BTreeMap<String, f64>,
    pub variability_std: f64,
    pub downtime_probability: f64,
    pub downtime_severity: f64,
}

/// 周期时间参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleTimeConfig {
    pub base_min: BTreeMap<String, f64>,
    pub congestion_multiplier_max: f64,
}

/// 表产物相对路径
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    pub raw_file: String,
    pub processed_file: String,
    pub step_hourly_file: String,
    pub step_daily_file: String,
    pub site_daily_file: String,
    pub bottlenecks_file: String,
    pub staffing_file: String,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            raw_file: "data/raw/fc_hourly_ops.csv".to_string(),
            processed_file: "data/processed/fc_hourly_clean.csv".to_string(),
            step_hourly_file: "data/processed/step_hourly_metrics.csv".to_string(),
            step_daily_file: "data/processed/step_daily_metrics.csv".to_string(),
            site_daily_file: "data/processed/site_daily_metrics.csv".to_string(),
            bottlenecks_file: "data/processed/bottlenecks.csv".to_string(),
            staffing_file: "data/processed/staffing_recommendations.csv".to_string(),
        }
    }
}

/// 汇总产物相对路径
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportPaths {
    pub bottleneck_summary: String,
    pub staffing_summary: String,
    pub kpis_json: String,
}

impl Default for ReportPaths {
    fn default() -> Self {
        Self {
            bottleneck_summary: "reports/bottleneck_summary.json".to_string(),
            staffing_summary: "reports/staffing_summary.json".to_string(),
            kpis_json: "reports/kpis.json".to_string(),
        }
    }
}

impl PlannerConfig {
    /// 工序在链路中的位置
    pub fn step_position(&self, step: &str) -> Option<usize> {
        self.steps.iter().position(|s| s == step)
    }

    /// 语义校验
    ///
    /// 一次性收集所有问题，返回 `ConfigError::Invalid`
    pub fn validate(&self) -> ConfigResult<()> {
        let mut problems = Vec::new();

        // 工序名唯一
        let mut seen = HashSet::new();
        for step in &self.steps {
            if step.trim().is_empty() {
                problems.push("steps 中存在空工序名".to_string());
            } else if !seen.insert(step.as_str()) {
                problems.push(format!("steps 中工序重复: {}", step));
            }
        }

        // 每个工序的参数表必须完整
        for step in &self.steps {
            if !self.capacity.step_capacity_base.contains_key(step) {
                problems.push(format!("capacity.step_capacity_base 缺少工序 {}", step));
            }
            match self.uph_by_step.get(step) {
                None => problems.push(format!("uph_by_step 缺少工序 {}", step)),
                Some(uph) if *uph <= 0.0 => {
                    problems.push(format!("uph_by_step.{} 必须 > 0，实际 {}", step, uph))
                }
                Some(_) => {}
            }
            if !self.cycle_time.base_min.contains_key(step) {
                problems.push(format!("cycle_time.base_min 缺少工序 {}", step));
            }
        }

        // 概率类 [0, 1]
        check_unit_interval(&mut problems, "capacity.downtime_probability", self.capacity.downtime_probability);
        check_unit_interval(&mut problems, "capacity.downtime_severity", self.capacity.downtime_severity);
        check_unit_interval(&mut problems, "bottleneck_threshold_util", self.bottleneck_threshold_util);

        if !(self.service_target > 0.0 && self.service_target <= 1.0) {
            problems.push(format!("service_target 必须在 (0, 1] 内，实际 {}", self.service_target));
        }

        // 非负参数
        check_non_negative(&mut problems, "demand.base_demand_mean", self.demand.base_demand_mean);
        check_non_negative(&mut problems, "demand.promo_multiplier", self.demand.promo_multiplier);
        check_non_negative(
            &mut problems,
            "demand.hourly_seasonality.peak_multiplier",
            self.demand.hourly_seasonality.peak_multiplier,
        );
        check_non_negative(
            &mut problems,
            "demand.hourly_seasonality.off_peak_multiplier",
            self.demand.hourly_seasonality.off_peak_multiplier,
        );
        check_non_negative(
            &mut problems,
            "demand.day_of_week.weekday_multiplier",
            self.demand.day_of_week.weekday_multiplier,
        );
        check_non_negative(
            &mut problems,
            "demand.day_of_week.weekend_multiplier",
            self.demand.day_of_week.weekend_multiplier,
        );
        check_non_negative(&mut problems, "capacity.variability_std", self.capacity.variability_std);
        check_non_negative(&mut problems, "wage_per_hour", self.wage_per_hour);

        if self.cycle_time.congestion_multiplier_max < 1.0 {
            problems.push(format!(
                "cycle_time.congestion_multiplier_max 必须 >= 1，实际 {}",
                self.cycle_time.congestion_multiplier_max
            ));
        }

        if self.demand.promo_days > self.num_days {
            problems.push(format!(
                "demand.promo_days ({}) 超过 num_days ({})",
                self.demand.promo_days, self.num_days
            ));
        }

        for hour in &self.demand.hourly_seasonality.peak_hours {
            if *hour > 23 {
                problems.push(format!("demand.hourly_seasonality.peak_hours 含非法小时 {}", hour));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }
}

fn check_unit_interval(problems: &mut Vec<String>, key: &str, value: f64) {
    if !(0.0..=1.0).contains(&value) {
        problems.push(format!("{} 必须在 [0, 1] 内，实际 {}", key, value));
    }
}

fn check_non_negative(problems: &mut Vec<String>, key: &str, value: f64) {
    if !(value >= 0.0) {
        problems.push(format!("{} 必须 >= 0，实际 {}", key, value));
    }
}
