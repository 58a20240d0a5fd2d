// ==========================================
// 履约中心产能规划系统 - 需求生成引擎
// ==========================================
// 职责: 生成整个规划周期的小时需求序列
// 输入: 起始日期 + 天数 + 需求画像 + 种子
// 输出: 24 × num_days 条非负小时需求
// ==========================================
// 红线: 促销日抽样先于所有噪声抽样且仅一次
// 红线: 噪声按时间戳顺序逐小时抽取
// ==========================================

use crate::config::DemandConfig;
use crate::domain::record::HourlyDemand;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::random::SeededStream;
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::HashSet;
use tracing::instrument;

/// 需求噪声变异系数
pub const DEMAND_NOISE_CV: f64 = 0.10;

// ==========================================
// DemandGenerator - 需求生成引擎
// ==========================================
// 无状态引擎,随机性全部来自调用方给定的种子
pub struct DemandGenerator;

impl DemandGenerator {
    pub fn new() -> Self {
        Self
    }

    /// 生成小时需求
    ///
    /// # 参数
    /// - `profile`: 需求画像（基准日均、小时季节性、星期画像、促销）
    /// - `start_date`: 起始日期
    /// - `num_days`: 天数（0 时返回空序列）
    /// - `seed`: 随机种子
    ///
    /// # 返回
    /// 按时间戳升序的小时需求，长度 24 × num_days
    #[instrument(skip(self, profile), fields(promo_days = profile.promo_days))]
    pub fn generate(
        &self,
        profile: &DemandConfig,
        start_date: NaiveDate,
        num_days: u32,
        seed: u64,
    ) -> EngineResult<Vec<HourlyDemand>> {
        if profile.promo_days > num_days {
            return Err(EngineError::invalid(
                "promo_days",
                format!("促销天数 {} 超过规划天数 {}", profile.promo_days, num_days),
            ));
        }

        let mut stream = SeededStream::new(seed);

        // 1. 促销日抽样（无放回）
        let promo_day_indices: HashSet<usize> = stream
            .sample_without_replacement(num_days as usize, profile.promo_days as usize)
            .into_iter()
            .collect();

        let peak_hours: HashSet<u32> = profile.hourly_seasonality.peak_hours.iter().copied().collect();
        let base_hourly_mean = profile.base_demand_mean / 24.0;

        // 2. 逐日逐小时生成
        let mut demand = Vec::with_capacity(num_days as usize * 24);
        for day in 0..num_days as usize {
            let current_date = start_date + Duration::days(day as i64);
            let is_weekend = current_date.weekday().num_days_from_monday() >= 5;

            let day_multiplier = if is_weekend {
                profile.day_of_week.weekend_multiplier
            } else {
                profile.day_of_week.weekday_multiplier
            };
            let promo_multiplier = if promo_day_indices.contains(&day) {
                profile.promo_multiplier
            } else {
                1.0
            };

            for hour in 0..24u32 {
                let hour_multiplier = if peak_hours.contains(&hour) {
                    profile.hourly_seasonality.peak_multiplier
                } else {
                    profile.hourly_seasonality.off_peak_multiplier
                };

                let expected =
                    base_hourly_mean * day_multiplier * hour_multiplier * promo_multiplier;
                let noise = stream.normal(1.0, DEMAND_NOISE_CV);

                demand.push(HourlyDemand {
                    timestamp: current_date.and_hms_opt(0, 0, 0).unwrap_or_default()
                        + Duration::hours(hour as i64),
                    demand_units: (expected * noise).max(0.0),
                });
            }
        }

        tracing::debug!(hours = demand.len(), promo_days = promo_day_indices.len(), "需求生成完成");

        Ok(demand)
    }
}

impl Default for DemandGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::planner_config::test_support::sample_config;
    use chrono::Timelike;

    #[test]
    fn test_generates_24_values_per_day() {
        let config = sample_config(5);
        let demand = DemandGenerator::new()
            .generate(&config.demand, config.start_date, config.num_days, 42)
            .unwrap();

        assert_eq!(demand.len(), 5 * 24);
        assert!(demand.iter().all(|d| d.demand_units >= 0.0));
        assert_eq!(demand[0].timestamp, config.start_date.and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(demand[25].timestamp.hour(), 1);
        assert!(demand.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn test_same_seed_is_bit_identical() {
        let config = sample_config(7);
        let generator = DemandGenerator::new();
        let a = generator.generate(&config.demand, config.start_date, 7, 11).unwrap();
        let b = generator.generate(&config.demand, config.start_date, 7, 11).unwrap();
        let bits = |v: &[HourlyDemand]| v.iter().map(|d| d.demand_units.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));

        let c = generator.generate(&config.demand, config.start_date, 7, 12).unwrap();
        assert_ne!(bits(&a), bits(&c));
    }

    #[test]
    fn test_zero_noise_profile_follows_multipliers() {
        // 无促销，高峰 2x，非高峰 1x，周末 0.5x
        let mut config = sample_config(7);
        config.demand.base_demand_mean = 2400.0;
        config.demand.promo_days = 0;
        config.demand.hourly_seasonality.peak_hours = vec![12];
        config.demand.hourly_seasonality.peak_multiplier = 2.0;
        config.demand.hourly_seasonality.off_peak_multiplier = 1.0;
        config.demand.day_of_week.weekend_multiplier = 0.5;

        let demand = DemandGenerator::new()
            .generate(&config.demand, config.start_date, 7, 5)
            .unwrap();

        // 2024-01-01 周一：高峰均值应高于非高峰
        let weekday_peak: f64 = demand[12].demand_units;
        assert!(weekday_peak > 0.0);

        // 周末日均明显低于工作日
        let day_total = |d: usize| demand[d * 24..(d + 1) * 24].iter().map(|h| h.demand_units).sum::<f64>();
        let weekday_avg = (0..5).map(day_total).sum::<f64>() / 5.0;
        let weekend_avg = (5..7).map(day_total).sum::<f64>() / 2.0;
        assert!(weekend_avg < weekday_avg * 0.7, "weekday={} weekend={}", weekday_avg, weekend_avg);
    }

    #[test]
    fn test_zero_horizon_is_empty() {
        let mut config = sample_config(0);
        config.demand.promo_days = 0;
        let demand = DemandGenerator::new()
            .generate(&config.demand, config.start_date, 0, 1)
            .unwrap();
        assert!(demand.is_empty());
    }

    #[test]
    fn test_promo_days_exceeding_horizon_rejected() {
        let mut config = sample_config(2);
        config.demand.promo_days = 3;
        let result = DemandGenerator::new().generate(&config.demand, config.start_date, 2, 1);
        assert!(matches!(result, Err(EngineError::InvalidParameter { .. })));
    }
}
