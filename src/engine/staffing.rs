// ==========================================
// 履约中心产能规划系统 - 人力建议引擎
// ==========================================
// 职责: 计算达成目标服务水平所需人数与人力成本影响
// 输入: 小时 × 工序 指标表 + 目标服务水平 + uph 表 + 时薪
// 输出: StaffingAnalysis (逐记录建议 + 汇总)
// ==========================================
// 计算口径:
//   required_units       = demand + backlog_in
//   required_capacity    = required_units / target
//   required_labor_hours = required_capacity / (uph + ε)
//   recommended          = ceil(required_labor_hours)
//   gap                  = recommended − headcount_used (有符号)
//   cost_impact          = wage × max(0, gap)
// ==========================================
// 红线: 负缺口 (富余) 只报告,不计成本
// ==========================================

use crate::domain::metrics::HourlyMetricRecord;
use crate::domain::staffing::{StaffingAnalysis, StaffingGap, StaffingRecord, StaffingSummary};
use crate::domain::types::EPSILON;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::metrics::group_by_step;
use std::collections::BTreeMap;
use tracing::instrument;

/// 最大缺口列表长度
pub const TOP_GAPS_N: usize = 20;

pub struct StaffingRecommender {
    service_target: f64,
    uph_by_step: BTreeMap<String, f64>,
    wage_per_hour: f64,
}

impl StaffingRecommender {
    /// 创建人力建议引擎
    ///
    /// # 参数
    /// - service_target: 目标服务水平, (0, 1]
    /// - uph_by_step: 各工序人均小时产量
    /// - wage_per_hour: 时薪, >= 0
    pub fn new(
        service_target: f64,
        uph_by_step: BTreeMap<String, f64>,
        wage_per_hour: f64,
    ) -> EngineResult<Self> {
        if !(service_target > 0.0 && service_target <= 1.0) {
            return Err(EngineError::invalid(
                "service_target",
                format!("{} 不在 (0, 1] 内", service_target),
            ));
        }
        if !(wage_per_hour >= 0.0) {
            return Err(EngineError::invalid(
                "wage_per_hour",
                format!("{} 必须 >= 0", wage_per_hour),
            ));
        }
        Ok(Self {
            service_target,
            uph_by_step,
            wage_per_hour,
        })
    }

    /// 生成人力建议
    ///
    /// 表中出现但 uph 表缺失的工序在计算前报错
    #[instrument(skip(self, hourly), fields(rows = hourly.len(), target = self.service_target))]
    pub fn recommend(&self, hourly: &[HourlyMetricRecord]) -> EngineResult<StaffingAnalysis> {
        let (chain, groups) = group_by_step(hourly, |r| r.step.as_str());

        // 先校验 uph 覆盖
        let mut uph_of = Vec::with_capacity(chain.names().len());
        for step in chain.names() {
            let uph = self
                .uph_by_step
                .get(step)
                .copied()
                .ok_or_else(|| EngineError::missing(step, "uph"))?;
            uph_of.push(uph);
        }

        let mut records = Vec::with_capacity(hourly.len());
        for (mut group, uph) in groups.into_iter().zip(uph_of) {
            group.sort_by_key(|r| r.timestamp);

            let mut backlog_in = 0.0;
            for r in group {
                records.push(self.recommend_one(r, backlog_in, uph));
                backlog_in = r.backlog_units;
            }
        }

        let summary = self.summarize(&records, chain.names());

        tracing::info!(
            positive_gap_hours = summary.total_positive_gap_hours,
            cost_impact = summary.total_cost_impact,
            "人力建议完成"
        );

        Ok(StaffingAnalysis { records, summary })
    }

    fn recommend_one(&self, r: &HourlyMetricRecord, backlog_in: f64, uph: f64) -> StaffingRecord {
        let required_units = r.demand_units + backlog_in;
        let required_capacity_units = required_units / self.service_target;
        let required_labor_hours = required_capacity_units / (uph + EPSILON);
        let recommended_headcount = required_labor_hours.ceil() as i64;
        let headcount_used = r.headcount_used as i64;
        let headcount_gap = recommended_headcount - headcount_used;

        StaffingRecord {
            timestamp: r.timestamp,
            step: r.step.clone(),
            demand_units: r.demand_units,
            backlog_units: r.backlog_units,
            utilization: r.utilization,
            backlog_in,
            required_units,
            required_capacity_units,
            uph,
            required_labor_hours,
            headcount_used,
            recommended_headcount,
            headcount_gap,
            labor_cost_impact: self.cost_impact(headcount_gap),
        }
    }

    /// 成本影响 = wage × max(0, gap)
    pub fn cost_impact(&self, headcount_gap: i64) -> f64 {
        self.wage_per_hour * headcount_gap.max(0) as f64
    }

    fn summarize(&self, records: &[StaffingRecord], chain: &[String]) -> StaffingSummary {
        let mut headcount_gap_by_step: BTreeMap<String, i64> = BTreeMap::new();
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for r in records {
            *headcount_gap_by_step.entry(r.step.clone()).or_insert(0) += r.headcount_gap;
            *counts.entry(r.step.as_str()).or_insert(0) += 1;
        }

        let avg_gap_by_step = chain
            .iter()
            .filter_map(|step| {
                let n = *counts.get(step.as_str())?;
                let total = *headcount_gap_by_step.get(step)?;
                Some((step.clone(), total as f64 / n as f64))
            })
            .collect();

        // 最大缺口: 缺口降序 (稳定排序)
        let mut ranked: Vec<&StaffingRecord> = records.iter().collect();
        ranked.sort_by(|a, b| b.headcount_gap.cmp(&a.headcount_gap));
        let top_20_gaps = ranked
            .into_iter()
            .take(TOP_GAPS_N)
            .map(|r| StaffingGap {
                timestamp: r.timestamp,
                step: r.step.clone(),
                headcount_used: r.headcount_used,
                recommended_headcount: r.recommended_headcount,
                headcount_gap: r.headcount_gap,
                labor_cost_impact: r.labor_cost_impact,
                utilization: r.utilization,
            })
            .collect();

        StaffingSummary {
            total_headcount_gap_hours: records.iter().map(|r| r.headcount_gap).sum(),
            total_positive_gap_hours: records
                .iter()
                .map(|r| r.headcount_gap)
                .filter(|g| *g > 0)
                .sum(),
            total_cost_impact: records.iter().map(|r| r.labor_cost_impact).sum(),
            headcount_gap_by_step,
            avg_gap_by_step,
            top_20_gaps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    const WAGE: f64 = 25.0;

    fn ts(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn metric(step: &str, hour: u32, demand: f64, backlog: f64, headcount: u64) -> HourlyMetricRecord {
        HourlyMetricRecord {
            timestamp: ts(hour),
            step: step.to_string(),
            demand_units: demand,
            capacity_units: 100.0,
            processed_units: demand,
            backlog_units: backlog,
            utilization: 0.9,
            cycle_time_min: 10.0,
            service_level_hourly: 1.0,
            throughput_loss_units: 0.0,
            labor_hours_used: headcount as f64,
            headcount_used: headcount,
        }
    }

    fn recommender(uph: f64) -> StaffingRecommender {
        let uph_by_step = [("receive".to_string(), uph), ("pick".to_string(), uph)]
            .into_iter()
            .collect();
        StaffingRecommender::new(0.95, uph_by_step, WAGE).unwrap()
    }

    #[test]
    fn test_single_hour_gap_of_one() {
        let analysis = recommender(10.0)
            .recommend(&[metric("receive", 0, 95.0, 0.0, 9)])
            .unwrap();
        let r = &analysis.records[0];

        assert!((r.required_capacity_units - 100.0).abs() < 1e-9);
        assert!((r.required_labor_hours - 10.0).abs() < 1e-5);
        assert_eq!(r.recommended_headcount, 10);
        assert_eq!(r.headcount_gap, 1);
        assert_eq!(r.labor_cost_impact, WAGE);
    }

    #[test]
    fn test_negative_gap_costs_nothing() {
        let analysis = recommender(10.0)
            .recommend(&[metric("receive", 0, 19.0, 0.0, 8)])
            .unwrap();
        let r = &analysis.records[0];
        assert!(r.headcount_gap < 0);
        assert_eq!(r.labor_cost_impact, 0.0);
        assert_eq!(analysis.summary.total_positive_gap_hours, 0);
        assert_eq!(analysis.summary.total_cost_impact, 0.0);
    }

    #[test]
    fn test_backlog_in_carries_from_previous_hour() {
        let rows = vec![
            metric("receive", 0, 95.0, 30.0, 9),
            metric("receive", 1, 0.0, 0.0, 0),
        ];
        let analysis = recommender(10.0).recommend(&rows).unwrap();
        assert_eq!(analysis.records[0].backlog_in, 0.0);
        assert_eq!(analysis.records[1].backlog_in, 30.0);
        assert_eq!(analysis.records[1].required_units, 30.0);
    }

    #[test]
    fn test_cost_sign_convention_across_table() {
        let rows: Vec<HourlyMetricRecord> = (0..24)
            .map(|h| metric(if h % 2 == 0 { "receive" } else { "pick" }, h, h as f64 * 7.0, 0.0, (h % 5) as u64))
            .collect();
        let recommender = recommender(12.0);
        let analysis = recommender.recommend(&rows).unwrap();

        for r in &analysis.records {
            if r.headcount_gap <= 0 {
                assert_eq!(r.labor_cost_impact, 0.0);
            } else {
                assert_eq!(r.labor_cost_impact, WAGE * r.headcount_gap as f64);
            }
        }

        let summary = &analysis.summary;
        assert_eq!(
            summary.headcount_gap_by_step.values().sum::<i64>(),
            summary.total_headcount_gap_hours
        );
        assert_eq!(summary.top_20_gaps.len(), TOP_GAPS_N);
        assert!(summary
            .top_20_gaps
            .windows(2)
            .all(|w| w[0].headcount_gap >= w[1].headcount_gap));
        assert!((summary.avg_gap_by_step["receive"] * 12.0 - summary.headcount_gap_by_step["receive"] as f64).abs() < 1e-9);
    }

    #[test]
    fn test_missing_uph_for_step_is_error() {
        let err = recommender(10.0)
            .recommend(&[metric("ship", 0, 10.0, 0.0, 1)])
            .unwrap_err();
        assert!(matches!(err, EngineError::MissingStepParameter { .. }));
    }

    #[test]
    fn test_invalid_target_rejected() {
        assert!(StaffingRecommender::new(0.0, BTreeMap::new(), 1.0).is_err());
        assert!(StaffingRecommender::new(1.01, BTreeMap::new(), 1.0).is_err());
        assert!(StaffingRecommender::new(1.0, BTreeMap::new(), 1.0).is_ok());
    }
}
