// ==========================================
// 履约中心产能规划系统 - KPI 汇总引擎
// ==========================================
// 职责: 从各阶段产物汇总关键指标
// 输入: 日×工序表 / 瓶颈表 / 人力表 / 日×全场表 (均可缺省)
// 输出: KpiReport (缺省的输入对应段落为空)
// ==========================================

use crate::domain::bottleneck::BottleneckRecord;
use crate::domain::kpi::{BottleneckKpis, KpiReport, SiteKpis, StaffingKpis, ThroughputKpis};
use crate::domain::metrics::{DailyStepMetricRecord, SiteDailyMetricRecord};
use crate::domain::staffing::StaffingRecord;
use std::collections::BTreeMap;
use tracing::instrument;

/// KPI 输入 (各表可缺省)
#[derive(Debug, Default, Clone, Copy)]
pub struct KpiInputs<'a> {
    pub daily_step: Option<&'a [DailyStepMetricRecord]>,
    pub bottlenecks: Option<&'a [BottleneckRecord]>,
    pub staffing: Option<&'a [StaffingRecord]>,
    pub site_daily: Option<&'a [SiteDailyMetricRecord]>,
}

pub struct KpiEngine;

impl KpiEngine {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip(self, inputs))]
    pub fn compute(&self, inputs: KpiInputs<'_>) -> KpiReport {
        KpiReport {
            run_id: None,
            generated_at: None,
            throughput: inputs.daily_step.map(throughput_kpis),
            bottleneck: inputs.bottlenecks.map(bottleneck_kpis),
            staffing: inputs.staffing.map(staffing_kpis),
            site: inputs.site_daily.map(site_kpis),
        }
    }
}

impl Default for KpiEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn throughput_kpis(daily: &[DailyStepMetricRecord]) -> ThroughputKpis {
    let mut utilization: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut cycle_time: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for r in daily {
        utilization.entry(r.step.clone()).or_default().push(r.utilization);
        cycle_time.entry(r.step.clone()).or_default().push(r.cycle_time_min);
    }

    ThroughputKpis {
        avg_utilization_by_step: utilization.iter().map(|(k, v)| (k.clone(), mean(v))).collect(),
        total_throughput_processed: daily.iter().map(|r| r.processed_units).sum(),
        total_throughput_loss: daily.iter().map(|r| r.throughput_loss_units).sum(),
        avg_cycle_time_by_step: cycle_time.iter().map(|(k, v)| (k.clone(), mean(v))).collect(),
        p90_cycle_time_by_step: cycle_time
            .iter()
            .map(|(k, v)| (k.clone(), quantile(v, 0.9)))
            .collect(),
    }
}

/// 瓶颈占比 (%): 各工序瓶颈记录数 / 瓶颈记录总数
fn bottleneck_kpis(records: &[BottleneckRecord]) -> BottleneckKpis {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for r in records.iter().filter(|r| r.is_bottleneck) {
        *counts.entry(r.step.clone()).or_insert(0) += 1;
    }
    let total: usize = counts.values().sum();

    let bottleneck_share_by_step = if total == 0 {
        BTreeMap::new()
    } else {
        counts
            .into_iter()
            .map(|(step, n)| (step, n as f64 / total as f64 * 100.0))
            .collect()
    };

    BottleneckKpis {
        bottleneck_share_by_step,
    }
}

fn staffing_kpis(records: &[StaffingRecord]) -> StaffingKpis {
    let positive = records.iter().filter(|r| r.headcount_gap > 0);
    StaffingKpis {
        extra_headcount_hours_needed: positive.clone().map(|r| r.headcount_gap).sum(),
        estimated_cost_to_hit_target: positive.map(|r| r.labor_cost_impact).sum(),
    }
}

fn site_kpis(site: &[SiteDailyMetricRecord]) -> SiteKpis {
    let utilization: Vec<f64> = site.iter().map(|r| r.utilization).collect();
    let service: Vec<f64> = site.iter().map(|r| r.service_level_hourly).collect();
    SiteKpis {
        overall_avg_utilization: mean(&utilization),
        overall_avg_service_level: mean(&service),
        total_days: site.len(),
    }
}

/// 算术平均 (空序列为 0)
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// 分位数 (线性插值, 空序列为 0)
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::MetricValues;
    use chrono::NaiveDate;

    fn daily(step: &str, day: u32, utilization: f64, cycle: f64, processed: f64) -> DailyStepMetricRecord {
        DailyStepMetricRecord::from_values(
            NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            step.to_string(),
            MetricValues {
                utilization,
                cycle_time_min: cycle,
                processed_units: processed,
                throughput_loss_units: 1.0,
                ..MetricValues::default()
            },
        )
    }

    #[test]
    fn test_quantile_linear_interpolation() {
        assert_eq!(quantile(&[], 0.9), 0.0);
        assert_eq!(quantile(&[5.0], 0.9), 5.0);
        // pos = 0.9 * 9 = 8.1 → 9 + 0.1 * (10 - 9)
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        assert!((quantile(&values, 0.9) - 9.1).abs() < 1e-12);
    }

    #[test]
    fn test_throughput_section() {
        let rows = vec![
            daily("pick", 1, 0.8, 10.0, 100.0),
            daily("pick", 2, 0.6, 20.0, 50.0),
            daily("pack", 1, 0.5, 5.0, 10.0),
        ];
        let report = KpiEngine::new().compute(KpiInputs {
            daily_step: Some(&rows),
            ..KpiInputs::default()
        });

        let throughput = report.throughput.unwrap();
        assert!((throughput.avg_utilization_by_step["pick"] - 0.7).abs() < 1e-12);
        assert_eq!(throughput.total_throughput_processed, 160.0);
        assert_eq!(throughput.total_throughput_loss, 3.0);
        assert!((throughput.p90_cycle_time_by_step["pick"] - 19.0).abs() < 1e-12);
        assert!(report.bottleneck.is_none());
        assert!(report.site.is_none());
    }

    #[test]
    fn test_sections_absent_without_inputs() {
        let report = KpiEngine::new().compute(KpiInputs::default());
        assert_eq!(report, KpiReport::default());
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_site_and_empty_bottleneck_sections() {
        let site = vec![SiteDailyMetricRecord::from_values(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            MetricValues {
                utilization: 0.9,
                service_level_hourly: 0.8,
                ..MetricValues::default()
            },
        )];
        let report = KpiEngine::new().compute(KpiInputs {
            site_daily: Some(&site),
            bottlenecks: Some(&[]),
            ..KpiInputs::default()
        });

        let site_kpis = report.site.unwrap();
        assert_eq!(site_kpis.total_days, 1);
        assert_eq!(site_kpis.overall_avg_utilization, 0.9);
        assert!(report.bottleneck.unwrap().bottleneck_share_by_step.is_empty());
    }
}
