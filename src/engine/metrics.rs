// ==========================================
// 履约中心产能规划系统 - 指标聚合引擎
// ==========================================
// 职责: 重算利用率/服务水平/吞吐损失,并汇总三种粒度
// 输入: 小时工序表 (仿真产出或外部提供)
// 输出: 重算表 + MetricTables
// ==========================================
// 红线: 只依赖已落地的表,不依赖仿真随机抽样
// 红线: backlog_in 口径与仿真一致 (同工序上一小时积压,首小时 0)
// 红线: 纯变换,输入表不被修改
// ==========================================

use crate::domain::metrics::{
    DailyStepMetricRecord, HourlyMetricRecord, MetricTables, MetricValues, RecomputedStepRecord,
    SiteDailyMetricRecord,
};
use crate::domain::record::HourlyStepRecord;
use crate::domain::types::{clamp_ratio, EPSILON};
use crate::engine::simulator::utilization;
use std::collections::BTreeMap;
use tracing::instrument;

// ==========================================
// 工序链顺序 (首次出现顺序)
// ==========================================
pub(crate) struct StepChain {
    names: Vec<String>,
}

impl StepChain {
    pub(crate) fn from_steps<'a>(steps: impl IntoIterator<Item = &'a str>) -> Self {
        let mut names: Vec<String> = Vec::new();
        for step in steps {
            if !names.iter().any(|n| n == step) {
                names.push(step.to_string());
            }
        }
        Self { names }
    }

    pub(crate) fn index_of(&self, step: &str) -> usize {
        self.names
            .iter()
            .position(|n| n == step)
            .unwrap_or(self.names.len())
    }

    pub(crate) fn name(&self, index: usize) -> &str {
        self.names.get(index).map(String::as_str).unwrap_or("")
    }

    pub(crate) fn names(&self) -> &[String] {
        &self.names
    }
}

/// 将表按工序分组,组内按时间戳稳定排序
///
/// 分组顺序为工序首次出现顺序
pub(crate) fn group_by_step<T, F>(rows: &[T], step_of: F) -> (StepChain, Vec<Vec<&T>>)
where
    F: Fn(&T) -> &str,
{
    let chain = StepChain::from_steps(rows.iter().map(&step_of));
    let mut groups: Vec<Vec<&T>> = vec![Vec::new(); chain.names().len()];
    for row in rows {
        groups[chain.index_of(step_of(row))].push(row);
    }
    (chain, groups)
}

// ==========================================
// 聚合累加器
// ==========================================
#[derive(Default)]
struct MetricAccumulator {
    count: usize,
    demand_units: f64,
    capacity_units: f64,
    processed_units: f64,
    throughput_loss_units: f64,
    labor_hours_used: f64,
    headcount_used: u64,
    backlog_sum: f64,
    utilization_sum: f64,
    cycle_time_sum: f64,
    service_level_sum: f64,
}

impl MetricAccumulator {
    fn push(&mut self, r: &RecomputedStepRecord) {
        self.count += 1;
        // 流量类: 求和
        self.demand_units += r.demand_units;
        self.capacity_units += r.capacity_units;
        self.processed_units += r.processed_units;
        self.throughput_loss_units += r.throughput_loss_units;
        self.labor_hours_used += r.labor_hours_used;
        self.headcount_used += r.headcount_used;
        // 水平类: 求均值
        self.backlog_sum += r.backlog_units;
        self.utilization_sum += r.utilization;
        self.cycle_time_sum += r.cycle_time_min;
        self.service_level_sum += r.service_level_hourly;
    }

    fn finish(&self) -> MetricValues {
        let n = self.count.max(1) as f64;
        MetricValues {
            demand_units: self.demand_units,
            capacity_units: self.capacity_units,
            processed_units: self.processed_units,
            backlog_units: self.backlog_sum / n,
            utilization: self.utilization_sum / n,
            cycle_time_min: self.cycle_time_sum / n,
            service_level_hourly: self.service_level_sum / n,
            throughput_loss_units: self.throughput_loss_units,
            labor_hours_used: self.labor_hours_used,
            headcount_used: self.headcount_used,
        }
    }
}

fn roll_up<K, F>(rows: &[RecomputedStepRecord], key_of: F) -> BTreeMap<K, MetricValues>
where
    K: Ord,
    F: Fn(&RecomputedStepRecord) -> K,
{
    let mut groups: BTreeMap<K, MetricAccumulator> = BTreeMap::new();
    for row in rows {
        groups.entry(key_of(row)).or_default().push(row);
    }
    groups.into_iter().map(|(k, acc)| (k, acc.finish())).collect()
}

// ==========================================
// MetricsAggregator - 指标聚合引擎
// ==========================================
pub struct MetricsAggregator;

impl MetricsAggregator {
    pub fn new() -> Self {
        Self
    }

    /// 重算小时工序指标
    ///
    /// 输出按 (工序链顺序, timestamp) 排列;
    /// 输入中的 utilization 列一律忽略,以 processed / capacity 为准
    #[instrument(skip(self, records), fields(rows = records.len()))]
    pub fn recompute(&self, records: &[HourlyStepRecord]) -> Vec<RecomputedStepRecord> {
        let (_, groups) = group_by_step(records, |r| r.step.as_str());

        let mut out = Vec::with_capacity(records.len());
        for mut group in groups {
            group.sort_by_key(|r| r.timestamp);

            let mut backlog_in = 0.0;
            for r in group {
                let total_demand = r.demand_units + backlog_in;
                out.push(RecomputedStepRecord {
                    timestamp: r.timestamp,
                    step: r.step.clone(),
                    demand_units: r.demand_units,
                    capacity_units: r.capacity_units,
                    processed_units: r.processed_units,
                    backlog_units: r.backlog_units,
                    utilization: utilization(r.processed_units, r.capacity_units),
                    cycle_time_min: r.cycle_time_min,
                    labor_hours_used: r.labor_hours_used,
                    headcount_used: u64::from(r.headcount_used),
                    backlog_in,
                    total_demand,
                    service_level_hourly: clamp_ratio(
                        r.processed_units / (total_demand + EPSILON),
                    ),
                    throughput_loss_units: (total_demand - r.processed_units).max(0.0),
                });
                backlog_in = r.backlog_units;
            }
        }
        out
    }

    /// 三种粒度汇总
    ///
    /// - hourly: (timestamp, step)
    /// - daily_step: (date, step)
    /// - site_daily: date
    ///
    /// 同一时间键下工序按链路顺序排列
    #[instrument(skip(self, recomputed), fields(rows = recomputed.len()))]
    pub fn aggregate(&self, recomputed: &[RecomputedStepRecord]) -> MetricTables {
        let chain = StepChain::from_steps(recomputed.iter().map(|r| r.step.as_str()));

        let hourly = roll_up(recomputed, |r| (r.timestamp, chain.index_of(&r.step)))
            .into_iter()
            .map(|((ts, idx), v)| HourlyMetricRecord::from_values(ts, chain.name(idx).to_string(), v))
            .collect::<Vec<_>>();

        let daily_step = roll_up(recomputed, |r| (r.timestamp.date(), chain.index_of(&r.step)))
            .into_iter()
            .map(|((date, idx), v)| {
                DailyStepMetricRecord::from_values(date, chain.name(idx).to_string(), v)
            })
            .collect::<Vec<_>>();

        let site_daily = roll_up(recomputed, |r| r.timestamp.date())
            .into_iter()
            .map(|(date, v)| SiteDailyMetricRecord::from_values(date, v))
            .collect::<Vec<_>>();

        tracing::info!(
            hourly = hourly.len(),
            daily_step = daily_step.len(),
            site_daily = site_daily.len(),
            "指标汇总完成"
        );

        MetricTables {
            hourly,
            daily_step,
            site_daily,
        }
    }

    /// 重算 + 汇总
    pub fn analyze(&self, records: &[HourlyStepRecord]) -> MetricTables {
        let recomputed = self.recompute(records);
        self.aggregate(&recomputed)
    }
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new()
    }
}
