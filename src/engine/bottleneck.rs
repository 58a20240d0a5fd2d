// ==========================================
// 履约中心产能规划系统 - 瓶颈识别引擎
// ==========================================
// 职责: 标记瓶颈记录 + 选出每小时唯一瓶颈工序
// 输入: 小时 × 工序 指标表 + 利用率阈值
// 输出: BottleneckAnalysis (标记表 + 汇总)
// ==========================================
// 瓶颈判定:
//   is_bottleneck = utilization >= threshold
//                   AND (backlog_change > 0 OR throughput_loss > 0)
// 每小时瓶颈工序:
//   1. 有工序利用率达阈值 → 利用率最大者
//   2. 否则有工序吞吐损失 > 0 → 损失最大者
//   3. 否则无
//   并列时取工序链中靠前者
// ==========================================

use crate::domain::bottleneck::{
    BottleneckAnalysis, BottleneckRecord, BottleneckSummary, StepCount, WorstHour,
};
use crate::domain::metrics::HourlyMetricRecord;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::metrics::group_by_step;
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, HashMap};
use tracing::instrument;

/// 默认利用率阈值
pub const DEFAULT_BOTTLENECK_THRESHOLD: f64 = 0.95;

/// 最差小时列表长度
pub const WORST_HOURS_TOP_N: usize = 10;

pub struct BottleneckDetector {
    threshold_util: f64,
}

impl BottleneckDetector {
    /// 创建瓶颈识别引擎
    ///
    /// # 参数
    /// - threshold_util: 利用率阈值, [0, 1]
    pub fn new(threshold_util: f64) -> EngineResult<Self> {
        if !(0.0..=1.0).contains(&threshold_util) {
            return Err(EngineError::invalid(
                "bottleneck_threshold_util",
                format!("{} 不在 [0, 1] 内", threshold_util),
            ));
        }
        Ok(Self { threshold_util })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold_util
    }

    /// 识别瓶颈
    ///
    /// 输出记录按 (工序链顺序, timestamp) 排列
    #[instrument(skip(self, hourly), fields(rows = hourly.len(), threshold = self.threshold_util))]
    pub fn detect(&self, hourly: &[HourlyMetricRecord]) -> BottleneckAnalysis {
        let (chain, groups) = group_by_step(hourly, |r| r.step.as_str());

        // 1. 记录级标记 (backlog_change 按工序差分)
        let mut records: Vec<BottleneckRecord> = Vec::with_capacity(hourly.len());
        for mut group in groups {
            group.sort_by_key(|r| r.timestamp);

            let mut previous_backlog: Option<f64> = None;
            for r in group {
                let backlog_change = previous_backlog.map_or(0.0, |prev| r.backlog_units - prev);
                previous_backlog = Some(r.backlog_units);

                records.push(BottleneckRecord {
                    timestamp: r.timestamp,
                    step: r.step.clone(),
                    demand_units: r.demand_units,
                    capacity_units: r.capacity_units,
                    processed_units: r.processed_units,
                    backlog_units: r.backlog_units,
                    utilization: r.utilization,
                    service_level_hourly: r.service_level_hourly,
                    throughput_loss_units: r.throughput_loss_units,
                    backlog_change,
                    is_bottleneck: self.is_bottleneck(
                        r.utilization,
                        backlog_change,
                        r.throughput_loss_units,
                    ),
                    bottleneck_step: None,
                });
            }
        }

        // 2. 每小时瓶颈工序
        let hour_steps = self.select_hourly_steps(&records, |step| chain.index_of(step));
        for record in records.iter_mut() {
            record.bottleneck_step = hour_steps.get(&record.timestamp).cloned().flatten();
        }

        let summary = summarize(&records, chain.names());

        tracing::info!(
            bottleneck_hours = summary.total_bottleneck_hours,
            hours = hour_steps.len(),
            "瓶颈识别完成"
        );

        BottleneckAnalysis { records, summary }
    }

    /// 记录级瓶颈判定
    pub fn is_bottleneck(&self, utilization: f64, backlog_change: f64, throughput_loss: f64) -> bool {
        utilization >= self.threshold_util && (backlog_change > 0.0 || throughput_loss > 0.0)
    }

    fn select_hourly_steps<F>(
        &self,
        records: &[BottleneckRecord],
        chain_index: F,
    ) -> HashMap<NaiveDateTime, Option<String>>
    where
        F: Fn(&str) -> usize,
    {
        // 每小时候选按链路顺序排列
        let mut by_hour: BTreeMap<NaiveDateTime, Vec<&BottleneckRecord>> = BTreeMap::new();
        for r in records {
            by_hour.entry(r.timestamp).or_default().push(r);
        }

        by_hour
            .into_iter()
            .map(|(ts, mut candidates)| {
                candidates.sort_by_key(|r| chain_index(&r.step));
                (ts, self.select_step(&candidates))
            })
            .collect()
    }

    /// 在同一小时的候选中选出瓶颈工序 (候选须按链路顺序排列)
    fn select_step(&self, candidates: &[&BottleneckRecord]) -> Option<String> {
        let max_util = first_max_by(candidates, |r| r.utilization)?;
        if max_util.utilization >= self.threshold_util {
            return Some(max_util.step.clone());
        }

        let max_loss = first_max_by(candidates, |r| r.throughput_loss_units)?;
        if max_loss.throughput_loss_units > 0.0 {
            return Some(max_loss.step.clone());
        }

        None
    }
}

/// 取最大值,并列时保留最先出现者
fn first_max_by<'a, F>(candidates: &[&'a BottleneckRecord], value: F) -> Option<&'a BottleneckRecord>
where
    F: Fn(&BottleneckRecord) -> f64,
{
    let mut best: Option<&'a BottleneckRecord> = None;
    for &c in candidates {
        match best {
            Some(b) if value(c) <= value(b) => {}
            _ => best = Some(c),
        }
    }
    best
}

fn summarize(records: &[BottleneckRecord], chain: &[String]) -> BottleneckSummary {
    let flagged: Vec<&BottleneckRecord> = records.iter().filter(|r| r.is_bottleneck).collect();

    let mut bottleneck_hours_by_step: BTreeMap<String, usize> = BTreeMap::new();
    for r in &flagged {
        *bottleneck_hours_by_step.entry(r.step.clone()).or_insert(0) += 1;
    }

    // 分布: 计数降序,并列按链路顺序
    let mut distribution: Vec<StepCount> = chain
        .iter()
        .filter_map(|step| {
            bottleneck_hours_by_step.get(step).map(|&count| StepCount {
                step: step.clone(),
                count,
            })
        })
        .collect();
    distribution.sort_by(|a, b| b.count.cmp(&a.count));

    // 最差小时: 吞吐损失降序 (稳定排序)
    let mut ranked: Vec<&BottleneckRecord> = records.iter().collect();
    ranked.sort_by(|a, b| b.throughput_loss_units.total_cmp(&a.throughput_loss_units));
    let top_10_worst_hours = ranked
        .into_iter()
        .take(WORST_HOURS_TOP_N)
        .map(|r| WorstHour {
            timestamp: r.timestamp,
            step: r.step.clone(),
            utilization: r.utilization,
            throughput_loss_units: r.throughput_loss_units,
            backlog_units: r.backlog_units,
        })
        .collect();

    BottleneckSummary {
        total_bottleneck_hours: flagged.len(),
        bottleneck_hours_by_step,
        top_10_worst_hours,
        bottleneck_step_distribution: distribution,
    }
}
