// ==========================================
// 履约中心产能规划系统 - 工序仿真引擎
// ==========================================
// 职责: 单工序逐小时积压结转仿真
// 输入: 小时需求序列 + 工序参数
// 输出: 每小时一条 HourlyStepRecord
// ==========================================
// 红线: 积压递推严格按时间戳升序折叠,不可跨小时并行
// 红线: 抽样顺序固定: 工序需求噪声 → 产能噪声 → 停机判定
// ==========================================

use crate::config::PlannerConfig;
use crate::domain::record::{HourlyDemand, HourlyStepRecord};
use crate::domain::types::{clamp_ratio, EPSILON};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::random::{step_seed, SeededStream};
use tracing::instrument;

/// 下游工序需求噪声变异系数
pub const STEP_DEMAND_NOISE_CV: f64 = 0.05;

/// 每级滞后的需求折减
pub const LAG_REDUCTION_PER_LEVEL: f64 = 0.05;

/// 滞后级数上限
pub const MAX_LAG: usize = 3;

/// 拥堵开始生效的利用率
pub const CONGESTION_KNEE: f64 = 0.7;

// ==========================================
// StepParameters - 工序仿真参数
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct StepParameters {
    pub step: String,
    pub position: usize, // 链路位置 (0 = 首工序)
    pub capacity_base: f64,
    pub variability_std: f64,
    pub downtime_probability: f64,
    pub downtime_severity: f64,
    pub uph: f64,
    pub cycle_time_base_min: f64,
    pub congestion_multiplier_max: f64,
    pub seed: u64,
}

impl StepParameters {
    /// 从规划配置提取某工序的参数
    ///
    /// 种子 = random_state + 工序名偏移
    pub fn from_config(config: &PlannerConfig, step: &str) -> EngineResult<Self> {
        let position = config
            .step_position(step)
            .ok_or_else(|| EngineError::invalid("step", format!("工序 {} 不在 steps 中", step)))?;

        let capacity_base = *config
            .capacity
            .step_capacity_base
            .get(step)
            .ok_or_else(|| EngineError::missing(step, "step_capacity_base"))?;
        let uph = *config
            .uph_by_step
            .get(step)
            .ok_or_else(|| EngineError::missing(step, "uph"))?;
        let cycle_time_base_min = *config
            .cycle_time
            .base_min
            .get(step)
            .ok_or_else(|| EngineError::missing(step, "cycle_time_base_min"))?;

        Ok(Self {
            step: step.to_string(),
            position,
            capacity_base,
            variability_std: config.capacity.variability_std,
            downtime_probability: config.capacity.downtime_probability,
            downtime_severity: config.capacity.downtime_severity,
            uph,
            cycle_time_base_min,
            congestion_multiplier_max: config.cycle_time.congestion_multiplier_max,
            seed: step_seed(config.random_state, step),
        })
    }

    /// 下游需求折减系数: 1 − 0.05 × min(position, 3)
    pub fn lag_factor(&self) -> f64 {
        let lag = self.position.min(MAX_LAG);
        1.0 - LAG_REDUCTION_PER_LEVEL * lag as f64
    }

    fn validate(&self) -> EngineResult<()> {
        if !(0.0..=1.0).contains(&self.downtime_probability) {
            return Err(EngineError::invalid(
                "downtime_probability",
                format!("{} 不在 [0, 1] 内", self.downtime_probability),
            ));
        }
        if !(0.0..=1.0).contains(&self.downtime_severity) {
            return Err(EngineError::invalid(
                "downtime_severity",
                format!("{} 不在 [0, 1] 内", self.downtime_severity),
            ));
        }
        if self.congestion_multiplier_max < 1.0 {
            return Err(EngineError::invalid(
                "congestion_multiplier_max",
                format!("{} < 1", self.congestion_multiplier_max),
            ));
        }
        Ok(())
    }
}

// ==========================================
// 积压结转递推 (纯函数)
// ==========================================

/// 单小时结转结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacklogStep {
    pub total_demand: f64,
    pub processed: f64,
    pub backlog_out: f64,
}

/// 推进一小时
///
/// ```text
/// total_demand = demand + backlog_in
/// processed    = min(total_demand, capacity)
/// backlog_out  = max(0, total_demand − processed)
/// ```
pub fn advance_backlog(backlog_in: f64, demand: f64, capacity: f64) -> BacklogStep {
    let total_demand = demand + backlog_in;
    let processed = total_demand.min(capacity);
    BacklogStep {
        total_demand,
        processed,
        backlog_out: (total_demand - processed).max(0.0),
    }
}

/// 利用率 = clamp(processed / (capacity + ε), 0, 1)
pub fn utilization(processed: f64, capacity: f64) -> f64 {
    clamp_ratio(processed / (capacity + EPSILON))
}

/// 拥堵系数: 利用率超过 0.7 后线性上升,截断到 [1, max]
pub fn congestion_factor(utilization: f64, multiplier_max: f64) -> f64 {
    let raw = 1.0 + (utilization - CONGESTION_KNEE) * (multiplier_max - 1.0) / (1.0 - CONGESTION_KNEE);
    raw.clamp(1.0, multiplier_max.max(1.0))
}

// ==========================================
// StepSimulator - 工序仿真引擎
// ==========================================
pub struct StepSimulator;

impl StepSimulator {
    pub fn new() -> Self {
        Self
    }

    /// 仿真单个工序
    ///
    /// # 参数
    /// - `demand`: 按时间戳升序的小时需求
    /// - `params`: 工序参数 (含独立种子)
    ///
    /// # 返回
    /// 与 `demand` 等长的小时记录,首小时 backlog_in = 0
    #[instrument(skip(self, demand, params), fields(step = %params.step, hours = demand.len()))]
    pub fn simulate(
        &self,
        demand: &[HourlyDemand],
        params: &StepParameters,
    ) -> EngineResult<Vec<HourlyStepRecord>> {
        params.validate()?;

        if demand.is_empty() {
            return Ok(Vec::new());
        }

        let mut stream = SeededStream::new(params.seed);

        // 1. 工序需求
        let step_demand = Self::derive_step_demand(demand, params, &mut stream);

        // 2. 产能 (噪声 → 停机)
        let capacity = Self::derive_capacity(&step_demand, params, &mut stream);

        // 3. 积压递推 (显式有序折叠)
        let records = step_demand
            .iter()
            .zip(capacity.iter())
            .zip(demand.iter())
            .scan(0.0_f64, |backlog, ((&step_units, &cap), hour)| {
                let flow = advance_backlog(*backlog, step_units, cap);
                *backlog = flow.backlog_out;
                Some(Self::build_record(hour, step_units, cap, flow, params))
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            step = %params.step,
            final_backlog = records.last().map(|r| r.backlog_units).unwrap_or(0.0),
            "工序仿真完成"
        );

        Ok(records)
    }

    fn derive_step_demand(
        demand: &[HourlyDemand],
        params: &StepParameters,
        stream: &mut SeededStream,
    ) -> Vec<f64> {
        if params.position == 0 {
            return demand.iter().map(|d| d.demand_units).collect();
        }

        let factor = params.lag_factor();
        demand
            .iter()
            .map(|d| {
                let reduced = d.demand_units * factor;
                let noise = stream.normal(0.0, STEP_DEMAND_NOISE_CV);
                (reduced * (1.0 + noise)).max(0.0)
            })
            .collect()
    }

    fn derive_capacity(
        step_demand: &[f64],
        params: &StepParameters,
        stream: &mut SeededStream,
    ) -> Vec<f64> {
        let mean_demand = step_demand.iter().sum::<f64>() / step_demand.len() as f64;
        let base_capacity = mean_demand * params.capacity_base;

        let mut capacity: Vec<f64> = step_demand
            .iter()
            .map(|_| base_capacity * (1.0 + stream.normal(0.0, params.variability_std)))
            .collect();

        for cap in capacity.iter_mut() {
            if stream.uniform() < params.downtime_probability {
                *cap *= 1.0 - params.downtime_severity;
            }
            *cap = cap.max(0.0);
        }

        capacity
    }

    fn build_record(
        hour: &HourlyDemand,
        step_units: f64,
        capacity: f64,
        flow: BacklogStep,
        params: &StepParameters,
    ) -> HourlyStepRecord {
        let util = utilization(flow.processed, capacity);
        let labor_hours = flow.processed / (params.uph + EPSILON);

        HourlyStepRecord {
            timestamp: hour.timestamp,
            step: params.step.clone(),
            demand_units: step_units,
            capacity_units: capacity,
            processed_units: flow.processed,
            backlog_units: flow.backlog_out,
            utilization: util,
            cycle_time_min: params.cycle_time_base_min
                * congestion_factor(util, params.congestion_multiplier_max),
            uph: params.uph,
            labor_hours_used: labor_hours,
            headcount_used: labor_hours.ceil().max(0.0) as u32,
        }
    }
}

impl Default for StepSimulator {
    fn default() -> Self {
        Self::new()
    }
}
