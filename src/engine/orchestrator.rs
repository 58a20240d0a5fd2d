// ==========================================
// 履约中心产能规划系统 - 仿真编排器
// ==========================================
// 职责: 需求生成 → 各工序仿真 → 拼接排序
// 输出: 按 (timestamp, 链路位置) 排序的小时工序表
// ==========================================
// 红线: 串行与并行两条路径输出逐位一致
// 红线: 工序之间无共享可变状态,各自持有独立种子流
// ==========================================

use crate::config::PlannerConfig;
use crate::domain::record::{HourlyDemand, HourlyStepRecord};
use crate::engine::demand::DemandGenerator;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::simulator::{StepParameters, StepSimulator};
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{info, instrument};

// ==========================================
// SimulationOrchestrator - 仿真编排器
// ==========================================
pub struct SimulationOrchestrator {
    config: Arc<PlannerConfig>,
    demand_generator: DemandGenerator,
    simulator: StepSimulator,
}

impl SimulationOrchestrator {
    /// 创建编排器
    ///
    /// # 参数
    /// - config: 已校验的规划配置
    pub fn new(config: Arc<PlannerConfig>) -> Self {
        Self {
            config,
            demand_generator: DemandGenerator::new(),
            simulator: StepSimulator::new(),
        }
    }

    /// 串行执行全部工序
    #[instrument(skip(self), fields(steps = self.config.steps.len(), days = self.config.num_days))]
    pub fn run(&self) -> EngineResult<Vec<HourlyStepRecord>> {
        let demand = self.generate_demand()?;
        let params = self.step_parameters()?;

        let mut tables = Vec::with_capacity(params.len());
        for p in &params {
            tables.push(self.simulator.simulate(&demand, p)?);
        }

        Ok(self.merge(tables))
    }

    /// 并行执行全部工序 (每工序一个阻塞任务)
    #[instrument(skip(self), fields(steps = self.config.steps.len(), days = self.config.num_days))]
    pub async fn run_parallel(&self) -> EngineResult<Vec<HourlyStepRecord>> {
        let demand = Arc::new(self.generate_demand()?);
        let params = self.step_parameters()?;

        let tasks = params.into_iter().map(|p| {
            let demand = Arc::clone(&demand);
            async move {
                tokio::task::spawn_blocking(move || StepSimulator::new().simulate(&demand, &p))
                    .await
                    .map_err(|e| EngineError::TaskFailed(e.to_string()))?
            }
        });

        // try_join_all 保持输入顺序
        let tables = try_join_all(tasks).await?;

        Ok(self.merge(tables))
    }

    fn generate_demand(&self) -> EngineResult<Vec<HourlyDemand>> {
        self.demand_generator.generate(
            &self.config.demand,
            self.config.start_date,
            self.config.num_days,
            self.config.random_state,
        )
    }

    fn step_parameters(&self) -> EngineResult<Vec<StepParameters>> {
        self.config
            .steps
            .iter()
            .map(|step| StepParameters::from_config(&self.config, step))
            .collect()
    }

    /// 拼接各工序表,按 (timestamp, 链路位置) 稳定排序
    fn merge(&self, tables: Vec<Vec<HourlyStepRecord>>) -> Vec<HourlyStepRecord> {
        let mut merged: Vec<(usize, HourlyStepRecord)> = tables
            .into_iter()
            .enumerate()
            .flat_map(|(position, table)| table.into_iter().map(move |r| (position, r)))
            .collect();

        merged.sort_by(|(pa, a), (pb, b)| a.timestamp.cmp(&b.timestamp).then(pa.cmp(pb)));

        info!(rows = merged.len(), "仿真表拼接完成");

        merged.into_iter().map(|(_, r)| r).collect()
    }
}
