// ==========================================
// 阶段耗时统计
// ==========================================
// 输出: target = "perf" 的 info 日志 (stage, elapsed_ms, rows)
// ==========================================

use crate::domain::types::PipelineStage;
use std::time::Instant;

/// 阶段耗时 Guard：Drop 时记录 elapsed_ms + 产出行数
///
/// 使用方式：
/// ```ignore
/// let mut timer = fc_capacity_planner::perf::StageTimer::new(PipelineStage::Analyze);
/// // do work...
/// timer.set_rows(tables.hourly.len());
/// ```
pub struct StageTimer {
    stage: PipelineStage,
    start: Instant,
    rows: usize,
}

impl StageTimer {
    pub fn new(stage: PipelineStage) -> Self {
        Self {
            stage,
            start: Instant::now(),
            rows: 0,
        }
    }

    /// 记录本阶段产出行数
    pub fn set_rows(&mut self, rows: usize) {
        self.rows = rows;
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Drop for StageTimer {
    fn drop(&mut self) {
        tracing::info!(
            target: "perf",
            stage = %self.stage,
            elapsed_ms = self.elapsed_ms(),
            rows = self.rows,
            "done"
        );
    }
}
