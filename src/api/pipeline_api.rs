// ==========================================
// 履约中心产能规划系统 - 流水线 API
// ==========================================
// 职责: 每个流水线阶段一个操作,串联 导入 → 引擎 → 产物
// 阶段: generate → preprocess → analyze → {bottlenecks, recommend} → report
// ==========================================
// 红线: 输入校验先于任何写出,失败时不产出部分产物
// 红线: 瓶颈识别与人力建议各自读取同一张小时指标表
// ==========================================

use crate::api::error::ApiResult;
use crate::config::PlannerConfig;
use crate::domain::bottleneck::BottleneckRecord;
use crate::domain::kpi::KpiReport;
use crate::domain::metrics::{DailyStepMetricRecord, SiteDailyMetricRecord};
use crate::domain::record::{HourlyStepRecord, PreparedStepRecord};
use crate::domain::staffing::StaffingRecord;
use crate::domain::types::PipelineStage;
use crate::engine::{
    BottleneckDetector, KpiEngine, KpiInputs, MetricsAggregator, SimulationOrchestrator,
    StaffingRecommender,
};
use crate::importer::TableImporter;
use crate::perf::StageTimer;
use crate::repository::{ArtifactKind, ArtifactRepository};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

// ==========================================
// 阶段报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: PipelineStage,
    pub rows: usize,
    pub artifacts: Vec<PathBuf>,
    pub elapsed_ms: u64,
}

/// 全流程报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub run_id: String,
    pub stages: Vec<StageReport>,
    pub kpis: KpiReport,
}

// ==========================================
// PipelineApi - 流水线 API
// ==========================================
pub struct PipelineApi {
    config: Arc<PlannerConfig>,
    repo: ArtifactRepository,
    importer: TableImporter,
    run_id: String,
}

impl PipelineApi {
    /// 创建流水线 API
    ///
    /// # 参数
    /// - config: 规划配置 (此处再次执行语义校验)
    /// - root: 产物根目录
    pub fn new<P: Into<PathBuf>>(config: PlannerConfig, root: P) -> ApiResult<Self> {
        config.validate()?;

        let repo = ArtifactRepository::from_config(root, &config);
        let run_id = Uuid::new_v4().to_string();
        info!(run_id = %run_id, root = %repo.root().display(), "流水线初始化");

        Ok(Self {
            config: Arc::new(config),
            repo,
            importer: TableImporter::new(),
            run_id,
        })
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn repository(&self) -> &ArtifactRepository {
        &self.repo
    }

    // ==========================================
    // 阶段 1: 合成数据生成
    // ==========================================
    #[instrument(skip(self), fields(run_id = %self.run_id))]
    pub fn generate(&self) -> ApiResult<StageReport> {
        let timer = StageTimer::new(PipelineStage::Generate);
        let records = SimulationOrchestrator::new(Arc::clone(&self.config)).run()?;
        self.write_generated(timer, &records)
    }

    /// 并行生成 (各工序独立任务)
    #[instrument(skip(self), fields(run_id = %self.run_id))]
    pub async fn generate_parallel(&self) -> ApiResult<StageReport> {
        let timer = StageTimer::new(PipelineStage::Generate);
        let records = SimulationOrchestrator::new(Arc::clone(&self.config))
            .run_parallel()
            .await?;
        self.write_generated(timer, &records)
    }

    fn write_generated(&self, mut timer: StageTimer, records: &[HourlyStepRecord]) -> ApiResult<StageReport> {
        let path = self.repo.write_table(ArtifactKind::RawTable, records)?;
        timer.set_rows(records.len());
        Ok(stage_report(&timer, PipelineStage::Generate, records.len(), vec![path]))
    }

    // ==========================================
    // 阶段 2: 预处理 (校验 + 日历特征)
    // ==========================================
    #[instrument(skip(self), fields(run_id = %self.run_id))]
    pub fn preprocess(&self) -> ApiResult<StageReport> {
        self.preprocess_from(self.repo.path_of(ArtifactKind::RawTable))
    }

    /// 以外部小时工序表 (CSV / XLSX) 代替生成产物进行预处理
    #[instrument(skip(self, input), fields(run_id = %self.run_id, input = %input.as_ref().display()))]
    pub fn preprocess_from<P: AsRef<Path>>(&self, input: P) -> ApiResult<StageReport> {
        let mut timer = StageTimer::new(PipelineStage::Preprocess);

        let raw = self
            .importer
            .import_step_table(input.as_ref(), ArtifactKind::RawTable.producer())?;
        let prepared: Vec<PreparedStepRecord> = raw.iter().map(PreparedStepRecord::from).collect();

        if let (Some(first), Some(last)) = (
            prepared.iter().map(|r| r.timestamp).min(),
            prepared.iter().map(|r| r.timestamp).max(),
        ) {
            info!(from = %first, to = %last, rows = prepared.len(), "预处理时间范围");
        }

        let path = self.repo.write_table(ArtifactKind::ProcessedTable, &prepared)?;
        timer.set_rows(prepared.len());
        Ok(stage_report(&timer, PipelineStage::Preprocess, prepared.len(), vec![path]))
    }

    // ==========================================
    // 阶段 3: 指标重算 + 多粒度聚合
    // ==========================================
    #[instrument(skip(self), fields(run_id = %self.run_id))]
    pub fn analyze(&self) -> ApiResult<StageReport> {
        let mut timer = StageTimer::new(PipelineStage::Analyze);

        let records = self.importer.import_step_table(
            self.repo.path_of(ArtifactKind::ProcessedTable),
            ArtifactKind::ProcessedTable.producer(),
        )?;
        let tables = MetricsAggregator::new().analyze(&records);

        let artifacts = vec![
            self.repo.write_table(ArtifactKind::HourlyMetrics, &tables.hourly)?,
            self.repo.write_table(ArtifactKind::DailyStepMetrics, &tables.daily_step)?,
            self.repo.write_table(ArtifactKind::SiteDailyMetrics, &tables.site_daily)?,
        ];

        timer.set_rows(tables.hourly.len());
        Ok(stage_report(&timer, PipelineStage::Analyze, tables.hourly.len(), artifacts))
    }

    // ==========================================
    // 阶段 4: 瓶颈识别
    // ==========================================
    #[instrument(skip(self), fields(run_id = %self.run_id))]
    pub fn detect_bottlenecks(&self) -> ApiResult<StageReport> {
        let mut timer = StageTimer::new(PipelineStage::Bottlenecks);

        let detector = BottleneckDetector::new(self.config.bottleneck_threshold_util)?;
        let hourly = self.importer.import_hourly_metrics(
            self.repo.path_of(ArtifactKind::HourlyMetrics),
            ArtifactKind::HourlyMetrics.producer(),
        )?;
        let analysis = detector.detect(&hourly);

        let artifacts = vec![
            self.repo.write_table(ArtifactKind::Bottlenecks, &analysis.records)?,
            self.repo.write_json(ArtifactKind::BottleneckSummary, &analysis.summary)?,
        ];

        timer.set_rows(analysis.records.len());
        Ok(stage_report(&timer, PipelineStage::Bottlenecks, analysis.records.len(), artifacts))
    }

    // ==========================================
    // 阶段 5: 人力建议
    // ==========================================
    #[instrument(skip(self), fields(run_id = %self.run_id))]
    pub fn recommend_staffing(&self) -> ApiResult<StageReport> {
        let mut timer = StageTimer::new(PipelineStage::Recommend);

        let recommender = StaffingRecommender::new(
            self.config.service_target,
            self.config.uph_by_step.clone(),
            self.config.wage_per_hour,
        )?;
        let hourly = self.importer.import_hourly_metrics(
            self.repo.path_of(ArtifactKind::HourlyMetrics),
            ArtifactKind::HourlyMetrics.producer(),
        )?;
        let analysis = recommender.recommend(&hourly)?;

        let artifacts = vec![
            self.repo.write_table(ArtifactKind::Staffing, &analysis.records)?,
            self.repo.write_json(ArtifactKind::StaffingSummary, &analysis.summary)?,
        ];

        timer.set_rows(analysis.records.len());
        Ok(stage_report(&timer, PipelineStage::Recommend, analysis.records.len(), artifacts))
    }

    // ==========================================
    // 阶段 6: KPI 汇总
    // ==========================================
    // 缺失的上游产物对应段落留空
    #[instrument(skip(self), fields(run_id = %self.run_id))]
    pub fn report(&self) -> ApiResult<(StageReport, KpiReport)> {
        let mut timer = StageTimer::new(PipelineStage::Report);

        let daily_step: Option<Vec<DailyStepMetricRecord>> =
            self.read_optional(ArtifactKind::DailyStepMetrics)?;
        let bottlenecks: Option<Vec<BottleneckRecord>> =
            self.read_optional(ArtifactKind::Bottlenecks)?;
        let staffing: Option<Vec<StaffingRecord>> = self.read_optional(ArtifactKind::Staffing)?;
        let site_daily: Option<Vec<SiteDailyMetricRecord>> =
            self.read_optional(ArtifactKind::SiteDailyMetrics)?;

        let mut kpis = KpiEngine::new().compute(KpiInputs {
            daily_step: daily_step.as_deref(),
            bottlenecks: bottlenecks.as_deref(),
            staffing: staffing.as_deref(),
            site_daily: site_daily.as_deref(),
        });
        kpis.run_id = Some(self.run_id.clone());
        kpis.generated_at = Some(Utc::now());

        let path = self.repo.write_json(ArtifactKind::Kpis, &kpis)?;
        let sections = [
            kpis.throughput.is_some(),
            kpis.bottleneck.is_some(),
            kpis.staffing.is_some(),
            kpis.site.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count();

        timer.set_rows(sections);
        Ok((stage_report(&timer, PipelineStage::Report, sections, vec![path]), kpis))
    }

    fn read_optional<T: DeserializeOwned>(&self, kind: ArtifactKind) -> ApiResult<Option<Vec<T>>> {
        if !self.repo.exists(kind) {
            return Ok(None);
        }
        Ok(Some(self.repo.read_table(kind)?))
    }

    // ==========================================
    // 全流程
    // ==========================================
    #[instrument(skip(self), fields(run_id = %self.run_id))]
    pub async fn run_all(&self) -> ApiResult<PipelineReport> {
        let mut stages = vec![
            self.generate_parallel().await?,
            self.preprocess()?,
            self.analyze()?,
            self.detect_bottlenecks()?,
            self.recommend_staffing()?,
        ];
        let (report_stage, kpis) = self.report()?;
        stages.push(report_stage);

        info!(run_id = %self.run_id, stages = stages.len(), "流水线完成");

        Ok(PipelineReport {
            run_id: self.run_id.clone(),
            stages,
            kpis,
        })
    }
}

fn stage_report(timer: &StageTimer, stage: PipelineStage, rows: usize, artifacts: Vec<PathBuf>) -> StageReport {
    StageReport {
        stage,
        rows,
        artifacts,
        elapsed_ms: timer.elapsed_ms(),
    }
}
