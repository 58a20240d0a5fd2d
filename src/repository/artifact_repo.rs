// ==========================================
// 履约中心产能规划系统 - 阶段产物仓储
// ==========================================
// 职责: 各阶段产物 (CSV 表 / JSON 汇总) 的落盘与读取
// 红线: 仓储不含业务逻辑,只做序列化与路径解析
// 红线: 读取缺失产物时报告需要运行的上游阶段
// ==========================================

use crate::config::{DataPaths, PlannerConfig, ReportPaths};
use crate::domain::types::PipelineStage;
use crate::repository::error::{RepositoryError, RepositoryResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

// ==========================================
// ArtifactKind - 产物种类
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    RawTable,          // 生成的小时工序表
    ProcessedTable,    // 预处理表 (附日历特征)
    HourlyMetrics,     // 小时 × 工序 指标
    DailyStepMetrics,  // 日 × 工序 指标
    SiteDailyMetrics,  // 日 × 全场 指标
    Bottlenecks,       // 瓶颈标记表
    Staffing,          // 人力建议表
    BottleneckSummary, // 瓶颈汇总 JSON
    StaffingSummary,   // 人力汇总 JSON
    Kpis,              // KPI JSON
}

impl ArtifactKind {
    /// 产出该产物的阶段
    pub fn producer(&self) -> PipelineStage {
        match self {
            ArtifactKind::RawTable => PipelineStage::Generate,
            ArtifactKind::ProcessedTable => PipelineStage::Preprocess,
            ArtifactKind::HourlyMetrics
            | ArtifactKind::DailyStepMetrics
            | ArtifactKind::SiteDailyMetrics => PipelineStage::Analyze,
            ArtifactKind::Bottlenecks | ArtifactKind::BottleneckSummary => {
                PipelineStage::Bottlenecks
            }
            ArtifactKind::Staffing | ArtifactKind::StaffingSummary => PipelineStage::Recommend,
            ArtifactKind::Kpis => PipelineStage::Report,
        }
    }

    fn relative_path<'a>(&self, data: &'a DataPaths, reports: &'a ReportPaths) -> &'a str {
        match self {
            ArtifactKind::RawTable => &data.raw_file,
            ArtifactKind::ProcessedTable => &data.processed_file,
            ArtifactKind::HourlyMetrics => &data.step_hourly_file,
            ArtifactKind::DailyStepMetrics => &data.step_daily_file,
            ArtifactKind::SiteDailyMetrics => &data.site_daily_file,
            ArtifactKind::Bottlenecks => &data.bottlenecks_file,
            ArtifactKind::Staffing => &data.staffing_file,
            ArtifactKind::BottleneckSummary => &reports.bottleneck_summary,
            ArtifactKind::StaffingSummary => &reports.staffing_summary,
            ArtifactKind::Kpis => &reports.kpis_json,
        }
    }
}

// ==========================================
// ArtifactRepository - 产物仓储
// ==========================================
#[derive(Debug, Clone)]
pub struct ArtifactRepository {
    root: PathBuf,
    data: DataPaths,
    reports: ReportPaths,
}

impl ArtifactRepository {
    /// 创建仓储
    ///
    /// # 参数
    /// - root: 产物根目录
    /// - data / reports: 相对路径表
    pub fn new<P: Into<PathBuf>>(root: P, data: DataPaths, reports: ReportPaths) -> Self {
        Self {
            root: root.into(),
            data,
            reports,
        }
    }

    /// 使用配置中的产物路径
    pub fn from_config<P: Into<PathBuf>>(root: P, config: &PlannerConfig) -> Self {
        Self::new(root, config.data.clone(), config.reports.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 产物绝对路径
    pub fn path_of(&self, kind: ArtifactKind) -> PathBuf {
        self.root.join(kind.relative_path(&self.data, &self.reports))
    }

    pub fn exists(&self, kind: ArtifactKind) -> bool {
        self.path_of(kind).exists()
    }

    /// 产物存在则返回路径,否则报告缺失
    pub fn require(&self, kind: ArtifactKind) -> RepositoryResult<PathBuf> {
        let path = self.path_of(kind);
        if !path.exists() {
            return Err(RepositoryError::MissingInput {
                path: path.display().to_string(),
                producer: kind.producer(),
            });
        }
        Ok(path)
    }

    // ===== CSV 表 =====

    /// 写出表 (覆盖)
    pub fn write_table<T: Serialize>(&self, kind: ArtifactKind, rows: &[T]) -> RepositoryResult<PathBuf> {
        let path = self.prepare_write(kind)?;
        let csv_err = |e: csv::Error| RepositoryError::Csv {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        let mut writer = csv::Writer::from_path(&path).map_err(csv_err)?;
        for row in rows {
            writer.serialize(row).map_err(csv_err)?;
        }
        writer.flush().map_err(|e| io_error(&path, e))?;

        debug!(path = %path.display(), rows = rows.len(), "表产物已写出");
        Ok(path)
    }

    /// 读取表
    pub fn read_table<T: DeserializeOwned>(&self, kind: ArtifactKind) -> RepositoryResult<Vec<T>> {
        let path = self.require(kind)?;
        let csv_err = |e: csv::Error| RepositoryError::Csv {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        let mut reader = csv::Reader::from_path(&path).map_err(csv_err)?;
        let rows = reader
            .deserialize()
            .collect::<Result<Vec<T>, csv::Error>>()
            .map_err(csv_err)?;

        debug!(path = %path.display(), rows = rows.len(), "表产物已读取");
        Ok(rows)
    }

    // ===== JSON 汇总 =====

    pub fn write_json<T: Serialize>(&self, kind: ArtifactKind, value: &T) -> RepositoryResult<PathBuf> {
        let path = self.prepare_write(kind)?;
        let file = File::create(&path).map_err(|e| io_error(&path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value).map_err(|e| RepositoryError::Json {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        writer.flush().map_err(|e| io_error(&path, e))?;

        debug!(path = %path.display(), "汇总产物已写出");
        Ok(path)
    }

    pub fn read_json<T: DeserializeOwned>(&self, kind: ArtifactKind) -> RepositoryResult<T> {
        let path = self.require(kind)?;
        let file = File::open(&path).map_err(|e| io_error(&path, e))?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| RepositoryError::Json {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// 创建父目录并返回目标路径
    fn prepare_write(&self, kind: ArtifactKind) -> RepositoryResult<PathBuf> {
        let path = self.path_of(kind);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        Ok(path)
    }
}

fn io_error(path: &Path, err: std::io::Error) -> RepositoryError {
    RepositoryError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bottleneck::{BottleneckRecord, BottleneckSummary};
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn repo(root: &Path) -> ArtifactRepository {
        ArtifactRepository::new(root, DataPaths::default(), ReportPaths::default())
    }

    fn bottleneck(step: Option<&str>) -> BottleneckRecord {
        BottleneckRecord {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(3, 0, 0)
                .unwrap(),
            step: "pick".to_string(),
            demand_units: 10.0,
            capacity_units: 8.0,
            processed_units: 8.0,
            backlog_units: 2.0,
            utilization: 0.99,
            service_level_hourly: 0.8,
            throughput_loss_units: 2.0,
            backlog_change: 2.0,
            is_bottleneck: true,
            bottleneck_step: step.map(str::to_string),
        }
    }

    #[test]
    fn test_producer_mapping() {
        assert_eq!(ArtifactKind::RawTable.producer(), PipelineStage::Generate);
        assert_eq!(ArtifactKind::HourlyMetrics.producer(), PipelineStage::Analyze);
        assert_eq!(ArtifactKind::StaffingSummary.producer(), PipelineStage::Recommend);
    }

    #[test]
    fn test_write_creates_parent_dirs_and_reads_back() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());
        let rows = vec![bottleneck(Some("pick")), bottleneck(None)];

        let path = repo.write_table(ArtifactKind::Bottlenecks, &rows).unwrap();
        assert!(path.ends_with("data/processed/bottlenecks.csv"));

        let loaded: Vec<BottleneckRecord> = repo.read_table(ArtifactKind::Bottlenecks).unwrap();
        assert_eq!(loaded, rows);
    }

    #[test]
    fn test_json_summary_written_under_reports() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());
        let summary = BottleneckSummary::default();

        let path = repo.write_json(ArtifactKind::BottleneckSummary, &summary).unwrap();
        assert!(path.starts_with(dir.path().join("reports")));
        let loaded: BottleneckSummary = repo.read_json(ArtifactKind::BottleneckSummary).unwrap();
        assert_eq!(loaded, summary);
    }

    #[test]
    fn test_missing_artifact_reports_producer() {
        let dir = tempdir().unwrap();
        let err = repo(dir.path())
            .read_table::<BottleneckRecord>(ArtifactKind::Staffing)
            .unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::MissingInput { producer: PipelineStage::Recommend, .. }
        ));
    }
}
