// ==========================================
// 流水线端到端测试
// ==========================================
// 场景: YAML 配置 → 全部阶段 → 产物落盘
// 场景: 缺失上游产物 / 表结构损坏时不写出下游产物
// ==========================================


use fc_capacity_planner::api::{ApiError, PipelineApi};
use fc_capacity_planner::config::ConfigLoader;
use fc_capacity_planner::domain::bottleneck::{BottleneckRecord, BottleneckSummary};
use fc_capacity_planner::domain::staffing::StaffingSummary;
use fc_capacity_planner::domain::{KpiReport, PipelineStage};
use fc_capacity_planner::importer::ImportError;
use fc_capacity_planner::logging;
use fc_capacity_planner::repository::ArtifactKind;
use tempfile::tempdir;
use test_helpers::{sample_config, write_config_yaml, STEPS};

#[tokio::test]
async fn test_full_pipeline_from_yaml_config() {
    logging::init_test();
    let dir = tempdir().unwrap();
    let config_path = write_config_yaml(dir.path(), &sample_config(3)).unwrap();
    let config = ConfigLoader::load(&config_path).unwrap();

    let api = PipelineApi::new(config, dir.path()).unwrap();
    let report = api.run_all().await.unwrap();

    let stages: Vec<PipelineStage> = report.stages.iter().map(|s| s.stage).collect();
    assert_eq!(
        stages,
        vec![
            PipelineStage::Generate,
            PipelineStage::Preprocess,
            PipelineStage::Analyze,
            PipelineStage::Bottlenecks,
            PipelineStage::Recommend,
            PipelineStage::Report,
        ]
    );
    assert_eq!(report.stages[0].rows, 3 * 24 * STEPS.len());

    let repo = api.repository();
    let bottlenecks: Vec<BottleneckRecord> = repo.read_table(ArtifactKind::Bottlenecks).unwrap();
    assert_eq!(bottlenecks.len(), 3 * 24 * STEPS.len());

    let summary: BottleneckSummary = repo.read_json(ArtifactKind::BottleneckSummary).unwrap();
    assert_eq!(
        summary.total_bottleneck_hours,
        bottlenecks.iter().filter(|r| r.is_bottleneck).count()
    );

    let staffing: StaffingSummary = repo.read_json(ArtifactKind::StaffingSummary).unwrap();
    assert!(staffing.total_positive_gap_hours >= 0);

    let kpis: KpiReport = repo.read_json(ArtifactKind::Kpis).unwrap();
    assert_eq!(kpis.run_id.as_deref(), Some(report.run_id.as_str()));
    assert!(kpis.throughput.is_some());
    assert!(kpis.bottleneck.is_some());
    assert!(kpis.staffing.is_some());
    assert_eq!(kpis.site.map(|s| s.total_days), Some(3));
}

#[test]
fn test_stages_rerun_from_disk_are_deterministic() {
    let dir_a = tempdir().unwrap();
    let dir_b = tempdir().unwrap();

    for dir in [&dir_a, &dir_b] {
        let api = PipelineApi::new(sample_config(2), dir.path()).unwrap();
        api.generate().unwrap();
        api.preprocess().unwrap();
        api.analyze().unwrap();
    }

    for kind in [ArtifactKind::RawTable, ArtifactKind::HourlyMetrics] {
        let a = std::fs::read_to_string(dir_a.path().join(relative(kind))).unwrap();
        let b = std::fs::read_to_string(dir_b.path().join(relative(kind))).unwrap();
        assert_eq!(a, b, "{:?}", kind);
    }
}

fn relative(kind: ArtifactKind) -> &'static str {
    match kind {
        ArtifactKind::RawTable => "data/raw/fc_hourly_ops.csv",
        ArtifactKind::HourlyMetrics => "data/processed/step_hourly_metrics.csv",
        _ => unreachable!(),
    }
}

#[test]
fn test_missing_raw_table_points_to_generate() {
    let dir = tempdir().unwrap();
    let api = PipelineApi::new(sample_config(1), dir.path()).unwrap();

    let err = api.preprocess().unwrap_err();
    assert!(matches!(err, ApiError::Import(ImportError::MissingInput { .. })));
    assert_eq!(err.rerun_stage(), Some(PipelineStage::Generate));
    assert!(!api.repository().exists(ArtifactKind::ProcessedTable));

    let err = api.recommend_staffing().unwrap_err();
    assert_eq!(err.rerun_stage(), Some(PipelineStage::Analyze));
}

#[test]
fn test_corrupt_processed_table_reports_every_bad_column() {
    let dir = tempdir().unwrap();
    let api = PipelineApi::new(sample_config(1), dir.path()).unwrap();
    api.generate().unwrap();
    api.preprocess().unwrap();

    // 去掉 uph 列, processed_units 写入非数值
    let path = api.repository().path_of(ArtifactKind::ProcessedTable);
    std::fs::write(
        &path,
        "timestamp,step,demand_units,capacity_units,processed_units,backlog_units,utilization,cycle_time_min,labor_hours_used,headcount_used\n\
         2024-01-01T00:00:00,receive,10,12,abc,0,0.8,15,0.1,1\n",
    )
    .unwrap();

    let err = api.analyze().unwrap_err();
    match err {
        ApiError::Import(ImportError::Schema {
            missing_columns,
            invalid_columns,
        }) => {
            assert_eq!(missing_columns, vec!["uph".to_string()]);
            assert_eq!(invalid_columns.len(), 1);
            assert_eq!(invalid_columns[0].column, "processed_units");
            assert_eq!(invalid_columns[0].row, 1);
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(!api.repository().exists(ArtifactKind::HourlyMetrics));
    assert!(!api.repository().exists(ArtifactKind::DailyStepMetrics));
}

#[test]
fn test_report_tolerates_partial_upstream() {
    let dir = tempdir().unwrap();
    let api = PipelineApi::new(sample_config(2), dir.path()).unwrap();
    api.generate().unwrap();
    api.preprocess().unwrap();
    api.analyze().unwrap();

    let (_, kpis) = api.report().unwrap();
    assert!(kpis.throughput.is_some());
    assert!(kpis.site.is_some());
    assert!(kpis.bottleneck.is_none());
    assert!(kpis.staffing.is_none());
}
