// ==========================================
// Excel 输入集成测试
// ==========================================
// 场景: 外部 .xlsx 小时工序表 → 预处理产物
// 场景: Excel 中非数值单元格 → 表结构错误, 不写出产物
// ==========================================


use chrono::{NaiveDate, Timelike};
use fc_capacity_planner::api::{ApiError, PipelineApi};
use fc_capacity_planner::domain::{PipelineStage, PreparedStepRecord};
use fc_capacity_planner::importer::{ImportError, TableImporter};
use fc_capacity_planner::repository::ArtifactKind;
use std::path::PathBuf;
use tempfile::tempdir;
use test_helpers::sample_config;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_xlsx_step_table_imports_date_cells() {
    let records = TableImporter::new()
        .import_step_table(fixture("hourly_steps.xlsx"), PipelineStage::Generate)
        .unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].step, "pick");
    assert_eq!(
        records[0].timestamp,
        NaiveDate::from_ymd_opt(2024, 1, 6)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    );
    assert_eq!(records[1].timestamp.hour(), 11);
    assert_eq!(records[1].processed_units, 70.0);
    assert_eq!(records[2].step, "pack");
    assert_eq!(records[2].headcount_used, 1);
}

#[test]
fn test_preprocess_from_xlsx_writes_calendar_features() {
    let dir = tempdir().unwrap();
    let api = PipelineApi::new(sample_config(1), dir.path()).unwrap();

    let stage = api.preprocess_from(fixture("hourly_steps.xlsx")).unwrap();
    assert_eq!(stage.stage, PipelineStage::Preprocess);
    assert_eq!(stage.rows, 3);

    let prepared: Vec<PreparedStepRecord> = api
        .repository()
        .read_table(ArtifactKind::ProcessedTable)
        .unwrap();
    assert_eq!(prepared.len(), 3);
    assert!(prepared.iter().all(|r| r.is_weekend && r.dow == 5));
    assert_eq!(
        prepared.iter().map(|r| r.hour).collect::<Vec<_>>(),
        vec![10, 11, 10]
    );

    // 预处理产物可继续进入分析阶段
    let analyzed = api.analyze().unwrap();
    assert_eq!(analyzed.rows, 3);
}

#[test]
fn test_xlsx_non_numeric_cell_is_schema_error() {
    let dir = tempdir().unwrap();
    let api = PipelineApi::new(sample_config(1), dir.path()).unwrap();

    let err = api
        .preprocess_from(fixture("hourly_steps_invalid.xlsx"))
        .unwrap_err();
    match err {
        ApiError::Import(ImportError::Schema {
            missing_columns,
            invalid_columns,
        }) => {
            assert!(missing_columns.is_empty());
            assert_eq!(invalid_columns.len(), 1);
            assert_eq!(invalid_columns[0].column, "processed_units");
            assert_eq!(invalid_columns[0].row, 2);
            assert_eq!(invalid_columns[0].value, "n/a");
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(!api.repository().exists(ArtifactKind::ProcessedTable));
}
