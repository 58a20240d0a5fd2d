// ==========================================
// 履约中心产能规划系统 - 表导入器
// ==========================================
// 职责: 整合表输入流程
// 流程: 存在性检查 → 解析 → 表结构校验 → 字段映射
// 红线: 校验失败时不产出任何记录
// ==========================================

use crate::domain::metrics::HourlyMetricRecord;
use crate::domain::record::HourlyStepRecord;
use crate::domain::types::PipelineStage;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::{FileParser, RawTable, UniversalFileParser};
use crate::importer::schema_validator::{
    SchemaValidator, TableSchema, HOURLY_METRIC_SCHEMA, STEP_TABLE_SCHEMA,
};
use std::path::Path;
use tracing::{info, instrument};

// ==========================================
// TableImporter - 表导入器
// ==========================================
pub struct TableImporter {
    file_parser: Box<dyn FileParser + Send + Sync>,
    validator: SchemaValidator,
    mapper: FieldMapper,
}

impl TableImporter {
    pub fn new() -> Self {
        Self::with_parser(Box::new(UniversalFileParser))
    }

    /// 指定文件解析器
    pub fn with_parser(file_parser: Box<dyn FileParser + Send + Sync>) -> Self {
        Self {
            file_parser,
            validator: SchemaValidator,
            mapper: FieldMapper,
        }
    }

    /// 导入小时工序表
    ///
    /// # 参数
    /// - path: CSV / XLSX 文件
    /// - producer: 缺失时需要 (重新) 运行的阶段
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn import_step_table<P: AsRef<Path>>(
        &self,
        path: P,
        producer: PipelineStage,
    ) -> ImportResult<Vec<HourlyStepRecord>> {
        let table = self.load(path.as_ref(), producer, &STEP_TABLE_SCHEMA)?;
        let records = self.map_rows(&table, |row, n| self.mapper.to_step_record(row, n))?;
        info!(rows = records.len(), "小时工序表导入完成");
        Ok(records)
    }

    /// 导入小时 × 工序 指标表
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn import_hourly_metrics<P: AsRef<Path>>(
        &self,
        path: P,
        producer: PipelineStage,
    ) -> ImportResult<Vec<HourlyMetricRecord>> {
        let table = self.load(path.as_ref(), producer, &HOURLY_METRIC_SCHEMA)?;
        let records = self.map_rows(&table, |row, n| self.mapper.to_hourly_metric(row, n))?;
        info!(rows = records.len(), "小时指标表导入完成");
        Ok(records)
    }

    fn load(&self, path: &Path, producer: PipelineStage, schema: &TableSchema) -> ImportResult<RawTable> {
        if !path.exists() {
            return Err(ImportError::MissingInput {
                path: path.display().to_string(),
                producer,
            });
        }

        let table = self.file_parser.parse(path)?;
        self.validator.validate(&table, schema)?;
        Ok(table)
    }

    fn map_rows<T, F>(&self, table: &RawTable, map: F) -> ImportResult<Vec<T>>
    where
        F: Fn(&std::collections::HashMap<String, String>, usize) -> ImportResult<T>,
    {
        table
            .rows
            .iter()
            .enumerate()
            .map(|(idx, row)| map(row, idx + 1))
            .collect()
    }
}

impl Default for TableImporter {
    fn default() -> Self {
        Self::new()
    }
}
