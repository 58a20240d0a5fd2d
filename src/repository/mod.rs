// ==========================================
// 履约中心产能规划系统 - 数据仓储层
// ==========================================
// 职责: 阶段产物落盘与读取,屏蔽文件格式细节
// 红线: Repository 不含业务逻辑
// ==========================================

pub mod artifact_repo;
pub mod error;

// 重导出核心仓储
pub use artifact_repo::{ArtifactKind, ArtifactRepository};
pub use error::{RepositoryError, RepositoryResult};
