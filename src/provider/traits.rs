use async_trait::async_trait;

use crate::common::{ProcessInfo, Result};

// ==========================================
// 1. 目录接口 (DirectoryProvider)
// ==========================================

/// 目录数据源
///
/// **职责**: 回答“某个路径下有哪些条目”。
/// **约定**:
/// - 条目顺序由实现方决定，处理器原样保留。
/// - 路径不存在时返回 `PoolError::PathNotFound`。
/// - 数据源自身故障时返回 `PoolError::ProviderUnavailable`。
#[async_trait]
pub trait DirectoryProvider: Send + Sync + 'static {
    async fn list_entries(&self, path: &str) -> Result<Vec<String>>;
}

// ==========================================
// 2. 路径语料接口 (PathCorpusProvider)
// ==========================================

/// 全量已知路径
///
/// 可以是静态列表，也可以是周期刷新的快照；`Find` 在其上做子串过滤。
#[async_trait]
pub trait PathCorpusProvider: Send + Sync + 'static {
    async fn all_paths(&self) -> Result<Vec<String>>;
}

// ==========================================
// 3. 进程表接口 (ProcessRegistryProvider)
// ==========================================

/// 进程表快照
#[async_trait]
pub trait ProcessRegistryProvider: Send + Sync + 'static {
    async fn snapshot(&self) -> Result<Vec<ProcessInfo>>;
}
