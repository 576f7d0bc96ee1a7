use async_trait::async_trait;
use parking_lot::RwLock;
use std::{collections::HashMap, sync::Arc};

use crate::common::{PoolError, ProcessInfo, ProcessState, Result};
use crate::provider::{DirectoryProvider, PathCorpusProvider, ProcessRegistryProvider};

/// 内存数据源 (In-Memory Providers)
///
/// 同时实现了三个 Provider 接口。
/// - 内部全部是 `Arc<RwLock<..>>`，Clone 是廉价的，克隆体共享同一份数据。
/// - 读多写少：处理器只读，测试或外部胶水代码负责写入。
#[derive(Debug, Clone, Default)]
pub struct MemoryEnvironment {
    /// 路径 -> 有序条目
    dirs: Arc<RwLock<HashMap<String, Vec<String>>>>,
    /// 已知路径全集 (保持插入顺序)
    paths: Arc<RwLock<Vec<String>>>,
    /// 进程表
    processes: Arc<RwLock<Vec<ProcessInfo>>>,
}

impl MemoryEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// AlteronOS 默认布局
    pub fn alteron() -> Self {
        let env = Self::new();
        env.insert_dir(
            "/",
            [
                "System.dir/",
                "Programs.dir/",
                "Users.dir/",
                "Config.dir/",
                "readme.txt",
                "app.exe",
                "program.deb",
            ],
        );
        env.insert_dir("System.dir", ["config.txt"]);
        env.insert_dir("Users.dir", ["documents.txt"]);
        env.insert_dir("Programs.dir", Vec::<String>::new());
        env.insert_dir("Config.dir", Vec::<String>::new());
        env.set_paths([
            "System.dir/config.txt",
            "Users.dir/documents.txt",
            "readme.txt",
            "backup.txt",
        ]);
        for name in [
            "kernel_manager.py",
            "desktop.py",
            "terminal.py",
            "file_manager.py",
        ] {
            env.register(ProcessInfo::running(name));
        }
        env
    }

    // ---------------- 目录 ----------------

    /// 写入 (或覆盖) 一个目录的条目
    pub fn insert_dir<I, S>(&self, path: &str, entries: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = entries.into_iter().map(Into::into).collect();
        self.dirs.write().insert(path.to_string(), entries);
    }

    /// 删除目录，返回是否存在
    pub fn remove_dir(&self, path: &str) -> bool {
        self.dirs.write().remove(path).is_some()
    }

    // ---------------- 语料 ----------------

    /// 整体替换路径语料 (刷新快照)
    pub fn set_paths<I, S>(&self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.paths.write() = paths.into_iter().map(Into::into).collect();
    }

    pub fn push_path(&self, path: impl Into<String>) {
        self.paths.write().push(path.into());
    }

    // ---------------- 进程表 ----------------

    /// 注册进程；同名进程会被替换并保持原位置
    pub fn register(&self, info: ProcessInfo) {
        let mut procs = self.processes.write();
        match procs.iter_mut().find(|p| p.name == info.name) {
            Some(existing) => *existing = info,
            None => procs.push(info),
        }
    }

    /// 更新进程状态，返回进程是否存在
    pub fn set_state(&self, name: &str, state: ProcessState) -> bool {
        let mut procs = self.processes.write();
        match procs.iter_mut().find(|p| p.name == name) {
            Some(p) => {
                p.state = state;
                true
            }
            None => false,
        }
    }

    /// 注销进程，返回是否存在
    pub fn unregister(&self, name: &str) -> bool {
        let mut procs = self.processes.write();
        let before = procs.len();
        procs.retain(|p| p.name != name);
        procs.len() != before
    }
}

#[async_trait]
impl DirectoryProvider for MemoryEnvironment {
    async fn list_entries(&self, path: &str) -> Result<Vec<String>> {
        self.dirs
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| PoolError::PathNotFound(path.to_string()))
    }
}

#[async_trait]
impl PathCorpusProvider for MemoryEnvironment {
    async fn all_paths(&self) -> Result<Vec<String>> {
        Ok(self.paths.read().clone())
    }
}

#[async_trait]
impl ProcessRegistryProvider for MemoryEnvironment {
    async fn snapshot(&self) -> Result<Vec<ProcessInfo>> {
        Ok(self.processes.read().clone())
    }
}

/// 永远不可用的数据源 (用于演练故障路径)
#[derive(Debug, Clone, Default)]
pub struct UnavailableProvider {
    reason: String,
}

impl UnavailableProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn err(&self) -> PoolError {
        PoolError::ProviderUnavailable(self.reason.clone())
    }
}

#[async_trait]
impl DirectoryProvider for UnavailableProvider {
    async fn list_entries(&self, _path: &str) -> Result<Vec<String>> {
        Err(self.err())
    }
}

#[async_trait]
impl PathCorpusProvider for UnavailableProvider {
    async fn all_paths(&self) -> Result<Vec<String>> {
        Err(self.err())
    }
}

#[async_trait]
impl ProcessRegistryProvider for UnavailableProvider {
    async fn snapshot(&self) -> Result<Vec<ProcessInfo>> {
        Err(self.err())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_dir_is_path_not_found() {
        let env = MemoryEnvironment::new();
        let err = env.list_entries("nowhere").await.unwrap_err();
        assert!(matches!(err, PoolError::PathNotFound(p) if p == "nowhere"));
    }

    #[tokio::test]
    async fn clones_share_state() {
        let env = MemoryEnvironment::new();
        let view = env.clone();
        env.insert_dir("Config.dir", ["a.txt"]);
        assert_eq!(view.list_entries("Config.dir").await.unwrap(), vec!["a.txt"]);
    }

    #[tokio::test]
    async fn register_replaces_in_place() {
        let env = MemoryEnvironment::new();
        env.register(ProcessInfo::running("init"));
        env.register(ProcessInfo::running("shell"));
        env.register(ProcessInfo::new("init", ProcessState::Stopped));

        let snap = env.snapshot().await.unwrap();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0], ProcessInfo::new("init", ProcessState::Stopped));
        assert!(env.unregister("shell"));
        assert!(!env.unregister("shell"));
    }

    #[tokio::test]
    async fn alteron_layout_is_seeded() {
        let env = MemoryEnvironment::alteron();
        assert_eq!(env.list_entries("/").await.unwrap().len(), 7);
        assert_eq!(env.all_paths().await.unwrap().len(), 4);
        assert_eq!(env.snapshot().await.unwrap().len(), 4);
    }
}
