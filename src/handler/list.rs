use async_trait::async_trait;

use crate::{
    common::{PoolError, Result, TaskKind},
    handler::OperationHandler,
    provider::Environment,
};

/// 列目录
#[derive(Debug, Clone, Copy, Default)]
pub struct ListHandler;

impl ListHandler {
    /// 路径合法性检查：拒绝 `..` (越级) 和 `//` (空段)
    pub fn validate_path(path: &str) -> Result<()> {
        if path.contains("..") || path.contains("//") {
            return Err(PoolError::InvalidPath(path.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl OperationHandler for ListHandler {
    fn kind(&self) -> TaskKind {
        TaskKind::List
    }

    async fn handle(&self, path: &str, env: &Environment) -> Result<Vec<String>> {
        Self::validate_path(path)?;
        env.directory.list_entries(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MemoryEnvironment;

    #[tokio::test]
    async fn lists_entries_in_provider_order() {
        let mem = MemoryEnvironment::new();
        mem.insert_dir("Config.dir", ["a.txt", "b.txt"]);
        let env = Environment::from_memory(mem);

        let out = ListHandler.handle("Config.dir", &env).await.unwrap();
        assert_eq!(out, vec!["a.txt", "b.txt"]);
    }

    #[tokio::test]
    async fn unknown_path_fails() {
        let env = Environment::from_memory(MemoryEnvironment::new());
        let err = ListHandler.handle("Ghost.dir", &env).await.unwrap_err();
        assert!(matches!(err, PoolError::PathNotFound(_)));
    }

    #[tokio::test]
    async fn traversal_is_rejected_before_lookup() {
        let mem = MemoryEnvironment::new();
        mem.insert_dir("../etc", ["passwd"]);
        let env = Environment::from_memory(mem);

        let err = ListHandler.handle("../etc", &env).await.unwrap_err();
        assert!(matches!(err, PoolError::InvalidPath(_)));
        assert!(ListHandler::validate_path("a//b").is_err());
        assert!(ListHandler::validate_path("Users.dir/docs").is_ok());
    }

    #[tokio::test]
    async fn removed_dir_is_not_found() {
        let mem = MemoryEnvironment::alteron();
        let env = Environment::from_memory(mem.clone());
        assert!(ListHandler.handle("Users.dir", &env).await.is_ok());

        assert!(mem.remove_dir("Users.dir"));
        let err = ListHandler.handle("Users.dir", &env).await.unwrap_err();
        assert!(matches!(err, PoolError::PathNotFound(_)));
    }
}
