use async_trait::async_trait;

use crate::{
    common::{Result, TaskKind},
    handler::OperationHandler,
    provider::Environment,
};

/// 子串查找：保留语料顺序，没有匹配时返回空序列
#[derive(Debug, Clone, Copy, Default)]
pub struct FindHandler;

#[async_trait]
impl OperationHandler for FindHandler {
    fn kind(&self) -> TaskKind {
        TaskKind::Find
    }

    async fn handle(&self, pattern: &str, env: &Environment) -> Result<Vec<String>> {
        let paths = env.corpus.all_paths().await?;
        Ok(paths.into_iter().filter(|p| p.contains(pattern)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MemoryEnvironment;

    fn env() -> Environment {
        Environment::from_memory(MemoryEnvironment::alteron())
    }

    #[tokio::test]
    async fn keeps_corpus_order() {
        let out = FindHandler.handle(".txt", &env()).await.unwrap();
        assert_eq!(
            out,
            vec![
                "System.dir/config.txt",
                "Users.dir/documents.txt",
                "readme.txt",
                "backup.txt"
            ]
        );
    }

    #[tokio::test]
    async fn no_match_is_empty_not_error() {
        let out = FindHandler.handle("*.iso", &env()).await.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn repeated_queries_are_identical() {
        let env = env();
        let a = FindHandler.handle("dir", &env).await.unwrap();
        let b = FindHandler.handle("dir", &env).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a, vec!["System.dir/config.txt", "Users.dir/documents.txt"]);
    }

    #[tokio::test]
    async fn appended_paths_are_searchable() {
        let mem = MemoryEnvironment::alteron();
        let env = Environment::from_memory(mem.clone());
        mem.push_path("Programs.dir/app.exe");

        let out = FindHandler.handle("Programs", &env).await.unwrap();
        assert_eq!(out, vec!["Programs.dir/app.exe"]);
    }
}
