use async_trait::async_trait;

use crate::{
    common::{Result, TaskKind},
    handler::OperationHandler,
    provider::Environment,
};

/// 进程表快照，格式 `<name> [<STATE>]`
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessListHandler;

#[async_trait]
impl OperationHandler for ProcessListHandler {
    fn kind(&self) -> TaskKind {
        TaskKind::ProcessList
    }

    async fn handle(&self, _parameter: &str, env: &Environment) -> Result<Vec<String>> {
        let snapshot = env.processes.snapshot().await?;
        Ok(snapshot
            .iter()
            .map(|p| format!("{} [{}]", p.name, p.state))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::{ProcessInfo, ProcessState},
        provider::MemoryEnvironment,
    };

    #[tokio::test]
    async fn formats_name_and_state() {
        let mem = MemoryEnvironment::new();
        mem.register(ProcessInfo::running("desktop.py"));
        mem.register(ProcessInfo::new("terminal.py", ProcessState::Sleeping));
        let env = Environment::from_memory(mem);

        let out = ProcessListHandler.handle("", &env).await.unwrap();
        assert_eq!(out, vec!["desktop.py [RUNNING]", "terminal.py [SLEEPING]"]);
    }

    #[tokio::test]
    async fn empty_registry_is_empty_payload() {
        let env = Environment::from_memory(MemoryEnvironment::new());
        let out = ProcessListHandler.handle("", &env).await.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn snapshot_reflects_state_changes() {
        let mem = MemoryEnvironment::alteron();
        let env = Environment::from_memory(mem.clone());

        assert!(mem.set_state("terminal.py", ProcessState::Stopped));
        assert!(!mem.set_state("ghost.py", ProcessState::Zombie));
        assert!(mem.unregister("desktop.py"));

        let out = ProcessListHandler.handle("", &env).await.unwrap();
        assert_eq!(
            out,
            vec![
                "kernel_manager.py [RUNNING]",
                "terminal.py [STOPPED]",
                "file_manager.py [RUNNING]"
            ]
        );
    }
}
