use tokio::sync::watch;

use crate::common::{TaskId, TaskKind, TaskState};

/// 提交成功后返回给调用方的任务句柄
///
/// 只用来观察状态；结果本身从 `ResultStream` 领取。
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: TaskId,
    kind: TaskKind,
    state: watch::Receiver<TaskState>,
}

impl TaskHandle {
    pub(crate) fn new(id: TaskId, kind: TaskKind, state: watch::Receiver<TaskState>) -> Self {
        Self { id, kind, state }
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    /// 当前状态快照
    pub fn state(&self) -> TaskState {
        *self.state.borrow()
    }

    pub fn is_finished(&self) -> bool {
        self.state().is_terminal()
    }

    /// 等待下一次状态变化
    ///
    /// 每个句柄独立记录已观察到的版本；任务结束且状态发送端释放后返回 `None`。
    pub async fn changed(&mut self) -> Option<TaskState> {
        self.state.changed().await.ok()?;
        Some(*self.state.borrow_and_update())
    }

    /// 等待任务进入终态
    pub async fn wait(&self) -> TaskState {
        let mut rx = self.state.clone();
        if let Ok(state) = rx.wait_for(|s| s.is_terminal()).await {
            return *state;
        }
        // 发送端已释放：返回最后一次观察到的状态
        *rx.borrow()
    }
}
