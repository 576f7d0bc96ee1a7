use std::{sync::Arc, time::Duration};

use futures::Stream;
use tokio::sync::{
    Mutex,
    mpsc::{UnboundedReceiver, error::TryRecvError},
};

use crate::common::{PoolError, Result, TaskResult};

const PREALLOC_LIMIT: usize = 1024;

/// 结果通道的消费端
///
/// - 结果按**完成顺序**交付，调用方需要通过 `task_id` 关联提交顺序。
/// - 可以 Clone；多个消费者竞争同一个缓冲区，每个结果只会被领取一次。
/// - 工作池 `shutdown` 完成且缓冲区读空后，`next` 返回 `None`。
#[derive(Clone)]
pub struct ResultStream {
    rx: Arc<Mutex<UnboundedReceiver<TaskResult>>>,
}

impl ResultStream {
    pub(crate) fn new(rx: Arc<Mutex<UnboundedReceiver<TaskResult>>>) -> Self {
        Self { rx }
    }

    /// 等待下一个结果
    pub async fn next(&self) -> Option<TaskResult> {
        self.rx.lock().await.recv().await
    }

    /// 带超时地等待下一个结果
    ///
    /// - `Ok(Some(r))`: 拿到结果
    /// - `Ok(None)`: 工作池已停机且结果已全部交付
    /// - `Err(NoResultYet)`: 超时，在途任务不受影响
    pub async fn next_timeout(&self, timeout: Duration) -> Result<Option<TaskResult>> {
        tokio::time::timeout(timeout, self.next())
            .await
            .map_err(|_| PoolError::NoResultYet)
    }

    /// 非阻塞轮询
    pub fn try_next(&self) -> Result<Option<TaskResult>> {
        let mut rx = self.rx.try_lock().map_err(|_| PoolError::NoResultYet)?;
        match rx.try_recv() {
            Ok(res) => Ok(Some(res)),
            Err(TryRecvError::Empty) => Err(PoolError::NoResultYet),
            Err(TryRecvError::Disconnected) => Ok(None),
        }
    }

    /// 领取恰好 `n` 个结果；通道提前关闭时返回已拿到的部分
    pub async fn take(&self, n: usize) -> Vec<TaskResult> {
        // n 只是上限，不按它预分配
        let mut out = Vec::with_capacity(n.min(PREALLOC_LIMIT));
        while out.len() < n {
            match self.next().await {
                Some(res) => out.push(res),
                None => break,
            }
        }
        out
    }

    /// 转成惰性 `Stream`
    pub fn into_stream(self) -> impl Stream<Item = TaskResult> + Send + 'static {
        futures::stream::unfold(self, |s| async move {
            let next = s.next().await;
            next.map(|res| (res, s))
        })
    }
}
