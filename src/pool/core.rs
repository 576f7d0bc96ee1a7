use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures::FutureExt;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::{Notify, OwnedSemaphorePermit, Semaphore, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, error, trace, warn};

use crate::common::{
    PoolError, PoolStats, Result, Task, TaskFailure, TaskId, TaskKind, TaskResult, TaskState,
};
use crate::handler::HandlerRegistry;
use crate::pool::{
    PoolContext, PoolPlugin, builder::PoolBuilder, handle::TaskHandle, results::ResultStream,
};

/// 排队中的任务：任务本体 + 状态发送端
struct QueuedTask {
    task: Task,
    state: watch::Sender<TaskState>,
}

/// 等待队列 (FIFO) 与准入开关
struct QueueState {
    pending: VecDeque<QueuedTask>,
    /// `shutdown` 开始后置为 false
    accepting: bool,
}

struct RunningTaskHandle {
    kind: TaskKind,
    started_at: Instant,
}

/// 分发器一次取队列的结果 (在队列锁内判定)
enum Dispatch {
    /// 取到队头任务
    Run(QueuedTask),
    /// 队列为空，等待新任务
    Idle,
    /// 队列为空且已收到停机信号
    Exit,
}

/// 工作池 Inner 结构体
struct PoolInner {
    /// 全局上下文
    ctx: PoolContext,
    /// 任务类型 -> 处理器
    registry: HandlerRegistry,
    /// 等待队列，唯一的提交/完成临界区
    queue: Mutex<QueueState>,
    /// 正在运行的任务注册表 (ID -> 类型/开始时间)
    running: DashMap<TaskId, RunningTaskHandle>,
    /// 并发控制信号量 (N 个许可)
    semaphore: Arc<Semaphore>,
    /// 插件系统
    plugins: Vec<Box<dyn PoolPlugin>>,
    /// 新任务入队通知
    notify: Notify,
    /// 结果发送端；停机完成后被取走，通道随之关闭
    results_tx: Mutex<Option<mpsc::UnboundedSender<TaskResult>>>,
    /// 结果接收端 (所有 ResultStream 共享)
    results_rx: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<TaskResult>>>,
    /// 分发器协程句柄
    dispatcher: Mutex<Option<JoinHandle<()>>>,
    /// 停机完成信号
    closed: CancellationToken,
}

/// 并发工作池 (The Engine)
///
/// - `submit` 同步入队，非阻塞。
/// - 单个分发器协程按 FIFO 取任务，持有信号量许可后 spawn 执行，保证同时运行的任务数 <= N。
/// - 结果按完成顺序写入结果通道，由 `results()` 领取。
///
/// 必须在 Tokio 运行时内构建。最后一个 `WorkerPool` 句柄被 Drop 时，
/// 工作池按排空模式自行停止，剩余结果交付完后结果通道关闭。
pub struct WorkerPool {
    inner: Arc<PoolInner>, // 减轻 Arc Clone
    /// 所有用户句柄共享；最后一个被 Drop 时取消停机信号
    _guard: Arc<DropGuard>,
}

impl Clone for WorkerPool {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _guard: self._guard.clone(),
        }
    }
}

impl WorkerPool {
    /// 创建一个 Builder
    pub fn builder() -> PoolBuilder {
        PoolBuilder::default()
    }

    /// 构造并启动分发器
    pub(crate) fn start(
        ctx: PoolContext,
        registry: HandlerRegistry,
        plugins: Vec<Box<dyn PoolPlugin>>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let concurrency = ctx.concurrency();
        let guard = ctx.shutdown.clone().drop_guard();
        let inner = Arc::new(PoolInner {
            ctx,
            registry,
            queue: Mutex::new(QueueState {
                pending: VecDeque::new(),
                accepting: true,
            }),
            running: DashMap::new(),
            semaphore: Arc::new(Semaphore::new(concurrency)),
            plugins,
            notify: Notify::new(),
            results_tx: Mutex::new(Some(tx)),
            results_rx: Arc::new(tokio::sync::Mutex::new(rx)),
            dispatcher: Mutex::new(None),
            closed: CancellationToken::new(),
        });

        // 分发器只持有 Inner，不持有用户句柄，否则 DropGuard 永远不会触发
        let handle = tokio::spawn(inner.clone().dispatch_loop());
        *inner.dispatcher.lock() = Some(handle);

        debug!("[Pool-{}] Ready. concurrency={}", inner.ctx.name, concurrency);
        Self {
            inner,
            _guard: Arc::new(guard),
        }
    }

    // ==========================================
    // Public API
    // ==========================================

    /// 提交任务
    ///
    /// - 停机开始后返回 `PoolClosed`。
    /// - 等待队列已满时返回 `QueueFull`。
    /// - 被拒绝的任务不算“已提交”，不会产生结果。
    pub fn submit(&self, task: Task) -> Result<TaskHandle> {
        let (state_tx, state_rx) = watch::channel(TaskState::Submitted);
        let id = task.id.clone();
        let kind = task.kind;
        {
            let mut queue = self.inner.queue.lock();
            if !queue.accepting || self.inner.ctx.is_shutdown() {
                return Err(PoolError::PoolClosed);
            }
            let capacity = self.inner.ctx.config.worker.queue_capacity;
            if queue.pending.len() >= capacity {
                return Err(PoolError::QueueFull(capacity));
            }
            state_tx.send_replace(TaskState::Queued);
            queue.pending.push_back(QueuedTask {
                task,
                state: state_tx,
            });
        }
        self.inner.notify.notify_one();
        trace!("[Pool-{}] Task {} ({}) queued.", self.inner.ctx.name, id, kind);
        Ok(TaskHandle::new(id, kind, state_rx))
    }

    /// 取消一个仍在排队的任务
    ///
    /// 返回 `true` 表示已取消并产生了 `Cancelled` 结果；
    /// 运行中、已结束或未知的任务返回 `false`。
    pub fn cancel(&self, task_id: &TaskId) -> bool {
        let mut queue = self.inner.queue.lock();
        let Some(pos) = queue.pending.iter().position(|q| &q.task.id == task_id) else {
            return false;
        };
        if let Some(queued) = queue.pending.remove(pos) {
            self.inner.finish_cancelled(queued);
            trace!("[Pool-{}] Task {} cancelled.", self.inner.ctx.name, task_id);
            return true;
        }
        false
    }

    /// 结果消费端
    pub fn results(&self) -> ResultStream {
        ResultStream::new(self.inner.results_rx.clone())
    }

    /// 停机
    ///
    /// - `drain = true`: 停止接收新任务，等待排队中和运行中的任务全部完成。
    /// - `drain = false`: 停止接收新任务，排队中的任务立即标记为 `Cancelled`；
    ///   运行中的任务不可抢占，等待其自然结束。
    ///
    /// 返回时所有结果都已写入结果通道，通道随后关闭。可重复调用。
    pub async fn shutdown(&self, drain: bool) {
        let inner = &self.inner;
        let cancelled = {
            let mut queue = inner.queue.lock();
            queue.accepting = false;
            if drain {
                0
            } else {
                let n = queue.pending.len();
                for queued in queue.pending.drain(..) {
                    inner.finish_cancelled(queued);
                }
                n
            }
        };
        debug!(
            "[Pool-{}] Shutdown triggered. drain={} cancelled={}",
            inner.ctx.name, drain, cancelled
        );
        inner.ctx.shutdown.cancel();

        let dispatcher = inner.dispatcher.lock().take();
        let Some(dispatcher) = dispatcher else {
            // 另一个调用方正在执行停机流程
            inner.closed.cancelled().await;
            return;
        };

        // 1. 等待分发器退出 (排空模式下它会先把队列跑完)
        if let Err(e) = dispatcher.await {
            error!("[Pool-{}] Dispatcher crashed: {:?}", inner.ctx.name, e);
        }

        // 2. 收回全部许可 = 所有在途任务都已结束
        let n = inner.ctx.concurrency() as u32;
        match inner.semaphore.acquire_many(n).await {
            Ok(permits) => permits.forget(),
            Err(_) => warn!("[Pool-{}] Semaphore closed early.", inner.ctx.name),
        }
        inner.semaphore.close();

        // [Hook] 关闭
        for p in inner.plugins.iter() {
            p.on_shutdown(&inner.ctx).await;
        }

        // 3. 关闭结果通道 (在队列锁内，保证不会有迟到的取消结果)
        {
            let _queue = inner.queue.lock();
            inner.results_tx.lock().take();
        }
        inner.closed.cancel();
        debug!("[Pool-{}] Shutdown complete.", inner.ctx.name);
    }

    /// 运行时统计快照
    pub fn stats(&self) -> PoolStats {
        let metrics = &self.inner.ctx.metrics;
        PoolStats {
            pending: self.inner.queue.lock().pending.len(),
            running: metrics.active(),
            completed: metrics.total_success.load(Ordering::Relaxed),
            failed: metrics.total_failure.load(Ordering::Relaxed),
            cancelled: metrics.total_cancelled.load(Ordering::Relaxed),
            peak_running: metrics.peak(),
        }
    }

    /// 正在运行的任务 (ID, 类型, 已运行时长)
    pub fn running_tasks(&self) -> Vec<(TaskId, TaskKind, Duration)> {
        self.inner
            .running
            .iter()
            .map(|entry| {
                (
                    entry.key().clone(),
                    entry.value().kind,
                    entry.value().started_at.elapsed(),
                )
            })
            .collect()
    }

    pub fn concurrency(&self) -> usize {
        self.inner.ctx.concurrency()
    }

    pub fn name(&self) -> &str {
        &self.inner.ctx.name
    }

    /// 是否已停止接收新任务
    pub fn is_closed(&self) -> bool {
        !self.inner.queue.lock().accepting || self.inner.ctx.is_shutdown()
    }
}

// ==========================================
// Core Logic: 分发与执行
// ==========================================
impl PoolInner {
    /// 分发主循环
    ///
    /// 职责：
    /// 1. 申请并发许可 (Semaphore)。
    /// 2. 从等待队列头部取任务，标记 Running。
    /// 3. 异步分发任务 (Spawn)，许可随执行结束归还。
    /// 4. 收到停机信号且队列已空时退出。
    async fn dispatch_loop(self: Arc<Self>) {
        // [Hook] 启动
        for p in self.plugins.iter() {
            p.on_start(&self.ctx).await;
        }
        trace!("[Pool-{}] Dispatcher started.", self.ctx.name);

        loop {
            // 先占座，再取任务：拿不到许可说明已有 N 个任务在跑
            let permit = match self.semaphore.clone().acquire_owned().await {
                Ok(p) => p,
                Err(_) => break, // 信号量被关闭
            };

            let next = loop {
                match self.pop_next() {
                    Dispatch::Run(queued) => break Some(queued),
                    Dispatch::Exit => break None,
                    Dispatch::Idle => {
                        // notify_one 会在没有等待者时保存一个许可，不会丢唤醒
                        tokio::select! {
                            _ = self.notify.notified() => {}
                            _ = self.ctx.shutdown.cancelled() => {}
                        }
                    }
                }
            };

            match next {
                Some(queued) => self.spawn_task(queued, permit),
                None => break,
            }
        }
        trace!("[Pool-{}] Dispatcher exited.", self.ctx.name);
    }

    /// 出队并进入 Running
    ///
    /// 队列是否为空与停机信号在同一把锁内判定：`submit` 也在这把锁内检查停机信号，
    /// 所以分发器退出后不可能再有任务被接受。
    fn pop_next(&self) -> Dispatch {
        let mut queue = self.queue.lock();
        let Some(queued) = queue.pending.pop_front() else {
            return if self.ctx.is_shutdown() {
                Dispatch::Exit
            } else {
                Dispatch::Idle
            };
        };
        self.running.insert(
            queued.task.id.clone(),
            RunningTaskHandle {
                kind: queued.task.kind,
                started_at: Instant::now(),
            },
        );
        queued.state.send_replace(TaskState::Running);
        Dispatch::Run(queued)
    }

    /// 任务分发
    fn spawn_task(self: &Arc<Self>, queued: QueuedTask, permit: OwnedSemaphorePermit) {
        let inner = self.clone();
        tokio::spawn(async move {
            // 所有权转移：许可移动到了这个 Future 内部。
            // 无论 execute_task 是成功、失败还是 Panic，
            // 只要这个 async 块结束，permit 就会被 Drop，从而归还信号量。
            let _permit = permit;
            inner.execute_task(queued).await;
        });
    }

    /// 执行任务：恰好调用一次处理器，恰好产生一个结果
    async fn execute_task(&self, queued: QueuedTask) {
        let QueuedTask { task, state } = queued;
        let env = &self.ctx.env;

        // [Hook] 执行前
        for p in self.plugins.iter() {
            p.before_execute(&task).await;
        }
        let started = Instant::now();
        let outcome = AssertUnwindSafe(self.registry.dispatch(&task, env))
            .catch_unwind()
            .await;
        let elapsed = started.elapsed();
        // [Hook] 执行后 (通用)
        for p in self.plugins.iter() {
            p.after_execute(&task, elapsed).await;
        }

        let completed_at = env.clock.now();
        let result = match outcome {
            Ok(Ok(payload)) => {
                // [Hook] 成功钩子
                for p in self.plugins.iter() {
                    p.on_success(&task, &payload).await;
                }
                TaskResult::success(&task, payload, completed_at)
            }
            Ok(Err(e)) => {
                debug!(
                    "[Pool-{}] Task {} ({}) failed: {}",
                    self.ctx.name, task.id, task.kind, e
                );
                self.handle_failure(&task, e, completed_at).await
            }
            Err(panic_err) => {
                let msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_err.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown error".to_string()
                };
                error!("[Pool-{}] Task {} panicked: {}", self.ctx.name, task.id, msg);
                self.handle_failure(&task, PoolError::HandlerPanic(msg), completed_at)
                    .await
            }
        };

        self.running.remove(&task.id);
        let terminal = result.state();
        self.deliver(result);
        state.send_replace(terminal);
    }

    /// 处理任务失败：失败被收敛成结果，不向上传播
    async fn handle_failure(
        &self,
        task: &Task,
        err: PoolError,
        completed_at: DateTime<Utc>,
    ) -> TaskResult {
        let failure = TaskFailure::from(&err);
        // [Hook] 失败钩子
        for p in self.plugins.iter() {
            p.on_failure(task, &failure).await;
        }
        TaskResult::failure(task, &err, completed_at)
    }

    /// 生成取消结果 (调用方必须持有队列锁)
    fn finish_cancelled(&self, queued: QueuedTask) {
        let QueuedTask { task, state } = queued;
        for p in self.plugins.iter() {
            p.on_cancel(&task);
        }
        let result = TaskResult::cancelled(&task, self.ctx.env.clock.now());
        self.deliver(result);
        state.send_replace(TaskState::Cancelled);
    }

    /// 写入结果通道
    fn deliver(&self, result: TaskResult) {
        let tx = self.results_tx.lock();
        let sent = match tx.as_ref() {
            Some(tx) => tx.send(result).map_err(PoolError::from),
            None => Err(PoolError::ChannelClosed),
        };
        if let Err(e) = sent {
            error!("[Pool-{}] Result delivery failed: {}", self.ctx.name, e);
        }
    }
}
