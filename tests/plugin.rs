//! 插件钩子的调用时机。

use std::sync::Arc;

use aosfs_pool::{
    Environment, MemoryEnvironment, Task, TaskKind, WorkerPool,
    common::TaskFailure,
    pool::{PoolContext, PoolPlugin},
};
use async_trait::async_trait;
use parking_lot::Mutex;

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
}

impl Recorder {
    fn push(&self, event: String) {
        self.events.lock().push(event);
    }
}

struct RecordingPlugin(Arc<Recorder>);

#[async_trait]
impl PoolPlugin for RecordingPlugin {
    async fn on_start(&self, ctx: &PoolContext) {
        self.0.push(format!("start:{}", ctx.concurrency()));
    }

    async fn on_shutdown(&self, _ctx: &PoolContext) {
        self.0.push("shutdown".to_string());
    }

    async fn on_success(&self, task: &Task, payload: &[String]) {
        self.0.push(format!("success:{}:{}", task.kind, payload.len()));
    }

    async fn on_failure(&self, task: &Task, failure: &TaskFailure) {
        self.0.push(format!("failure:{}:{:?}", task.kind, failure.kind));
    }

    fn on_cancel(&self, task: &Task) {
        self.0.push(format!("cancel:{}", task.kind));
    }
}

#[tokio::test]
async fn hooks_follow_the_task_lifecycle() {
    let recorder = Arc::new(Recorder::default());
    let pool = WorkerPool::builder()
        .with_concurrency(1)
        .with_environment(Environment::from_memory(MemoryEnvironment::alteron()))
        .with_plugin(RecordingPlugin(recorder.clone()))
        .build()
        .unwrap();

    pool.submit(Task::list("/")).unwrap();
    pool.submit(Task::list("Ghost.dir")).unwrap();
    pool.results().take(2).await;
    pool.shutdown(true).await;

    let events = recorder.events.lock().clone();
    assert_eq!(
        events,
        vec![
            "start:1".to_string(),
            format!("success:{}:7", TaskKind::List),
            format!("failure:{}:PathNotFound", TaskKind::List),
            "shutdown".to_string(),
        ]
    );
}

#[tokio::test]
async fn cancelled_tasks_reach_on_cancel() {
    let recorder = Arc::new(Recorder::default());
    let pool = WorkerPool::builder()
        .with_concurrency(1)
        .with_plugin(RecordingPlugin(recorder.clone()))
        .build()
        .unwrap();

    // 分发器尚未运行时立即非排空停机：任务仍在队列中
    pool.submit(Task::process_list()).unwrap();
    pool.shutdown(false).await;

    let events = recorder.events.lock().clone();
    assert!(events.contains(&format!("cancel:{}", TaskKind::ProcessList)));
    assert_eq!(pool.stats().cancelled, 1);
}
