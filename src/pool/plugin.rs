use std::time::Duration;

use async_trait::async_trait;

use crate::{
    common::{Task, TaskFailure},
    pool::PoolContext,
};

/// 工作池插件/钩子接口
///
/// 用户可以通过实现此 Trait 来介入任务的生命周期。
/// 常见用途：
/// - 自定义日志/监控 (Metrics)
/// - 错误报警 (Alerting)
///
/// 插件按注册顺序执行，内置的 `MetricsPlugin` 永远排在第一位。
#[async_trait]
pub trait PoolPlugin: Send + Sync + 'static {
    /// [生命周期] 分发器启动时调用
    async fn on_start(&self, _ctx: &PoolContext) {}

    /// [生命周期] 停机完成、结果通道关闭前调用
    async fn on_shutdown(&self, _ctx: &PoolContext) {}

    /// [任务] 任务进入 Running 后、处理器执行前调用
    async fn before_execute(&self, _task: &Task) {}

    /// [执行后] 处理器返回 (无论成功失败，包括 Panic)
    async fn after_execute(&self, _task: &Task, _elapsed: Duration) {}

    /// [执行成功]
    async fn on_success(&self, _task: &Task, _payload: &[String]) {}

    /// [执行失败] 处理器返回 Err 或 Panic
    async fn on_failure(&self, _task: &Task, _failure: &TaskFailure) {}

    /// [取消] 排队中的任务被取消
    ///
    /// 在队列锁内同步调用，实现必须轻量且不能阻塞。
    fn on_cancel(&self, _task: &Task) {}
}

