use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::{common::PoolConfig, pool::PoolMetrics, provider::Environment};

/// 工作池上下文 (Pool Context)
///
/// **职责**:
/// 打包工作池运行所需的全局资源，避免在函数调用时传递一长串参数。
/// 插件的生命周期钩子也会拿到它。
#[derive(Clone)]
pub struct PoolContext {
    /// 池名称 (日志前缀)
    pub name: String,

    /// 全局配置
    pub config: Arc<PoolConfig>,

    /// 处理器的只读环境
    pub env: Environment,

    /// 全局统计指标
    pub metrics: Arc<PoolMetrics>,

    /// 停机信号
    ///
    /// 被取消后分发器不再等待新任务，排空队列后退出。
    pub shutdown: CancellationToken,
}

impl PoolContext {
    pub fn new(
        config: PoolConfig,
        env: Environment,
        metrics: Arc<PoolMetrics>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            name: config.name.clone(),
            config: Arc::new(config),
            env,
            metrics,
            shutdown,
        }
    }

    /// 检查是否收到停机信号
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// 并发上限 N
    pub fn concurrency(&self) -> usize {
        self.config.worker.concurrency
    }
}
