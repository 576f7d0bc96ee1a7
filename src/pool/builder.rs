use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    common::{PoolConfig, Result, TaskKind},
    handler::{HandlerRegistry, OperationHandler},
    pool::{PoolContext, PoolMetrics, PoolPlugin, WorkerPool, plugins::MetricsPlugin},
    provider::Environment,
};

/// 工作池构造器 (Builder Pattern)
pub struct PoolBuilder {
    /// 全局配置
    config: Option<PoolConfig>,
    /// 处理器运行环境
    env: Option<Environment>,
    /// 处理器注册表
    registry: Option<HandlerRegistry>,
    /// 单独注册的处理器，构建时覆盖到注册表之上
    overrides: HandlerRegistry,
    /// 插件列表
    plugins: Vec<Box<dyn PoolPlugin>>,
    /// 外部停机信号 (可选注入，用于多组件协同)
    shutdown: Option<CancellationToken>,
}

impl Default for PoolBuilder {
    /// 创建一个新的构造器
    ///
    /// **默认行为**:
    /// - Config: Default (并发数 = CPU 核数)
    /// - Environment: AlteronOS 内存布局 + 真实时钟
    /// - Registry: 四个内置处理器
    fn default() -> Self {
        Self {
            config: None,
            env: None,
            registry: None,
            overrides: HandlerRegistry::new(),
            plugins: Vec::new(),
            shutdown: None,
        }
    }
}

impl PoolBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置配置
    pub fn with_config(mut self, config: PoolConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// 只覆盖并发上限
    pub fn with_concurrency(mut self, n: usize) -> Self {
        let config = self.config.take().unwrap_or_default();
        self.config = Some(config.with_concurrency(n));
        self
    }

    /// 设置运行环境
    pub fn with_environment(mut self, env: Environment) -> Self {
        self.env = Some(env);
        self
    }

    /// 设置完整的处理器注册表 (替换内置处理器)
    pub fn with_registry(mut self, registry: HandlerRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// 注册/替换单个处理器
    pub fn with_handler<H: OperationHandler>(mut self, handler: H) -> Self {
        self.overrides = self.overrides.register(handler);
        self
    }

    /// 注册异步闭包处理器
    pub fn with_handler_fn<F, Fut>(mut self, kind: TaskKind, func: F) -> Self
    where
        F: Fn(String, Environment) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<String>>> + Send + 'static,
    {
        self.overrides = self.overrides.register_fn(kind, func);
        self
    }

    /// 添加插件 (支持链式调用)
    ///
    /// **注意**: 插件的执行顺序与添加顺序一致 (FIFO)。
    pub fn with_plugin<PL: PoolPlugin>(mut self, plugin: PL) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// 注入外部停机信号
    ///
    /// 信号被取消后工作池不再接收新任务，并把已排队的任务跑完；
    /// 结果通道仍需调用 `shutdown` 才会关闭。
    pub fn with_shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = Some(token);
        self
    }

    /// 构建并启动工作池 (必须在 Tokio 运行时内调用)
    pub fn build(mut self) -> Result<WorkerPool> {
        let config = self.config.take().unwrap_or_default();
        config.validate()?;

        let registry = self
            .registry
            .take()
            .unwrap_or_else(|| HandlerRegistry::with_defaults(config.connect.clone()))
            .merge(std::mem::take(&mut self.overrides));
        let env = self.env.take().unwrap_or_default();

        // 自动注入 MetricsPlugin
        let metrics = Arc::new(PoolMetrics::default());
        let mut plugins = std::mem::take(&mut self.plugins);
        plugins.insert(0, Box::new(MetricsPlugin::new(metrics.clone())));

        // 初始化停机 Token：外部信号只向下传播，工作池自身停机不会取消外部信号
        let token = self
            .shutdown
            .take()
            .map(|t| t.child_token())
            .unwrap_or_default();

        debug!(
            "Pool build: name={} concurrency={} queue_capacity={}",
            config.name, config.worker.concurrency, config.worker.queue_capacity
        );
        let ctx = PoolContext::new(config, env, metrics, token);
        Ok(WorkerPool::start(ctx, registry, plugins))
    }
}
