use std::{collections::HashMap, sync::Arc};

use ahash::RandomState;
use async_trait::async_trait;

use crate::{
    common::{ConnectConfig, PoolError, Result, Task, TaskKind},
    handler::{
        ConnectHandler, FindHandler, ListHandler, OperationHandler, ProcessListHandler,
    },
    provider::Environment,
};

// =========================================================
// 闭包处理器 (The Generic Wrapper)
// =========================================================

/// 把一个异步闭包包装成处理器
///
/// 闭包拿到参数和环境的拥有所有权的副本，便于在 `async move` 中使用。
struct FnHandler<F> {
    kind: TaskKind,
    func: F,
}

#[async_trait]
impl<F, Fut> OperationHandler for FnHandler<F>
where
    F: Fn(String, Environment) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<String>>> + Send + 'static,
{
    fn kind(&self) -> TaskKind {
        self.kind
    }

    async fn handle(&self, parameter: &str, env: &Environment) -> Result<Vec<String>> {
        (self.func)(parameter.to_string(), env.clone()).await
    }
}

// =========================================================
// HandlerRegistry (API 入口)
// =========================================================

/// 任务类型 -> 处理器 的注册表
///
/// 构建后只读，Clone 只增加引用计数。
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: Arc<HashMap<TaskKind, Arc<dyn OperationHandler>, RandomState>>,
}

impl HandlerRegistry {
    /// 空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册四个内置处理器
    pub fn with_defaults(connect: ConnectConfig) -> Self {
        Self::new()
            .register(ListHandler)
            .register(FindHandler)
            .register(ConnectHandler::new(connect))
            .register(ProcessListHandler)
    }

    /// 注册处理器 (Builder 模式)，同类型的旧处理器会被替换
    pub fn register<H: OperationHandler>(self, handler: H) -> Self {
        let kind = handler.kind();
        self.insert(kind, Arc::new(handler))
    }

    /// 注册异步闭包
    pub fn register_fn<F, Fut>(self, kind: TaskKind, func: F) -> Self
    where
        F: Fn(String, Environment) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<String>>> + Send + 'static,
    {
        self.insert(kind, Arc::new(FnHandler { kind, func }))
    }

    /// 把另一张表的处理器覆盖到当前表上
    pub fn merge(self, other: HandlerRegistry) -> Self {
        other
            .handlers
            .iter()
            .fold(self, |acc, (kind, handler)| acc.insert(*kind, handler.clone()))
    }

    pub fn get(&self, kind: TaskKind) -> Option<&Arc<dyn OperationHandler>> {
        self.handlers.get(&kind)
    }

    pub fn contains(&self, kind: TaskKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// 查找并调用对应处理器，恰好一次
    pub async fn dispatch(&self, task: &Task, env: &Environment) -> Result<Vec<String>> {
        match self.handlers.get(&task.kind) {
            Some(handler) => handler.handle(&task.parameter, env).await,
            None => Err(PoolError::UnsupportedKind(task.kind)),
        }
    }

    // 私有方法
    fn insert(mut self, kind: TaskKind, handler: Arc<dyn OperationHandler>) -> Self {
        let mut handlers = Arc::try_unwrap(self.handlers).unwrap_or_else(|h| (*h).clone());
        handlers.insert(kind, handler);
        self.handlers = Arc::new(handlers);
        self
    }
}
