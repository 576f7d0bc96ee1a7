// 1. 基础模块
pub mod common;

// 2. 运行环境与处理器
pub mod handler;
pub mod provider;

// 3. 工作池核心
pub mod pool;

// 4. 命令行
pub mod cli;

pub use common::{
    ErrorKind, PoolConfig, PoolError, PoolStats, Result, Task, TaskId, TaskKind, TaskResult,
    TaskState,
};
pub use handler::{HandlerRegistry, OperationHandler};
pub use pool::{PoolBuilder, ResultStream, TaskHandle, WorkerPool};
pub use provider::{Environment, MemoryEnvironment};
