pub mod connect;
pub mod find;
pub mod list;
pub mod process;
pub mod registry;

use async_trait::async_trait;

use crate::{
    common::{Result, TaskKind},
    provider::Environment,
};

pub use connect::ConnectHandler;
pub use find::FindHandler;
pub use list::ListHandler;
pub use process::ProcessListHandler;
pub use registry::HandlerRegistry;

// ==========================================
// 核心处理器接口 (OperationHandler)
// ==========================================

/// 操作处理器
///
/// 每种 `TaskKind` 对应一个实现。处理器只依赖自身的参数和注入的只读环境，
/// 不持有任何跨任务共享的可变状态。
///
/// - `Ok(payload)`: 有序的字符串序列，工作池原样放进 `TaskResult`。
/// - `Err(e)`: 被工作池捕获并转成 Failed 结果，不会向上传播。
#[async_trait]
pub trait OperationHandler: Send + Sync + 'static {
    /// 处理的任务类型
    fn kind(&self) -> TaskKind;

    async fn handle(&self, parameter: &str, env: &Environment) -> Result<Vec<String>>;
}
