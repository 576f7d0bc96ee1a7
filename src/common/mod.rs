pub mod config;
pub mod error;
pub mod model;
pub mod time;
pub(crate) mod utils;

// 导出配置
pub use config::{ConnectConfig, PoolConfig, WorkerConfig};

// 导出错误类型
pub use error::{ErrorKind, PoolError, Result};

// 导出核心模型
pub use model::{
    PoolStats, ProcessInfo, ProcessState, ResultStatus, Task, TaskFailure, TaskId, TaskKind,
    TaskResult, TaskState,
};

pub use time::{Clock, InstantClock, TimeUtils, TokioClock};
// 内部工具的快捷访问
pub(crate) use utils::new_task_id;
