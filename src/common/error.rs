use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc::error::SendError;

use crate::common::model::TaskKind;

/// 工作池统一结果类型
///
/// 使用此别名可以简化函数签名：`fn do_something() -> Result<()>`
pub type Result<T> = std::result::Result<T, PoolError>;

#[derive(Error, Debug)]
pub enum PoolError {
    // ==========================================
    // 1. 提交与生命周期错误 (Submission & Lifecycle)
    // ==========================================
    /// 工作池已关闭
    ///
    /// - 触发场景: 调用 `shutdown()` 之后仍有调用方尝试 `submit`。
    /// - 后果: 请求被同步拒绝，任务从未进入队列。
    #[error("Pool is shutting down, rejecting new tasks.")]
    PoolClosed,

    /// 队列已满 (背压保护)
    ///
    /// - 触发场景: 等待队列达到 `queue_capacity` 上限。
    /// - 处理: 调用方应减缓提交速度，或调大 `queue_capacity`。
    #[error("Task queue is full (capacity: {0}). Backpressure triggered.")]
    QueueFull(usize),

    /// 结果尚未就绪
    ///
    /// - 触发场景: 带超时的结果拉取在超时前没有任何任务完成。
    /// - 说明: 任务本身不受影响，仍在队列或执行中。
    #[error("No result available yet.")]
    NoResultYet,

    /// 内部通信通道已关闭
    ///
    /// - 说明: 结果接收端已被 Drop，通常意味着生命周期管理出错。
    #[error("Internal communication channel closed.")]
    ChannelClosed,

    /// 配置错误
    ///
    /// - 触发场景: 解析 TOML 失败，或参数校验不通过 (如并发数为 0)。
    #[error("Configuration error: {0}")]
    Config(String),

    /// 配置文件读取失败
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    // ==========================================
    // 2. 处理器错误 (Handler Failures)
    // ==========================================
    /// 路径不存在
    #[error("Path not found: {0}")]
    PathNotFound(String),

    /// 非法路径 (包含 `..` 或 `//`)
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// 主机名为空
    #[error("Invalid host: host must not be empty")]
    InvalidHost,

    /// 握手超时
    #[error("Connection to {host} timed out after {timeout_ms} ms.")]
    Timeout { host: String, timeout_ms: u64 },

    /// 数据源不可用
    ///
    /// - 说明: Provider 自身故障时使用，与具体任务的业务失败区分开。
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// 未注册对应类型的处理器
    #[error("No handler registered for task kind '{0}'.")]
    UnsupportedKind(TaskKind),

    /// 处理器 Panic
    #[error("Handler panicked: {0}")]
    HandlerPanic(String),
}

impl From<toml::de::Error> for PoolError {
    fn from(e: toml::de::Error) -> Self {
        PoolError::Config(e.to_string())
    }
}

// 自动转换 Tokio MPSC 发送错误
impl<T> From<SendError<T>> for PoolError {
    fn from(_: SendError<T>) -> Self {
        PoolError::ChannelClosed
    }
}

/// 错误分类
///
/// 写入 `TaskFailure` 的可序列化标签，调用方据此匹配失败原因，而不必解析消息文本。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    PoolClosed,
    QueueFull,
    NoResultYet,
    PathNotFound,
    InvalidPath,
    InvalidHost,
    Timeout,
    ProviderUnavailable,
    UnsupportedKind,
    HandlerPanic,
    Internal,
}

impl PoolError {
    /// 归类错误
    ///
    /// - 处理器相关的错误保留各自的分类。
    /// - 配置、IO、通道等基础设施错误在任务层面没有意义，统一归为 `Internal`。
    pub fn kind(&self) -> ErrorKind {
        match self {
            PoolError::PoolClosed => ErrorKind::PoolClosed,
            PoolError::QueueFull(_) => ErrorKind::QueueFull,
            PoolError::NoResultYet => ErrorKind::NoResultYet,
            PoolError::PathNotFound(_) => ErrorKind::PathNotFound,
            PoolError::InvalidPath(_) => ErrorKind::InvalidPath,
            PoolError::InvalidHost => ErrorKind::InvalidHost,
            PoolError::Timeout { .. } => ErrorKind::Timeout,
            PoolError::ProviderUnavailable(_) => ErrorKind::ProviderUnavailable,
            PoolError::UnsupportedKind(_) => ErrorKind::UnsupportedKind,
            PoolError::HandlerPanic(_) => ErrorKind::HandlerPanic,
            PoolError::Config(_) | PoolError::Io(_) | PoolError::ChannelClosed => {
                ErrorKind::Internal
            }
        }
    }

    /// 是否是提交阶段的同步拒绝 (任务没有进入队列)
    pub fn is_rejection(&self) -> bool {
        matches!(self, PoolError::PoolClosed | PoolError::QueueFull(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_errors_keep_their_kind() {
        assert_eq!(
            PoolError::PathNotFound("x".into()).kind(),
            ErrorKind::PathNotFound
        );
        assert_eq!(PoolError::InvalidHost.kind(), ErrorKind::InvalidHost);
        assert_eq!(
            PoolError::Timeout {
                host: "h".into(),
                timeout_ms: 10
            }
            .kind(),
            ErrorKind::Timeout
        );
    }

    #[test]
    fn infrastructure_errors_are_internal() {
        assert_eq!(PoolError::ChannelClosed.kind(), ErrorKind::Internal);
        assert_eq!(PoolError::Config("bad".into()).kind(), ErrorKind::Internal);
    }

    #[test]
    fn only_submission_errors_are_rejections() {
        assert!(PoolError::PoolClosed.is_rejection());
        assert!(PoolError::QueueFull(4).is_rejection());
        assert!(!PoolError::NoResultYet.is_rejection());
    }
}
