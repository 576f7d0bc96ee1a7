use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::common::{ErrorKind, PoolError, TimeUtils, new_task_id};

// ==========================================
// 1. 任务标识 (TaskId)
// ==========================================

/// 全局唯一的任务 ID (NanoID)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new() -> Self {
        Self(new_task_id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ==========================================
// 2. 任务类型 (TaskKind)
// ==========================================

/// 任务类型，每种类型对应一个处理器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// 列出目录
    List,
    /// 按子串查找路径
    Find,
    /// 模拟建立连接
    Connect,
    /// 列出进程表
    ProcessList,
}

impl TaskKind {
    pub const ALL: [TaskKind; 4] = [
        TaskKind::List,
        TaskKind::Find,
        TaskKind::Connect,
        TaskKind::ProcessList,
    ];

    /// 命令行短名
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::List => "ls",
            TaskKind::Find => "find",
            TaskKind::Connect => "connect",
            TaskKind::ProcessList => "ps",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ls" | "list" => Ok(TaskKind::List),
            "find" => Ok(TaskKind::Find),
            "connect" => Ok(TaskKind::Connect),
            "ps" | "process-list" | "process_list" => Ok(TaskKind::ProcessList),
            other => Err(format!("unknown task kind '{other}'")),
        }
    }
}

// ==========================================
// 3. 任务状态枚举 (TaskState)
// ==========================================

/// 任务生命周期状态
///
/// `Submitted -> Queued -> Running -> {Completed | Failed | Cancelled}`
///
/// 即使被立即分发，任务也一定经过 `Queued` (停留时间可以为零)。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskState {
    /// 调用方已创建，尚未入队
    Submitted,
    /// 在等待队列中
    Queued,
    /// 已被分发器取出，处理器执行中
    Running,
    /// 执行成功
    Completed,
    /// 处理器返回错误或 Panic
    Failed,
    /// 排队期间被取消 (单个取消或非排空停机)
    Cancelled,
}

impl TaskState {
    /// 状态是否是终态（不可流转）
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Failed | TaskState::Cancelled
        )
    }
}

// ==========================================
// 4. 任务 (Task)
// ==========================================

/// 提交给工作池的任务，提交后不可变
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub kind: TaskKind,
    /// 输入参数：路径 / 模式 / 主机名；`ProcessList` 忽略此字段
    pub parameter: String,
    pub submitted_at: DateTime<Utc>,
}

impl Task {
    pub fn new(kind: TaskKind, parameter: impl Into<String>) -> Self {
        Self {
            id: TaskId::new(),
            kind,
            parameter: parameter.into(),
            submitted_at: TimeUtils::now(),
        }
    }

    pub fn list(path: impl Into<String>) -> Self {
        Self::new(TaskKind::List, path)
    }

    pub fn find(pattern: impl Into<String>) -> Self {
        Self::new(TaskKind::Find, pattern)
    }

    pub fn connect(host: impl Into<String>) -> Self {
        Self::new(TaskKind::Connect, host)
    }

    pub fn process_list() -> Self {
        Self::new(TaskKind::ProcessList, "")
    }

    /// 指定任务 ID (调用方自行保证唯一)
    pub fn with_id(mut self, id: impl Into<TaskId>) -> Self {
        self.id = id.into();
        self
    }
}

// ==========================================
// 5. 执行结果 (TaskResult)
// ==========================================

/// 失败详情
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&PoolError> for TaskFailure {
    fn from(e: &PoolError) -> Self {
        Self {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    Success,
    Failure(TaskFailure),
    Cancelled,
}

/// 任务结果
///
/// - 由工作池在任务结束时创建，交付给调用方后不可变。
/// - 每个已提交的任务恰好产生一个结果。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_id: TaskId,
    pub kind: TaskKind,
    pub status: ResultStatus,
    pub payload: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

impl TaskResult {
    pub fn success(task: &Task, payload: Vec<String>, at: DateTime<Utc>) -> Self {
        Self {
            task_id: task.id.clone(),
            kind: task.kind,
            status: ResultStatus::Success,
            payload,
            completed_at: at,
        }
    }

    pub fn failure(task: &Task, err: &PoolError, at: DateTime<Utc>) -> Self {
        Self {
            task_id: task.id.clone(),
            kind: task.kind,
            status: ResultStatus::Failure(err.into()),
            payload: Vec::new(),
            completed_at: at,
        }
    }

    pub fn cancelled(task: &Task, at: DateTime<Utc>) -> Self {
        Self {
            task_id: task.id.clone(),
            kind: task.kind,
            status: ResultStatus::Cancelled,
            payload: Vec::new(),
            completed_at: at,
        }
    }

    /// 结果对应的终态
    pub fn state(&self) -> TaskState {
        match self.status {
            ResultStatus::Success => TaskState::Completed,
            ResultStatus::Failure(_) => TaskState::Failed,
            ResultStatus::Cancelled => TaskState::Cancelled,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, ResultStatus::Success)
    }

    pub fn failure_kind(&self) -> Option<ErrorKind> {
        match &self.status {
            ResultStatus::Failure(f) => Some(f.kind),
            _ => None,
        }
    }
}

// ==========================================
// 6. 进程表条目 (ProcessInfo)
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessState {
    Running,
    Sleeping,
    Stopped,
    Zombie,
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProcessState::Running => "RUNNING",
            ProcessState::Sleeping => "SLEEPING",
            ProcessState::Stopped => "STOPPED",
            ProcessState::Zombie => "ZOMBIE",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub name: String,
    pub state: ProcessState,
}

impl ProcessInfo {
    pub fn new(name: impl Into<String>, state: ProcessState) -> Self {
        Self {
            name: name.into(),
            state,
        }
    }

    pub fn running(name: impl Into<String>) -> Self {
        Self::new(name, ProcessState::Running)
    }
}

// ==========================================
// 7. 统计指标 (PoolStats)
// ==========================================

/// 工作池运行时统计快照
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// 排队中任务数
    pub pending: usize,
    /// 运行中任务数
    pub running: usize,
    /// 成功任务计数 (累计)
    pub completed: u64,
    /// 失败任务计数 (累计)
    pub failed: u64,
    /// 取消任务计数 (累计)
    pub cancelled: u64,
    /// 同时运行任务数的历史峰值
    pub peak_running: usize,
}
