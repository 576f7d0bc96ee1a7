use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::Path, time::Duration};

use crate::common::{PoolError, Result, TimeUtils, utils::default_pool_name};

// ==========================================
// 1. 资源配置 (WorkerConfig)
// ==========================================
/// 并发与队列配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// 并发上限 N
    ///
    /// - 说明: 同时处于 Running 状态的任务数量上限，构造后不可变。
    /// - 默认值: 系统逻辑核心数 (`num_cpus::get()`)
    pub concurrency: usize,

    /// 等待队列容量
    ///
    /// - 说明: 排队中 (尚未开始) 的任务数量上限，超过后 `submit` 返回 `QueueFull`。
    /// - 默认值: 1024
    pub queue_capacity: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: num_cpus::get(),
            queue_capacity: 1024,
        }
    }
}

// ==========================================
// 2. 连接配置 (ConnectConfig)
// ==========================================

/// 模拟连接的握手参数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectConfig {
    /// 握手超时 (毫秒)
    ///
    /// - 默认值: 5000 ms
    pub timeout_ms: u64,

    /// 默认模拟握手耗时 (毫秒)
    ///
    /// - 默认值: 1000 ms
    pub handshake_ms: u64,

    /// 按主机覆盖握手耗时
    ///
    /// - 用于模拟慢主机，例如 `{"slow.example" = 9000}`。
    pub host_latency_ms: HashMap<String, u64>,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            handshake_ms: 1000,
            host_latency_ms: HashMap::new(),
        }
    }
}

impl ConnectConfig {
    pub fn timeout(&self) -> Duration {
        TimeUtils::millis(self.timeout_ms)
    }

    /// 某个主机的模拟握手耗时
    pub fn handshake_for(&self, host: &str) -> Duration {
        let ms = self
            .host_latency_ms
            .get(host)
            .copied()
            .unwrap_or(self.handshake_ms);
        TimeUtils::millis(ms)
    }
}

// ==========================================
// 3. 总配置入口 (PoolConfig)
// ==========================================

/// 工作池总配置
///
/// 分层结构，支持 `serde`，可直接从 TOML 加载：
///
/// ```toml
/// name = "aosfs"
///
/// [worker]
/// concurrency = 4
/// queue_capacity = 256
///
/// [connect]
/// timeout_ms = 2000
/// handshake_ms = 100
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// 资源与并发
    #[serde(default)]
    pub worker: WorkerConfig,

    /// 连接模拟
    #[serde(default)]
    pub connect: ConnectConfig,

    /// 池名称 (日志前缀)
    #[serde(default = "default_pool_name")]
    pub name: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            worker: WorkerConfig::default(),
            connect: ConnectConfig::default(),
            name: default_pool_name(),
        }
    }
}

impl PoolConfig {
    /// 快速创建一个开发环境配置
    pub fn new_dev() -> Self {
        let mut cfg = Self::default();
        // 开发环境下握手快一点，方便调试
        cfg.worker.concurrency = 4;
        cfg.connect.handshake_ms = 50;
        cfg.connect.timeout_ms = 500;
        cfg
    }

    /// 设置并发上限
    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.worker.concurrency = n;
        self
    }

    /// 从 TOML 字符串解析并校验
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// 从 TOML 文件加载
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// 参数校验
    pub fn validate(&self) -> Result<()> {
        if self.worker.concurrency == 0 {
            return Err(PoolError::Config(
                "worker.concurrency must be at least 1".into(),
            ));
        }
        if self.worker.queue_capacity == 0 {
            return Err(PoolError::Config(
                "worker.queue_capacity must be at least 1".into(),
            ));
        }
        if self.connect.timeout_ms == 0 {
            return Err(PoolError::Config("connect.timeout_ms must be positive".into()));
        }
        Ok(())
    }
}
