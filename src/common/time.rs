use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;

/// 全局统一的时间工具
pub struct TimeUtils;

impl TimeUtils {
    /// [标准] 获取当前 UTC 时间
    /// 任务的 `submitted_at` 统一使用这个方法获取“现在”
    pub fn now() -> DateTime<Utc> {
        Utc::now()
    }

    /// 毫秒 -> Duration
    pub fn millis(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }
}

// ==========================================
// 时钟抽象 (Clock)
// ==========================================

/// 可注入的时钟/延时原语
///
/// 处理器中所有的“等待”都必须经过它，测试时换成 `InstantClock` 即可得到确定性的行为。
#[async_trait]
pub trait Clock: Send + Sync + 'static {
    /// 当前时间 (用于结果的 `completed_at`)
    fn now(&self) -> DateTime<Utc>;

    /// 挂起指定时长
    async fn sleep(&self, duration: Duration);
}

/// 真实时钟：基于 `tokio::time`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// 虚拟时钟：`sleep` 立即返回，只推进内部时间并记录请求的时长
#[derive(Debug)]
pub struct InstantClock {
    now: Mutex<DateTime<Utc>>,
    sleeps: Mutex<Vec<Duration>>,
}

impl InstantClock {
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    /// 迄今所有 `sleep` 请求，按调用顺序
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().clone()
    }

    /// 虚拟时间累计推进量
    pub fn elapsed(&self) -> Duration {
        self.sleeps.lock().iter().sum()
    }
}

impl Default for InstantClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for InstantClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().push(duration);
        let delta = TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX);
        {
            let mut now = self.now.lock();
            *now = now.checked_add_signed(delta).unwrap_or(*now);
        }
        // 让出一次，保持和真实 sleep 相同的挂起点
        tokio::task::yield_now().await;
    }
}
