use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use serde::Serialize;

/// 工作池核心指标
// 使用 Atomic 保证高并发下的计数性能
#[derive(Debug, Default, Serialize)]
pub struct PoolMetrics {
    // --- 瞬时状态 (Gauges) ---
    /// 当前正在执行的任务数
    pub active_tasks: AtomicUsize,

    /// 同时执行任务数的历史峰值
    pub peak_active: AtomicUsize,

    // --- 累积计数 (Counters) ---
    /// 历史总成功任务数
    pub total_success: AtomicU64,

    /// 历史总失败任务数
    pub total_failure: AtomicU64,

    /// 历史总取消任务数
    pub total_cancelled: AtomicU64,
}

impl PoolMetrics {
    /// 增加活跃数 (开始做任务)，顺带刷新峰值
    pub fn inc_active(&self) {
        let now = self.active_tasks.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_active.fetch_max(now, Ordering::SeqCst);
    }

    /// 减少活跃数 (任务结束)
    pub fn dec_active(&self) {
        self.active_tasks.fetch_sub(1, Ordering::SeqCst);
    }

    /// 记录成功
    pub fn inc_success(&self) {
        self.total_success.fetch_add(1, Ordering::Relaxed);
    }

    /// 记录失败
    pub fn inc_failure(&self) {
        self.total_failure.fetch_add(1, Ordering::Relaxed);
    }

    /// 记录取消
    pub fn inc_cancelled(&self) {
        self.total_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn active(&self) -> usize {
        self.active_tasks.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak_active.load(Ordering::SeqCst)
    }
}
