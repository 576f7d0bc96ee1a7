use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    common::{Task, TaskFailure},
    pool::{PoolMetrics, PoolPlugin},
};

pub struct MetricsPlugin {
    metrics: Arc<PoolMetrics>,
}

impl MetricsPlugin {
    pub fn new(metrics: Arc<PoolMetrics>) -> Self {
        Self { metrics }
    }
}

#[async_trait]
impl PoolPlugin for MetricsPlugin {
    // 进入 Running -> active+1
    async fn before_execute(&self, _task: &Task) {
        self.metrics.inc_active();
    }
    // 任务成功 -> active-1, success+1
    async fn on_success(&self, _task: &Task, _payload: &[String]) {
        self.metrics.dec_active();
        self.metrics.inc_success();
    }
    // 任务失败 -> active-1, failure+1
    async fn on_failure(&self, _task: &Task, _failure: &TaskFailure) {
        self.metrics.dec_active();
        self.metrics.inc_failure();
    }
    // 取消的任务从未进入 Running，不动 active
    fn on_cancel(&self, _task: &Task) {
        self.metrics.inc_cancelled();
    }
}
