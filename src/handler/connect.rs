use async_trait::async_trait;
use tracing::trace;

use crate::{
    common::{ConnectConfig, PoolError, Result, TaskKind},
    handler::OperationHandler,
    provider::Environment,
};

/// 模拟建立连接
///
/// 握手耗时由配置决定 (可按主机覆盖)，等待通过环境中的时钟完成：
/// - 握手耗时 <= 超时：睡完握手耗时，返回 `connected:<host>`。
/// - 握手耗时 > 超时：只睡到超时为止，返回 `Timeout`。
#[derive(Debug, Clone, Default)]
pub struct ConnectHandler {
    config: ConnectConfig,
}

impl ConnectHandler {
    pub fn new(config: ConnectConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl OperationHandler for ConnectHandler {
    fn kind(&self) -> TaskKind {
        TaskKind::Connect
    }

    async fn handle(&self, host: &str, env: &Environment) -> Result<Vec<String>> {
        let host = host.trim();
        if host.is_empty() {
            return Err(PoolError::InvalidHost);
        }

        let handshake = self.config.handshake_for(host);
        let timeout = self.config.timeout();
        if handshake > timeout {
            env.clock.sleep(timeout).await;
            return Err(PoolError::Timeout {
                host: host.to_string(),
                timeout_ms: self.config.timeout_ms,
            });
        }

        trace!("[Connect] Handshake with {} ({:?})", host, handshake);
        env.clock.sleep(handshake).await;
        Ok(vec![format!("connected:{host}")])
    }
}
