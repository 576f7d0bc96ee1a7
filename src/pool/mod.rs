pub mod builder;
pub mod context;
pub mod core;
pub mod handle;
pub mod metrics;
pub mod plugin;
pub mod plugins;
pub mod results;

pub use context::PoolContext;
pub use core::WorkerPool;
pub use handle::TaskHandle;
pub use plugin::PoolPlugin;
pub use results::ResultStream;

pub use builder::PoolBuilder;
pub use metrics::PoolMetrics;
