use std::sync::Arc;

use crate::{
    common::{Clock, TokioClock},
    provider::{
        DirectoryProvider, PathCorpusProvider, ProcessRegistryProvider, memory::MemoryEnvironment,
    },
};

/// 处理器运行环境
///
/// **职责**:
/// 打包处理器需要的全部外部协作者 (目录、语料、进程表、时钟)，
/// 以只读方式注入到每一次执行中。
///
/// 内部都是 `Arc`，Clone 是廉价的。
#[derive(Clone)]
pub struct Environment {
    pub directory: Arc<dyn DirectoryProvider>,
    pub corpus: Arc<dyn PathCorpusProvider>,
    pub processes: Arc<dyn ProcessRegistryProvider>,
    pub clock: Arc<dyn Clock>,
}

impl Environment {
    pub fn new(
        directory: Arc<dyn DirectoryProvider>,
        corpus: Arc<dyn PathCorpusProvider>,
        processes: Arc<dyn ProcessRegistryProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            directory,
            corpus,
            processes,
            clock,
        }
    }

    /// 用同一个内存数据源充当三个 Provider，时钟为真实时钟
    pub fn from_memory(mem: MemoryEnvironment) -> Self {
        let mem = Arc::new(mem);
        Self {
            directory: mem.clone(),
            corpus: mem.clone(),
            processes: mem,
            clock: Arc::new(TokioClock),
        }
    }

    /// 替换时钟
    pub fn with_clock<C: Clock>(mut self, clock: Arc<C>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_directory<D: DirectoryProvider>(mut self, directory: D) -> Self {
        self.directory = Arc::new(directory);
        self
    }

    pub fn with_corpus<P: PathCorpusProvider>(mut self, corpus: P) -> Self {
        self.corpus = Arc::new(corpus);
        self
    }

    pub fn with_processes<P: ProcessRegistryProvider>(mut self, processes: P) -> Self {
        self.processes = Arc::new(processes);
        self
    }
}

impl Default for Environment {
    /// 默认：AlteronOS 布局 + 真实时钟
    fn default() -> Self {
        Self::from_memory(MemoryEnvironment::alteron())
    }
}
