pub mod env;
pub mod memory;
pub mod traits;

pub use env::Environment;
pub use memory::{MemoryEnvironment, UnavailableProvider};
pub use traits::{DirectoryProvider, PathCorpusProvider, ProcessRegistryProvider};
