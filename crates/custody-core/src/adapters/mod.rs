pub mod memory_store;
pub mod system_clock;

pub use memory_store::*;
pub use system_clock::*;
