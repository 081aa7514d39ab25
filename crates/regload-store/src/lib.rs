pub mod json;
pub mod memory;
pub mod traits;
pub mod writer;

pub use json::JsonStore;
pub use memory::MemoryBackend;
pub use traits::{IdentifierRegistry, RecordStore};
pub use writer::{WriteOutcome, write_record};
