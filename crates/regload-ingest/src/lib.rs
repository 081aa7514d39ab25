pub mod source;

pub use source::{CHECKPOINT_INTERVAL, CsvSource};
