pub mod pipeline;

pub use pipeline::{check_inputs, run_import};
