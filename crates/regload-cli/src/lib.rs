//! CLI library components for the partner registry loader.

pub mod logging;
