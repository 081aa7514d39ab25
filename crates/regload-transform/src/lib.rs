pub mod config;
pub mod engine;
pub mod normalize;

pub use config::{EngineConfig, ReferenceField};
pub use engine::{AddressRecord, Resolution, RowSkip, TransformEngine};
pub use normalize::{NULL_MARKER, normalize};
