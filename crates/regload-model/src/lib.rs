pub mod error;
pub mod ids;
pub mod mapping;
pub mod outcome;
pub mod row;
pub mod summary;
pub mod value;

pub use error::{ImportError, Result};
pub use ids::{ExternalId, RecordId};
pub use mapping::{MappingSpec, TransformCode, TransformRule, TransformSet};
pub use outcome::RowOutcome;
pub use row::{NormalizedRow, PersistableRow, RawRow, ResolvedRow};
pub use summary::RunSummary;
pub use value::FieldValue;
