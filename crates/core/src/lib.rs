pub mod agent;
pub mod engine;
pub mod export;
pub mod filter;
pub mod form;
pub mod presets;
pub mod sort;
pub mod validate;

pub use agent::*;
pub use engine::{ViewQuery, distinct_values, evaluate, matches_search};
pub use filter::{DateRange, FilterKey, FilterSet, SupportFilter};
pub use form::EditForm;
pub use presets::{ALL_PRESET, PresetCount, PresetRegistry, ViewPreset};
pub use sort::{SortDirection, SortDirective, SortKey};
pub use validate::{REJECTION_REASONS, ValidationError};

#[cfg(any(test, feature = "testing"))]
pub mod testing;
