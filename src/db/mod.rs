pub mod cache;
pub mod catalog;
pub mod metadata;

mod macros;

pub use cache::{CacheKey, Clock, ManualClock, ResponseCache, SystemClock};
pub use catalog::{load_catalog, Catalog};
pub use metadata::MetadataStore;
