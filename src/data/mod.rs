//! Data module - CSV loading, cleaning, joining and writing

mod loader;
mod merger;
mod processor;
mod writer;

pub use loader::{DataLoader, LoaderError};
pub use merger::DataMerger;
pub use processor::{DataProcessor, ProcessorError};
pub use writer::{DataWriter, WriteSummary, WriterError};

/// Country or region name.
pub const ENTITY: &str = "Entity";
/// ISO3-style country code, blank for aggregate regions.
pub const CODE: &str = "Code";
pub const YEAR: &str = "Year";

/// Columns every joined dataset shares.
pub const JOIN_KEYS: [&str; 2] = [ENTITY, CODE];
