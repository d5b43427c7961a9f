//! Record cleaning: validation, normalization and counting of input lines.

pub mod cleaner;
pub mod normalize;

pub use cleaner::RecordCleaner;
pub use normalize::Normalizer;
