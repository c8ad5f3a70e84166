pub mod import;
pub mod extraction;
pub mod structuring;
pub mod processor;

pub use processor::{DocumentParser, ParseResult, ProcessingError};
