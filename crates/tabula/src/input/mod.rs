//! Input parsing and dataset representation.

mod parser;
mod source;
mod value;

pub use parser::{DataFormat, Parser, ParserConfig};
pub use source::{Column, Dataset, SourceMetadata};
pub use value::Value;
