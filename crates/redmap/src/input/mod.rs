//! Delimited-text input: reading a dictionary export into a raw table.

mod parser;
mod source;

pub use parser::{Parser, ParserConfig};
pub use source::{DataTable, SourceMetadata};
