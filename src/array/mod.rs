//! Array Module
//!
//! Collections of documents:
//! - `DocumentArray`: an ordered list of documents of one type
//! - `DocumentArrayStacked`: the same documents with tensor fields stored
//!   as contiguous column tensors
//! - Traversal of nested arrays by dotted access path

pub mod document_array;
pub mod stacked;
pub mod traverse;

pub use document_array::DocumentArray;
pub use stacked::DocumentArrayStacked;
pub use traverse::{flatten_one_level, AnyDocumentArray, Traversed, PATH_DELIMITER};
