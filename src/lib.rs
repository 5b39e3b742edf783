//! DocArray - Typed Documents for Multimodal Data
//!
//! DocArray represents text, audio and tensors as schema-validated documents
//! that nest into arrays of documents.
//!
//! # Architecture
//!
//! - `tensor`: dense tensors and audio tensors with PCM encoding
//! - `document`: schemas, field values and validated documents
//! - `array`: document arrays, stacking into column tensors, and traversal
//!   by dotted access path
//!
//! # Example
//!
//! ```
//! use docarray::array::{AnyDocumentArray, DocumentArray};
//! use docarray::document::{Document, FieldKind, Schema};
//! use docarray::tensor::Tensor;
//!
//! let image = Schema::builder("Image")
//!     .field("tensor", FieldKind::tensor(&[3, 8, 8]))
//!     .build()
//!     .unwrap();
//!
//! let docs: Vec<Document> = (0..4)
//!     .map(|_| {
//!         Document::builder(&image)
//!             .with("tensor", Tensor::zeros(&[3, 8, 8]))
//!             .build()
//!             .unwrap()
//!     })
//!     .collect();
//!
//! let batch = DocumentArray::from_docs(&image, docs).unwrap().stack().unwrap();
//! let tensors = batch.traverse_flat("tensor").unwrap();
//! assert_eq!(tensors.as_tensor().unwrap().shape(), &[4, 3, 8, 8]);
//! ```

pub mod array;
pub mod cli;
pub mod document;
pub mod error;
pub mod tensor;

pub use array::{AnyDocumentArray, DocumentArray, DocumentArrayStacked, Traversed};
pub use document::{Document, FieldKind, Schema, Value};
pub use error::{DocArrayError, Result};
pub use tensor::{AudioTensor, Tensor};
