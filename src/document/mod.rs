//! Document Module
//!
//! The typed document model:
//! - Schemas describing document types and their fields
//! - Dynamic field values
//! - Validated documents and their builder
//! - Predefined document types for common modalities

pub mod base;
pub mod predefined;
pub mod schema;
pub mod value;

pub use base::{new_id, Document, DocumentBuilder};
pub use schema::{FieldDef, FieldKind, Schema, SchemaBuilder, ID_FIELD};
pub use value::Value;
