//! Document Schemas
//!
//! A [`Schema`] is the type of a document: a name plus an ordered list of
//! typed fields. Documents are validated against their schema when they are
//! built, and traversal resolves access paths against it.

use std::fmt;
use std::sync::Arc;

use crate::error::{DocArrayError, Result};

/// Field name every document carries implicitly
pub const ID_FIELD: &str = "id";

// ============================================================================
// Field Kinds
// ============================================================================

/// The declared type of a document field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Bool,
    Int,
    /// 64-bit float; integer values are widened on validation
    Float,
    Text,
    /// UTC timestamp
    DateTime,
    /// Dense tensor, optionally with a fixed shape
    Tensor { shape: Option<Vec<usize>> },
    /// Audio samples
    AudioTensor,
    /// A single nested document of the given type
    Doc(Arc<Schema>),
    /// A [`DocumentArray`](crate::array::DocumentArray) of the given type
    Array(Arc<Schema>),
    /// A plain list whose items all have the inner kind
    List(Box<FieldKind>),
}

impl FieldKind {
    /// Tensor field with a fixed shape
    pub fn tensor(shape: &[usize]) -> Self {
        FieldKind::Tensor {
            shape: Some(shape.to_vec()),
        }
    }

    /// Tensor field accepting any shape
    pub fn any_tensor() -> Self {
        FieldKind::Tensor { shape: None }
    }

    pub fn doc(schema: &Arc<Schema>) -> Self {
        FieldKind::Doc(Arc::clone(schema))
    }

    pub fn array(schema: &Arc<Schema>) -> Self {
        FieldKind::Array(Arc::clone(schema))
    }

    pub fn list(inner: FieldKind) -> Self {
        FieldKind::List(Box::new(inner))
    }

    /// Whether values of this kind are stacked into a column tensor
    pub fn is_tensor(&self) -> bool {
        matches!(self, FieldKind::Tensor { .. } | FieldKind::AudioTensor)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Bool => write!(f, "bool"),
            FieldKind::Int => write!(f, "int"),
            FieldKind::Float => write!(f, "float"),
            FieldKind::Text => write!(f, "text"),
            FieldKind::DateTime => write!(f, "datetime"),
            FieldKind::Tensor { shape: None } => write!(f, "tensor"),
            FieldKind::Tensor { shape: Some(shape) } => write!(f, "tensor{:?}", shape),
            FieldKind::AudioTensor => write!(f, "audio tensor"),
            FieldKind::Doc(schema) => write!(f, "{}", schema.name()),
            FieldKind::Array(schema) => write!(f, "DocumentArray[{}]", schema.name()),
            FieldKind::List(inner) => write!(f, "list[{}]", inner),
        }
    }
}

// ============================================================================
// Field Definitions
// ============================================================================

/// A named, typed field of a schema
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub(crate) name: String,
    pub(crate) kind: FieldKind,
    pub(crate) optional: bool,
}

impl FieldDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Optional fields may be omitted or set to `Null`
    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

// ============================================================================
// Schema
// ============================================================================

/// A document type: a name and an ordered list of fields
///
/// # Example
/// ```
/// use docarray::document::{FieldKind, Schema};
///
/// let image = Schema::builder("Image")
///     .field("tensor", FieldKind::tensor(&[3, 224, 224]))
///     .optional("caption", FieldKind::Text)
///     .build()
///     .unwrap();
///
/// assert_eq!(image.name(), "Image");
/// assert!(image.field("tensor").is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub(crate) name: String,
    pub(crate) fields: Vec<FieldDef>,
}

impl Schema {
    /// Start building a schema with the given type name
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Look up a field definition by name
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up a field definition, failing with `UnknownField`
    pub fn require_field(&self, name: &str) -> Result<&FieldDef> {
        self.field(name).ok_or_else(|| DocArrayError::UnknownField {
            schema: self.name.clone(),
            field: name.to_string(),
        })
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Returns true if both handles describe the same document type
pub(crate) fn same_schema(a: &Arc<Schema>, b: &Arc<Schema>) -> bool {
    Arc::ptr_eq(a, b) || a == b
}

/// Builder for [`Schema`]
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: String,
    fields: Vec<FieldDef>,
}

impl SchemaBuilder {
    /// Add a required field
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            kind,
            optional: false,
        });
        self
    }

    /// Add an optional field
    pub fn optional(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            kind,
            optional: true,
        });
        self
    }

    /// Validate and finish the schema
    ///
    /// # Errors
    /// * `InvalidSchema` - If the type name or a field name is empty or
    ///   contains `.`, a field is named `id`, or a name is used twice
    pub fn build(self) -> Result<Arc<Schema>> {
        let invalid = |reason: String| DocArrayError::InvalidSchema {
            schema: self.name.clone(),
            reason,
        };

        if self.name.is_empty() {
            return Err(invalid("type name cannot be empty".to_string()));
        }

        for (i, field) in self.fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(invalid("field name cannot be empty".to_string()));
            }
            if field.name.contains('.') {
                return Err(invalid(format!(
                    "field name '{}' cannot contain '.'",
                    field.name
                )));
            }
            if field.name == ID_FIELD {
                return Err(invalid(format!("field name '{}' is reserved", ID_FIELD)));
            }
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(invalid(format!("field '{}' already exists", field.name)));
            }
        }

        Ok(Arc::new(Schema {
            name: self.name,
            fields: self.fields,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_schema() {
        let schema = Schema::builder("Doc")
            .field("title", FieldKind::Text)
            .optional("score", FieldKind::Float)
            .build()
            .unwrap();

        assert_eq!(schema.len(), 2);
        assert_eq!(schema.field_names().collect::<Vec<_>>(), vec!["title", "score"]);
        assert!(!schema.field("title").unwrap().is_optional());
        assert!(schema.field("score").unwrap().is_optional());
        assert!(schema.field("missing").is_none());
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let result = Schema::builder("Doc")
            .field("a", FieldKind::Int)
            .field("a", FieldKind::Text)
            .build();
        assert!(matches!(result, Err(DocArrayError::InvalidSchema { .. })));
    }

    #[test]
    fn test_reserved_and_dotted_names_rejected() {
        assert!(Schema::builder("Doc").field("id", FieldKind::Text).build().is_err());
        assert!(Schema::builder("Doc").field("a.b", FieldKind::Text).build().is_err());
        assert!(Schema::builder("Doc").field("", FieldKind::Text).build().is_err());
        assert!(Schema::builder("").build().is_err());
    }

    #[test]
    fn test_require_field_error() {
        let schema = Schema::builder("Doc").build().unwrap();
        let err = schema.require_field("nope").unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_FIELD");
    }

    #[test]
    fn test_field_kind_display() {
        let sub = Schema::builder("Sub").build().unwrap();
        assert_eq!(FieldKind::tensor(&[3, 2]).to_string(), "tensor[3, 2]");
        assert_eq!(FieldKind::array(&sub).to_string(), "DocumentArray[Sub]");
        assert_eq!(FieldKind::list(FieldKind::Int).to_string(), "list[int]");
        assert!(FieldKind::AudioTensor.is_tensor());
        assert!(!FieldKind::doc(&sub).is_tensor());
    }

    #[test]
    fn test_same_schema() {
        let a = Schema::builder("A").field("x", FieldKind::Int).build().unwrap();
        let b = Schema::builder("A").field("x", FieldKind::Int).build().unwrap();
        let c = Schema::builder("C").build().unwrap();
        assert!(same_schema(&a, &a));
        assert!(same_schema(&a, &b));
        assert!(!same_schema(&a, &c));
    }
}
