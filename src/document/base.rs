//! Documents
//!
//! A [`Document`] is a record whose fields were validated against a
//! [`Schema`]. Every document carries a random hex `id`.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};
use uuid::Uuid;

use crate::array::DocumentArray;
use crate::document::schema::{same_schema, FieldDef, FieldKind, Schema, ID_FIELD};
use crate::document::value::Value;
use crate::error::{DocArrayError, Result};
use crate::tensor::AudioTensor;

/// Generate a fresh document id (32 lowercase hex characters)
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

// ============================================================================
// Document
// ============================================================================

/// A schema-validated record of named fields
///
/// # Example
/// ```
/// use docarray::document::{Document, FieldKind, Schema};
/// use docarray::tensor::Tensor;
///
/// let schema = Schema::builder("Image")
///     .field("tensor", FieldKind::tensor(&[3, 2, 2]))
///     .build()
///     .unwrap();
///
/// let doc = Document::builder(&schema)
///     .with("tensor", Tensor::zeros(&[12]))
///     .build()
///     .unwrap();
///
/// // Same element count: reshaped to the declared shape
/// assert_eq!(doc.get("tensor").unwrap().as_tensor().unwrap().shape(), &[3, 2, 2]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    id: String,
    schema: Arc<Schema>,
    /// Always holds one entry per schema field; omitted optionals are `Null`
    fields: BTreeMap<String, Value>,
}

impl Document {
    /// Start building a document of the given type
    pub fn builder(schema: &Arc<Schema>) -> DocumentBuilder {
        DocumentBuilder {
            schema: Arc::clone(schema),
            id: None,
            values: Vec::new(),
        }
    }

    /// Build a document without validation; callers guarantee the invariants
    pub(crate) fn from_parts(
        id: String,
        schema: Arc<Schema>,
        fields: BTreeMap<String, Value>,
    ) -> Self {
        Document { id, schema, fields }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn schema_name(&self) -> &str {
        self.schema.name()
    }

    /// Get a field value by name
    ///
    /// # Errors
    /// * `UnknownField` - If the schema has no such field
    pub fn get(&self, name: &str) -> Result<&Value> {
        self.fields.get(name).ok_or_else(|| DocArrayError::UnknownField {
            schema: self.schema.name().to_string(),
            field: name.to_string(),
        })
    }

    /// Get a value through nested sub-documents, e.g. `"image.tensor"`
    ///
    /// # Errors
    /// * `UnknownField` - If a segment names a field the schema lacks
    /// * `InvalidPath` - If an intermediate segment is not a sub-document
    pub fn get_path(&self, path: &str) -> Result<&Value> {
        let mut segments = path.split('.');
        let first = segments.next().unwrap_or_default();
        let mut current = self.get(first)?;

        for segment in segments {
            current = match current {
                Value::Doc(doc) => doc.get(segment)?,
                other => {
                    return Err(DocArrayError::InvalidPath {
                        path: path.to_string(),
                        reason: format!(
                            "cannot read '{}' from a {} value",
                            segment,
                            other.kind_name()
                        ),
                    })
                }
            };
        }

        Ok(current)
    }

    /// Replace a field value, validating it against the schema
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let field = self.schema.require_field(name)?;
        let value = validate_field(&self.schema, field, value.into())?;
        self.fields.insert(name.to_string(), value);
        Ok(())
    }

    /// Move a field value out, leaving `Null` behind
    pub(crate) fn take_field(&mut self, name: &str) -> Value {
        self.fields
            .get_mut(name)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// Put back a value previously moved out with `take_field`
    pub(crate) fn restore_field(&mut self, name: &str, value: Value) {
        self.fields.insert(name.to_string(), value);
    }

    /// Field names in schema order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.schema.field_names()
    }

    /// Serialize to a JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry(ID_FIELD, &self.id)?;
        for name in self.schema.field_names() {
            if let Some(value) = self.fields.get(name) {
                map.serialize_entry(name, value)?;
            }
        }
        map.end()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`Document`]; validation happens in [`DocumentBuilder::build`]
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    schema: Arc<Schema>,
    id: Option<String>,
    values: Vec<(String, Value)>,
}

impl DocumentBuilder {
    /// Set a field value
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.push((name.into(), value.into()));
        self
    }

    /// Use a specific id instead of a generated one
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Validate all values against the schema and build the document
    ///
    /// # Errors
    /// * `UnknownField` - A value names a field the schema lacks
    /// * `MissingField` - A required field is absent or `Null`
    /// * `TypeMismatch` - A value has the wrong kind
    /// * `SchemaMismatch` - A nested document or array has the wrong type
    /// * `ShapeMismatch` - A tensor cannot take the declared shape
    pub fn build(self) -> Result<Document> {
        let schema = self.schema;
        let mut fields = BTreeMap::new();

        for (name, value) in self.values {
            let field = schema.require_field(&name)?;
            let value = validate_field(&schema, field, value)?;
            fields.insert(name, value);
        }

        for field in schema.fields() {
            if fields.contains_key(field.name()) {
                continue;
            }
            if !field.is_optional() {
                return Err(DocArrayError::MissingField {
                    schema: schema.name().to_string(),
                    field: field.name().to_string(),
                });
            }
            fields.insert(field.name().to_string(), Value::Null);
        }

        Ok(Document {
            id: self.id.unwrap_or_else(new_id),
            schema,
            fields,
        })
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Validate a value for a field, applying the allowed coercions
fn validate_field(schema: &Schema, field: &FieldDef, value: Value) -> Result<Value> {
    if value.is_null() {
        if field.is_optional() {
            return Ok(Value::Null);
        }
        return Err(DocArrayError::MissingField {
            schema: schema.name().to_string(),
            field: field.name().to_string(),
        });
    }
    coerce(field.name(), field.kind(), value)
}

fn coerce(field: &str, kind: &FieldKind, value: Value) -> Result<Value> {
    match (kind, value) {
        (FieldKind::Bool, v @ Value::Bool(_)) => Ok(v),
        (FieldKind::Int, v @ Value::Int(_)) => Ok(v),
        (FieldKind::Float, v @ Value::Float(_)) => Ok(v),
        (FieldKind::Float, Value::Int(i)) => Ok(Value::Float(i as f64)),
        (FieldKind::Text, v @ Value::Text(_)) => Ok(v),
        (FieldKind::DateTime, v @ Value::DateTime(_)) => Ok(v),

        (FieldKind::Tensor { shape }, Value::Tensor(t)) => match shape {
            Some(shape) => Ok(Value::Tensor(t.validate_shape(shape)?)),
            None => Ok(Value::Tensor(t)),
        },
        (FieldKind::Tensor { shape }, Value::Audio(a)) => match shape {
            Some(shape) => Ok(Value::Audio(AudioTensor::new(
                a.into_tensor().validate_shape(shape)?,
            ))),
            None => Ok(Value::Audio(a)),
        },
        (FieldKind::AudioTensor, v @ Value::Audio(_)) => Ok(v),
        (FieldKind::AudioTensor, Value::Tensor(t)) => Ok(Value::Audio(AudioTensor::new(t))),

        (FieldKind::Doc(expected), Value::Doc(doc)) => {
            if !same_schema(expected, doc.schema()) {
                return Err(DocArrayError::SchemaMismatch {
                    expected: expected.name().to_string(),
                    actual: doc.schema_name().to_string(),
                });
            }
            Ok(Value::Doc(doc))
        }
        (FieldKind::Array(expected), Value::Array(array)) => {
            if !same_schema(expected, array.schema()) {
                return Err(DocArrayError::SchemaMismatch {
                    expected: expected.name().to_string(),
                    actual: array.schema().name().to_string(),
                });
            }
            Ok(Value::Array(array))
        }
        (FieldKind::Array(expected), Value::List(items)) => {
            let docs = items
                .into_iter()
                .map(|item| match item {
                    Value::Doc(doc) => Ok(doc),
                    other => Err(type_mismatch(field, kind, &other)),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Array(DocumentArray::from_docs(expected, docs)?))
        }
        (FieldKind::List(inner), Value::List(items)) => {
            let items = items
                .into_iter()
                .map(|item| coerce(field, inner, item))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::List(items))
        }

        (kind, other) => Err(type_mismatch(field, kind, &other)),
    }
}

fn type_mismatch(field: &str, kind: &FieldKind, value: &Value) -> DocArrayError {
    DocArrayError::TypeMismatch {
        field: field.to_string(),
        expected: kind.to_string(),
        actual: value.kind_name().to_string(),
    }
}
