//! Stacked Document Array
//!
//! A [`DocumentArrayStacked`] holds the same documents as a
//! [`DocumentArray`], but every tensor field lives in one contiguous column
//! tensor of shape `[len, *field_shape]`.
//!
//! Stacking rules, per schema field:
//! - tensor and audio fields become column tensors; every document must hold
//!   a tensor of the same shape, or every document must hold `Null` (the
//!   field is then left alone)
//! - sub-document fields are stacked recursively into nested stacked arrays
//! - scalar, list and array fields stay in the documents

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::array::document_array::DocumentArray;
use crate::document::{Document, FieldKind, Schema, Value};
use crate::error::{DocArrayError, Result};
use crate::tensor::{AudioTensor, Tensor};

/// A stacked tensor field
#[derive(Debug, Clone, PartialEq)]
struct Column {
    tensor: Tensor,
    /// Rows were audio tensors and are restored as such
    audio: bool,
}

/// Document array with tensor fields stacked column-wise
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentArrayStacked {
    schema: Arc<Schema>,
    /// Documents with stacked fields moved out (left as `Null`)
    docs: Vec<Document>,
    tensor_columns: BTreeMap<String, Column>,
    doc_columns: BTreeMap<String, DocumentArrayStacked>,
}

impl DocumentArrayStacked {
    pub(crate) fn from_docs(schema: Arc<Schema>, mut docs: Vec<Document>) -> Result<Self> {
        if docs.is_empty() {
            return Err(DocArrayError::StackError {
                reason: format!("no documents of type '{}' to stack", schema.name()),
            });
        }

        let mut tensor_columns = BTreeMap::new();
        let mut doc_columns = BTreeMap::new();

        for field in schema.fields() {
            let name = field.name();
            match field.kind() {
                kind if kind.is_tensor() => {
                    if let Some(column) = stack_tensor_field(&docs, name)? {
                        for doc in docs.iter_mut() {
                            doc.take_field(name);
                        }
                        tensor_columns.insert(name.to_string(), column);
                    }
                }
                FieldKind::Doc(sub_schema) => {
                    if !require_uniform_presence(&docs, name)? {
                        continue;
                    }
                    let subs = docs
                        .iter_mut()
                        .map(|doc| match doc.take_field(name) {
                            Value::Doc(sub) => Ok(sub),
                            other => Err(DocArrayError::StackError {
                                reason: format!(
                                    "field '{}' holds a {} instead of a document",
                                    name,
                                    other.kind_name()
                                ),
                            }),
                        })
                        .collect::<Result<Vec<_>>>()?;
                    let column = DocumentArrayStacked::from_docs(Arc::clone(sub_schema), subs)?;
                    doc_columns.insert(name.to_string(), column);
                }
                _ => {}
            }
        }

        debug!(
            schema = schema.name(),
            len = docs.len(),
            tensor_columns = tensor_columns.len(),
            doc_columns = doc_columns.len(),
            "stacked document array"
        );

        Ok(DocumentArrayStacked {
            schema,
            docs,
            tensor_columns,
            doc_columns,
        })
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// The stacked tensor of a tensor field, shape `[len, *field_shape]`
    pub fn tensor_column(&self, name: &str) -> Option<&Tensor> {
        self.tensor_columns.get(name).map(|c| &c.tensor)
    }

    /// The stacked array of a sub-document field
    pub fn doc_column(&self, name: &str) -> Option<&DocumentArrayStacked> {
        self.doc_columns.get(name)
    }

    /// Names of the stacked tensor fields
    pub fn tensor_column_names(&self) -> impl Iterator<Item = &str> {
        self.tensor_columns.keys().map(String::as_str)
    }

    /// Documents with stacked fields moved out
    pub(crate) fn stacked_docs(&self) -> &[Document] {
        &self.docs
    }

    /// Split columns back into per-document values
    ///
    /// The result equals the array `stack` was called on.
    pub fn unstack(&self) -> Result<DocumentArray> {
        let mut docs = self.docs.clone();

        for (name, column) in &self.tensor_columns {
            let rows = column.tensor.unstack()?;
            for (doc, row) in docs.iter_mut().zip(rows) {
                let value = if column.audio {
                    Value::Audio(AudioTensor::new(row))
                } else {
                    Value::Tensor(row)
                };
                doc.restore_field(name, value);
            }
        }

        for (name, column) in &self.doc_columns {
            let subs = column.unstack()?;
            for (doc, sub) in docs.iter_mut().zip(subs) {
                doc.restore_field(name, Value::Doc(sub));
            }
        }

        debug!(schema = self.schema.name(), len = docs.len(), "unstacked document array");

        Ok(DocumentArray::from_parts(Arc::clone(&self.schema), docs))
    }
}

/// Check that a field is either set in every document or `Null` in every one
///
/// # Returns
/// `true` if the field is set everywhere, `false` if it is `Null` everywhere
fn require_uniform_presence(docs: &[Document], name: &str) -> Result<bool> {
    let mut nulls = 0;
    for doc in docs {
        if doc.get(name)?.is_null() {
            nulls += 1;
        }
    }
    match nulls {
        0 => Ok(true),
        n if n == docs.len() => Ok(false),
        n => Err(DocArrayError::StackError {
            reason: format!(
                "field '{}' is null in {} of {} documents",
                name,
                n,
                docs.len()
            ),
        }),
    }
}

fn stack_tensor_field(docs: &[Document], name: &str) -> Result<Option<Column>> {
    if !require_uniform_presence(docs, name)? {
        return Ok(None);
    }

    let mut tensors = Vec::with_capacity(docs.len());
    let mut audio_rows = 0;
    for doc in docs {
        let value = doc.get(name)?;
        if value.as_audio().is_some() {
            audio_rows += 1;
        }
        let tensor = value.as_tensor().ok_or_else(|| DocArrayError::StackError {
            reason: format!(
                "field '{}' holds a {} instead of a tensor",
                name,
                value.kind_name()
            ),
        })?;
        tensors.push(tensor);
    }

    if audio_rows != 0 && audio_rows != docs.len() {
        return Err(DocArrayError::StackError {
            reason: format!("field '{}' mixes audio and plain tensors", name),
        });
    }

    Ok(Some(Column {
        tensor: Tensor::stack(&tensors)?,
        audio: audio_rows != 0,
    }))
}
