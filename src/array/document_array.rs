//! Document Array
//!
//! An ordered, homogeneous sequence of documents sharing one schema.

use std::sync::Arc;

use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::array::stacked::DocumentArrayStacked;
use crate::document::schema::same_schema;
use crate::document::{Document, Schema};
use crate::error::{DocArrayError, Result};

/// Homogeneous list of documents of one type
///
/// # Example
/// ```
/// use docarray::array::DocumentArray;
/// use docarray::document::predefined::{text, text_schema};
///
/// let mut docs = DocumentArray::new(&text_schema());
/// docs.push(text("hello")).unwrap();
/// docs.push(text("world")).unwrap();
///
/// assert_eq!(docs.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentArray {
    schema: Arc<Schema>,
    docs: Vec<Document>,
}

impl DocumentArray {
    /// Create an empty array for documents of the given type
    pub fn new(schema: &Arc<Schema>) -> Self {
        DocumentArray {
            schema: Arc::clone(schema),
            docs: Vec::new(),
        }
    }

    /// Create an array from documents, checking each one's type
    ///
    /// # Errors
    /// * `SchemaMismatch` - If any document is not of type `schema`
    pub fn from_docs(schema: &Arc<Schema>, docs: Vec<Document>) -> Result<Self> {
        let mut array = DocumentArray {
            schema: Arc::clone(schema),
            docs: Vec::with_capacity(docs.len()),
        };
        for doc in docs {
            array.push(doc)?;
        }
        Ok(array)
    }

    /// Build from parts whose types were already checked
    pub(crate) fn from_parts(schema: Arc<Schema>, docs: Vec<Document>) -> Self {
        DocumentArray { schema, docs }
    }

    /// Append a document
    ///
    /// # Errors
    /// * `SchemaMismatch` - If the document is not of this array's type
    pub fn push(&mut self, doc: Document) -> Result<()> {
        if !same_schema(&self.schema, doc.schema()) {
            return Err(DocArrayError::SchemaMismatch {
                expected: self.schema.name().to_string(),
                actual: doc.schema_name().to_string(),
            });
        }
        self.docs.push(doc);
        Ok(())
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

    pub fn get(&self, index: usize) -> Option<&Document> {
        self.docs.get(index)
    }

    pub fn docs(&self) -> &[Document] {
        &self.docs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.docs.iter()
    }

    /// Stack tensor fields into contiguous column tensors
    ///
    /// See [`DocumentArrayStacked`] for the rules applied per field.
    ///
    /// # Errors
    /// * `StackError` - If the array is empty or a field mixes `Null` and tensors
    /// * `ShapeMismatch` - If a tensor field's shapes differ between documents
    pub fn stack(&self) -> Result<DocumentArrayStacked> {
        DocumentArrayStacked::from_docs(Arc::clone(&self.schema), self.docs.clone())
    }
}

impl IntoIterator for DocumentArray {
    type Item = Document;
    type IntoIter = std::vec::IntoIter<Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.docs.into_iter()
    }
}

impl<'a> IntoIterator for &'a DocumentArray {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.docs.iter()
    }
}

impl Serialize for DocumentArray {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.docs.len()))?;
        for doc in &self.docs {
            seq.serialize_element(doc)?;
        }
        seq.end()
    }
}
