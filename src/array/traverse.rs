//! Traversal
//!
//! Extracts a field across every document of an array by following a dotted
//! access path such as `"chunks.images.tensor"`. Each segment is resolved
//! against the schema of the current element type; segments that land on a
//! nested document array fan out over its documents. The leaves are collected
//! in depth-first order and flattened one level, so array-valued leaves
//! contribute their members.
//!
//! On a stacked array, a path ending in a stacked tensor field returns the
//! column tensor itself.

use std::sync::Arc;

use tracing::debug;

use crate::array::document_array::DocumentArray;
use crate::array::stacked::DocumentArrayStacked;
use crate::document::{Document, FieldKind, Schema, Value};
use crate::error::{DocArrayError, Result};
use crate::tensor::Tensor;

/// Path segment delimiter
pub const PATH_DELIMITER: char = '.';

// ============================================================================
// Results
// ============================================================================

/// Result of [`AnyDocumentArray::traverse_flat`]
#[derive(Debug, Clone, PartialEq)]
pub enum Traversed {
    /// Flat list of leaf values
    Values(Vec<Value>),
    /// A stacked column, shape `[len, *field_shape]`
    Tensor(Tensor),
}

impl Traversed {
    /// Number of leaves; for a tensor, the size of its leading axis
    pub fn len(&self) -> usize {
        match self {
            Traversed::Values(values) => values.len(),
            Traversed::Tensor(tensor) => tensor.shape().first().copied().unwrap_or(1),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn values(&self) -> Option<&[Value]> {
        match self {
            Traversed::Values(values) => Some(values),
            Traversed::Tensor(_) => None,
        }
    }

    pub fn into_values(self) -> Option<Vec<Value>> {
        match self {
            Traversed::Values(values) => Some(values),
            Traversed::Tensor(_) => None,
        }
    }

    pub fn as_tensor(&self) -> Option<&Tensor> {
        match self {
            Traversed::Tensor(tensor) => Some(tensor),
            Traversed::Values(_) => None,
        }
    }
}

// ============================================================================
// AnyDocumentArray
// ============================================================================

/// Behaviour shared by [`DocumentArray`] and [`DocumentArrayStacked`]
pub trait AnyDocumentArray {
    /// Type of the documents in the array
    fn schema(&self) -> &Arc<Schema>;

    /// Number of documents
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Collect the values at `access_path` from every document
    ///
    /// # Arguments
    /// * `access_path` - Dot-separated field names; empty selects the documents
    ///
    /// # Errors
    /// * `UnknownField` - A segment names a field its element type lacks
    /// * `InvalidPath` - A segment is empty, or is applied to a value that
    ///   has no fields
    fn traverse_flat(&self, access_path: &str) -> Result<Traversed>;
}

impl AnyDocumentArray for DocumentArray {
    fn schema(&self) -> &Arc<Schema> {
        DocumentArray::schema(self)
    }

    fn len(&self) -> usize {
        DocumentArray::len(self)
    }

    fn traverse_flat(&self, access_path: &str) -> Result<Traversed> {
        let leaves = collect_leaves(Node::Docs(self), self.schema(), access_path)?;
        let values = flatten_one_level(leaves.into_iter().map(Leaf::into_value).collect());
        debug!(path = access_path, leaves = values.len(), "traversed document array");
        Ok(Traversed::Values(values))
    }
}

impl AnyDocumentArray for DocumentArrayStacked {
    fn schema(&self) -> &Arc<Schema> {
        DocumentArrayStacked::schema(self)
    }

    fn len(&self) -> usize {
        DocumentArrayStacked::len(self)
    }

    fn traverse_flat(&self, access_path: &str) -> Result<Traversed> {
        let mut leaves = collect_leaves(Node::Stacked(self), self.schema(), access_path)?;

        if let [Leaf::Column(_)] = leaves.as_slice() {
            if let Some(Leaf::Column(tensor)) = leaves.pop() {
                debug!(
                    path = access_path,
                    shape = ?tensor.shape(),
                    "traversed stacked column"
                );
                return Ok(Traversed::Tensor(tensor));
            }
        }

        let values = flatten_one_level(leaves.into_iter().map(Leaf::into_value).collect());
        debug!(path = access_path, leaves = values.len(), "traversed stacked array");
        Ok(Traversed::Values(values))
    }
}

// ============================================================================
// Flattening
// ============================================================================

/// Remove exactly one level of nesting
///
/// Lists contribute their items and document arrays contribute their
/// documents; every other value passes through unchanged.
///
/// # Example
/// ```
/// use docarray::array::flatten_one_level;
/// use docarray::document::Value;
///
/// let nested = vec![Value::from(vec![1_i64]), Value::from(2_i64)];
/// assert_eq!(flatten_one_level(nested), vec![Value::Int(1), Value::Int(2)]);
/// ```
pub fn flatten_one_level(sequence: Vec<Value>) -> Vec<Value> {
    let mut flat = Vec::with_capacity(sequence.len());
    for item in sequence {
        match item {
            Value::List(items) => flat.extend(items),
            Value::Array(array) => flat.extend(array.into_iter().map(Value::Doc)),
            other => flat.push(other),
        }
    }
    flat
}

// ============================================================================
// Traversal internals
// ============================================================================

/// A position reached while walking an access path
#[derive(Clone, Copy)]
enum Node<'a> {
    Doc(&'a Document),
    Docs(&'a DocumentArray),
    Stacked(&'a DocumentArrayStacked),
    List(&'a [Value]),
    Column(&'a Tensor),
    Scalar(&'a Value),
}

impl<'a> Node<'a> {
    fn from_value(value: &'a Value) -> Self {
        match value {
            Value::Doc(doc) => Node::Doc(doc),
            Value::Array(array) => Node::Docs(array),
            Value::List(items) => Node::List(items),
            other => Node::Scalar(other),
        }
    }

    fn into_leaf(self) -> Result<Leaf> {
        Ok(match self {
            Node::Doc(doc) => Leaf::Value(Value::Doc(doc.clone())),
            Node::Docs(array) => Leaf::Value(Value::Array(array.clone())),
            Node::Stacked(stacked) => Leaf::Value(Value::Array(stacked.unstack()?)),
            Node::List(items) => Leaf::Value(Value::List(items.to_vec())),
            Node::Column(tensor) => Leaf::Column(tensor.clone()),
            Node::Scalar(value) => Leaf::Value(value.clone()),
        })
    }
}

/// A collected value; stacked columns are kept apart so they can be returned whole
enum Leaf {
    Value(Value),
    Column(Tensor),
}

impl Leaf {
    fn into_value(self) -> Value {
        match self {
            Leaf::Value(value) => value,
            Leaf::Column(tensor) => Value::Tensor(tensor),
        }
    }
}

fn split_path(access_path: &str) -> Result<Vec<&str>> {
    if access_path.is_empty() {
        return Ok(Vec::new());
    }
    let segments: Vec<&str> = access_path.split(PATH_DELIMITER).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(DocArrayError::InvalidPath {
            path: access_path.to_string(),
            reason: "empty path segment".to_string(),
        });
    }
    Ok(segments)
}

/// Resolve every segment against the schema alone
///
/// Unset optional fields and empty arrays or lists end a walk early, so the
/// path is checked up front to fail the same way whatever the data holds.
fn check_path(schema: &Schema, segments: &[&str], path: &str) -> Result<()> {
    let mut schema = schema;
    let mut rest = segments;
    while let Some((&segment, tail)) = rest.split_first() {
        let mut kind = schema.require_field(segment)?.kind();
        while let FieldKind::List(inner) = kind {
            kind = inner.as_ref();
        }
        rest = tail;
        match kind {
            FieldKind::Doc(sub) | FieldKind::Array(sub) => schema = sub.as_ref(),
            other => {
                if let Some(next) = rest.first() {
                    return Err(DocArrayError::InvalidPath {
                        path: path.to_string(),
                        reason: format!("cannot read '{}' from a {} field", next, other),
                    });
                }
            }
        }
    }
    Ok(())
}

fn collect_leaves(root: Node<'_>, schema: &Schema, access_path: &str) -> Result<Vec<Leaf>> {
    let segments = split_path(access_path)?;
    check_path(schema, &segments, access_path)?;
    let mut leaves = Vec::new();
    walk(root, &segments, access_path, &mut leaves)?;
    Ok(leaves)
}

fn walk(node: Node<'_>, segments: &[&str], path: &str, leaves: &mut Vec<Leaf>) -> Result<()> {
    let Some((&segment, rest)) = segments.split_first() else {
        leaves.push(node.into_leaf()?);
        return Ok(());
    };

    match node {
        Node::Doc(doc) => walk(Node::from_value(doc.get(segment)?), rest, path, leaves),
        Node::Docs(array) => {
            for doc in array {
                walk(Node::from_value(doc.get(segment)?), rest, path, leaves)?;
            }
            Ok(())
        }
        Node::Stacked(stacked) => {
            if let Some(column) = stacked.tensor_column(segment) {
                return walk(Node::Column(column), rest, path, leaves);
            }
            if let Some(column) = stacked.doc_column(segment) {
                return walk(Node::Stacked(column), rest, path, leaves);
            }
            for doc in stacked.stacked_docs() {
                walk(Node::from_value(doc.get(segment)?), rest, path, leaves)?;
            }
            Ok(())
        }
        Node::List(items) => {
            for item in items {
                walk(Node::from_value(item), segments, path, leaves)?;
            }
            Ok(())
        }
        // Unset optional fields end the walk early.
        Node::Scalar(Value::Null) => {
            leaves.push(Leaf::Value(Value::Null));
            Ok(())
        }
        Node::Scalar(value) => Err(DocArrayError::InvalidPath {
            path: path.to_string(),
            reason: format!("cannot read '{}' from a {} value", segment, value.kind_name()),
        }),
        Node::Column(_) => Err(DocArrayError::InvalidPath {
            path: path.to_string(),
            reason: format!("cannot read '{}' from a stacked tensor", segment),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::predefined::{text, text_schema};
    use crate::document::FieldKind;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(vec![Value::Int(1), Value::Int(2), Value::Int(3)],
                vec![Value::Int(1), Value::Int(2), Value::Int(3)] ; "flat input unchanged")]
    #[test_case(vec![Value::from(vec![1_i64]), Value::from(vec![2_i64]), Value::from(vec![3_i64])],
                vec![Value::Int(1), Value::Int(2), Value::Int(3)] ; "one level removed")]
    #[test_case(vec![Value::from(vec![vec![1_i64]]), Value::from(vec![vec![2_i64]])],
                vec![Value::from(vec![1_i64]), Value::from(vec![2_i64])] ; "only one level removed")]
    #[test_case(vec![Value::from(vec![1_i64, 2]), Value::Int(3)],
                vec![Value::Int(1), Value::Int(2), Value::Int(3)] ; "mixed nesting")]
    fn test_flatten_one_level(input: Vec<Value>, expected: Vec<Value>) {
        assert_eq!(flatten_one_level(input), expected);
    }

    #[test]
    fn test_flatten_one_level_document_array() {
        let doc = text("x");
        let array =
            DocumentArray::from_docs(&text_schema(), vec![doc.clone(), doc.clone(), doc.clone()])
                .unwrap();

        let flattened = flatten_one_level(vec![Value::Array(array)]);
        assert_eq!(flattened, vec![Value::Doc(doc.clone()), Value::Doc(doc.clone()), Value::Doc(doc)]);
    }

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("").unwrap(), Vec::<&str>::new());
        assert_eq!(split_path("a.b").unwrap(), vec!["a", "b"]);
        assert!(split_path("a..b").is_err());
        assert!(split_path(".a").is_err());
    }

    #[test]
    fn test_empty_path_returns_documents() {
        let docs = DocumentArray::from_docs(&text_schema(), vec![text("a"), text("b")]).unwrap();
        let traversed = docs.traverse_flat("").unwrap();

        let values = traversed.values().unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].as_doc().unwrap(), docs.get(0).unwrap());
    }

    #[test]
    fn test_unknown_field_on_empty_array() {
        let docs = DocumentArray::new(&text_schema());
        let err = docs.traverse_flat("nope").unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_FIELD");
        assert!(docs.traverse_flat("text").unwrap().is_empty());
    }

    fn outer_schema() -> Arc<Schema> {
        Schema::builder("Outer")
            .optional("caption", FieldKind::doc(&text_schema()))
            .field("tags", FieldKind::list(FieldKind::doc(&text_schema())))
            .build()
            .unwrap()
    }

    #[test]
    fn test_unknown_field_behind_unset_document() {
        let schema = outer_schema();
        let unset = Document::builder(&schema)
            .with("tags", Vec::<Document>::new())
            .build()
            .unwrap();
        let mut set = unset.clone();
        set.set("caption", text("c")).unwrap();

        for doc in [unset, set] {
            let docs = DocumentArray::from_docs(&schema, vec![doc]).unwrap();
            let err = docs.traverse_flat("caption.typo").unwrap_err();
            assert_eq!(err.error_code(), "UNKNOWN_FIELD");
            assert_eq!(docs.traverse_flat("caption.text").unwrap().len(), 1);
        }
    }

    #[test]
    fn test_unknown_field_behind_empty_list() {
        let schema = outer_schema();
        let docs = DocumentArray::from_docs(
            &schema,
            vec![
                Document::builder(&schema)
                    .with("tags", Vec::<Document>::new())
                    .build()
                    .unwrap(),
                Document::builder(&schema)
                    .with("tags", vec![text("a"), text("b")])
                    .build()
                    .unwrap(),
            ],
        )
        .unwrap();

        let err = docs.traverse_flat("tags.typo").unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_FIELD");
        assert!(err.to_string().contains("'typo'"));

        let empty = DocumentArray::from_docs(&schema, vec![docs.get(0).unwrap().clone()]).unwrap();
        assert_eq!(
            empty.traverse_flat("tags.typo").unwrap_err().error_code(),
            "UNKNOWN_FIELD"
        );
        assert!(empty.traverse_flat("tags.text").unwrap().is_empty());
        assert_eq!(docs.traverse_flat("tags.text").unwrap().len(), 2);
    }

    #[test]
    fn test_path_through_unset_scalar_fails() {
        let docs = DocumentArray::from_docs(&text_schema(), vec![text("a")]).unwrap();
        let err = docs.traverse_flat("embedding.x").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PATH");
    }

    #[test]
    fn test_path_through_scalar_fails() {
        let docs = DocumentArray::from_docs(&text_schema(), vec![text("a")]).unwrap();
        let err = docs.traverse_flat("text.length").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PATH");
    }

    #[test]
    fn test_null_optional_yields_null_leaf() {
        let docs = DocumentArray::from_docs(&text_schema(), vec![text("a")]).unwrap();
        let traversed = docs.traverse_flat("embedding").unwrap();
        assert_eq!(traversed, Traversed::Values(vec![Value::Null]));
    }

    #[test]
    fn test_list_field_is_flattened() {
        let schema = Schema::builder("Tagged")
            .field("tags", FieldKind::list(FieldKind::Text))
            .build()
            .unwrap();
        let doc = |tags: Vec<&str>| {
            Document::builder(&schema)
                .with("tags", tags)
                .build()
                .unwrap()
        };
        let docs =
            DocumentArray::from_docs(&schema, vec![doc(vec!["a", "b"]), doc(vec!["c"])]).unwrap();

        let traversed = docs.traverse_flat("tags").unwrap();
        assert_eq!(
            traversed,
            Traversed::Values(vec![Value::from("a"), Value::from("b"), Value::from("c")])
        );
    }

    #[test]
    fn test_stacked_column_path_rejects_further_segments() {
        let schema = Schema::builder("Vec")
            .field("tensor", FieldKind::tensor(&[2]))
            .build()
            .unwrap();
        let doc = Document::builder(&schema)
            .with("tensor", Tensor::zeros(&[2]))
            .build()
            .unwrap();
        let stacked = DocumentArray::from_docs(&schema, vec![doc])
            .unwrap()
            .stack()
            .unwrap();

        let err = stacked.traverse_flat("tensor.x").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PATH");
    }
}
