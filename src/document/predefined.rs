//! Predefined Documents
//!
//! Ready-made document types for single modalities. They are ordinary
//! schemas and can be nested in user-defined ones.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use crate::document::base::{new_id, Document};
use crate::document::schema::{FieldDef, FieldKind, Schema};
use crate::document::value::Value;
use crate::tensor::AudioTensor;

fn optional(name: &str, kind: FieldKind) -> FieldDef {
    FieldDef {
        name: name.to_string(),
        kind,
        optional: true,
    }
}

/// `Text { text: text?, embedding: tensor? }`
pub fn text_schema() -> Arc<Schema> {
    static SCHEMA: OnceLock<Arc<Schema>> = OnceLock::new();
    Arc::clone(SCHEMA.get_or_init(|| {
        Arc::new(Schema {
            name: "Text".to_string(),
            fields: vec![
                optional("text", FieldKind::Text),
                optional("embedding", FieldKind::any_tensor()),
            ],
        })
    }))
}

/// `Audio { tensor: audio tensor?, embedding: tensor? }`
pub fn audio_schema() -> Arc<Schema> {
    static SCHEMA: OnceLock<Arc<Schema>> = OnceLock::new();
    Arc::clone(SCHEMA.get_or_init(|| {
        Arc::new(Schema {
            name: "Audio".to_string(),
            fields: vec![
                optional("tensor", FieldKind::AudioTensor),
                optional("embedding", FieldKind::any_tensor()),
            ],
        })
    }))
}

/// A `Text` document holding `text`
pub fn text(text: impl Into<String>) -> Document {
    let mut fields = BTreeMap::new();
    fields.insert("text".to_string(), Value::Text(text.into()));
    fields.insert("embedding".to_string(), Value::Null);
    Document::from_parts(new_id(), text_schema(), fields)
}

/// An `Audio` document holding `tensor`
pub fn audio(tensor: AudioTensor) -> Document {
    let mut fields = BTreeMap::new();
    fields.insert("tensor".to_string(), Value::Audio(tensor));
    fields.insert("embedding".to_string(), Value::Null);
    Document::from_parts(new_id(), audio_schema(), fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_document() {
        let doc = text("hello");
        assert_eq!(doc.schema_name(), "Text");
        assert_eq!(doc.get("text").unwrap().as_text(), Some("hello"));
        assert!(doc.get("embedding").unwrap().is_null());
    }

    #[test]
    fn test_predefined_schemas_are_shared() {
        assert!(Arc::ptr_eq(&text_schema(), &text_schema()));
        assert!(Arc::ptr_eq(text("a").schema(), &text_schema()));
    }

    #[test]
    fn test_audio_document_matches_builder() {
        let built = Document::builder(&audio_schema())
            .id("x")
            .with("tensor", AudioTensor::zeros(&[8]))
            .build()
            .unwrap();
        let direct = audio(AudioTensor::zeros(&[8]));

        assert_eq!(built.get("tensor").unwrap(), direct.get("tensor").unwrap());
        assert_eq!(built.get("embedding").unwrap(), direct.get("embedding").unwrap());
    }

    #[test]
    fn test_nested_in_user_schema() {
        let schema = Schema::builder("Post")
            .field("title", FieldKind::doc(&text_schema()))
            .build()
            .unwrap();
        let post = Document::builder(&schema)
            .with("title", text("hi"))
            .build()
            .unwrap();
        assert_eq!(post.get_path("title.text").unwrap().as_text(), Some("hi"));
    }
}
