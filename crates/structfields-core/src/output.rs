//! Records handed to serializers.
//!
//! Absent text is an empty string rather than a missing key, so every record
//! has the same shape.

use serde::{Deserialize, Serialize};

/// A struct type and its flattened exported fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StructType {
    pub name: String,
    pub doc: String,
    pub directives: Vec<String>,
    pub fields: Vec<FieldType>,
}

/// One exported field, either declared directly or promoted through embedding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FieldType {
    pub name: String,
    #[serde(rename = "Type")]
    pub ty: String,
    pub doc: String,
    pub comment: String,
    pub tag: String,
}

impl FieldType {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            ..Default::default()
        }
    }
}

impl StructType {
    pub fn field(&self, name: &str) -> Option<&FieldType> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}
