//! Coerced field values.

use bytes::Bytes;

use crate::bind::BoundModel;

/// A value after coercion to its field's type.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    /// One of the declared tags of an enum type.
    Enum(String),
    File(UploadedFile),
    Model(BoundModel),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) | Self::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&UploadedFile> {
        match self {
            Self::File(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_model(&self) -> Option<&BoundModel> {
        match self {
            Self::Model(m) => Some(m),
            _ => None,
        }
    }

    /// The JSON rendering of this value. Files render as their metadata.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => (*b).into(),
            Self::Int(n) => (*n).into(),
            Self::Str(s) | Self::Enum(s) => s.clone().into(),
            Self::File(f) => f.metadata(),
            Self::Model(m) => m.to_json(),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self { Self::Bool(b) }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self { Self::Int(n.into()) }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self { Self::Int(n) }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self { Self::Str(s.to_owned()) }
}

impl From<String> for Value {
    fn from(s: String) -> Self { Self::Str(s) }
}

impl From<UploadedFile> for Value {
    fn from(f: UploadedFile) -> Self { Self::File(f) }
}

impl From<BoundModel> for Value {
    fn from(m: BoundModel) -> Self { Self::Model(m) }
}

/// A fully drained multipart file part.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadedFile {
    filename: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

impl UploadedFile {
    pub fn new(filename: Option<String>, content_type: Option<String>, data: Bytes) -> Self {
        Self { filename, content_type, data }
    }

    /// The filename the client declared, if any.
    pub fn filename(&self) -> Option<&str> { self.filename.as_deref() }

    /// The content type the client declared, if any.
    pub fn content_type(&self) -> Option<&str> { self.content_type.as_deref() }

    pub fn data(&self) -> &Bytes { &self.data }

    pub fn len(&self) -> usize { self.data.len() }

    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    /// Size in kilobytes (1024 bytes), rounded to 2 decimal places.
    pub fn size_kb(&self) -> f64 {
        (self.data.len() as f64 / 1024.0 * 100.0).round() / 100.0
    }

    /// `{"filename", "content_type", "size_kb"}`.
    pub fn metadata(&self) -> serde_json::Value {
        serde_json::json!({
            "filename": self.filename,
            "content_type": self.content_type,
            "size_kb": self.size_kb(),
        })
    }
}
