//! Field descriptors: the static metadata of one bindable field.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{SchemaError, SchemaResult};
use crate::schema::Schema;
use crate::schema::constraint::{Constraints, Format};
use crate::value::Value;

/// The part of a request a field's raw value is read from.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Path,
    Query,
    Form,
    Header,
    Cookie,
    Multipart,
    Body,
}

impl Source {
    /// The name used as the first segment of a violation location.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Path      => "path",
            Self::Query     => "query",
            Self::Form      => "form",
            Self::Header    => "header",
            Self::Cookie    => "cookie",
            Self::Multipart => "multipart",
            Self::Body      => "body",
        }
    }

    /// Channels read from a urlencoded or multipart body.
    pub(crate) fn is_form(self) -> bool {
        matches!(self, Self::Form | Self::Multipart)
    }

    pub(crate) fn reads_body(self) -> bool {
        self == Self::Body || self.is_form()
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A closed set of string tags, e.g. a hair colour.
///
/// Raw input must equal one tag exactly; casing is never normalized.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnumType {
    name: String,
    tags: Vec<String>,
}

impl EnumType {
    pub fn new<I, S>(name: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { name: name.into(), tags: tags.into_iter().map(Into::into).collect() }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn tags(&self) -> &[String] { &self.tags }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// The type a raw value is coerced into.
#[derive(Clone, Debug)]
pub enum FieldType {
    Integer,
    Boolean,
    Str,
    Enum(EnumType),
    /// A nested model, bound from a JSON object.
    Model(Arc<Schema>),
    /// An uploaded multipart file, carried through uncoerced.
    File,
}

impl FieldType {
    pub fn model(schema: &Schema) -> Self {
        Self::Model(Arc::new(schema.clone()))
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Str => "string",
            Self::Enum(e) => e.name(),
            Self::Model(s) => s.name(),
            Self::File => "file",
        }
    }

    /// Whether `value` is an acceptable default for this type.
    fn admits(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (Self::Integer, Value::Int(_)) | (Self::Boolean, Value::Bool(_)) | (Self::Str, Value::Str(_)) => true,
            (Self::Enum(e), Value::Enum(tag)) => e.contains(tag),
            _ => false,
        }
    }
}

/// Required fields have no default; optional fields always have one.
#[derive(Clone, Debug, PartialEq)]
pub enum Presence {
    Required,
    Optional(Value),
}

/// Static metadata attached to one field of a [`Schema`].
///
/// Built with a chain of calls, checked once when the owning schema is built:
///
/// ```rust
/// use bindery::{FieldDescriptor, FieldType};
///
/// let age = FieldDescriptor::body("age", FieldType::Integer)
///     .gt(0)
///     .le(115)
///     .example(28);
/// let name = FieldDescriptor::query("name", FieldType::Str)
///     .optional()
///     .min_length(1)
///     .max_length(50)
///     .title("Person Name");
/// ```
#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    name: String,
    alias: Option<String>,
    source: Source,
    ty: FieldType,
    presence: Presence,
    constraints: Constraints,
    title: Option<String>,
    description: Option<String>,
    example: Option<serde_json::Value>,
}

impl FieldDescriptor {
    /// A required field read from `source`.
    pub fn new(name: impl Into<String>, source: Source, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            alias: None,
            source,
            ty,
            presence: Presence::Required,
            constraints: Constraints::default(),
            title: None,
            description: None,
            example: None,
        }
    }

    pub fn path(name: impl Into<String>, ty: FieldType) -> Self { Self::new(name, Source::Path, ty) }
    pub fn query(name: impl Into<String>, ty: FieldType) -> Self { Self::new(name, Source::Query, ty) }
    pub fn form(name: impl Into<String>, ty: FieldType) -> Self { Self::new(name, Source::Form, ty) }
    pub fn header(name: impl Into<String>, ty: FieldType) -> Self { Self::new(name, Source::Header, ty) }
    pub fn cookie(name: impl Into<String>, ty: FieldType) -> Self { Self::new(name, Source::Cookie, ty) }
    pub fn body(name: impl Into<String>, ty: FieldType) -> Self { Self::new(name, Source::Body, ty) }

    /// A required uploaded file part.
    pub fn file(name: impl Into<String>) -> Self {
        Self::new(name, Source::Multipart, FieldType::File)
    }

    // ── presence ─────────────────────────────────────────────────────────────

    /// Optional with a `null` default.
    pub fn optional(self) -> Self {
        self.default(Value::Null)
    }

    /// Optional with the given default.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.presence = Presence::Optional(value.into());
        self
    }

    // ── constraints ──────────────────────────────────────────────────────────

    pub fn min_length(mut self, n: usize) -> Self { self.constraints.min_length = Some(n); self }
    pub fn max_length(mut self, n: usize) -> Self { self.constraints.max_length = Some(n); self }
    pub fn gt(mut self, n: i64) -> Self { self.constraints.gt = Some(n); self }
    pub fn ge(mut self, n: i64) -> Self { self.constraints.ge = Some(n); self }
    pub fn lt(mut self, n: i64) -> Self { self.constraints.lt = Some(n); self }
    pub fn le(mut self, n: i64) -> Self { self.constraints.le = Some(n); self }

    /// Restrict a string field to an exact set of values.
    pub fn one_of<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constraints.one_of = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Require an email-shaped string.
    pub fn email(mut self) -> Self {
        self.constraints.format = Some(Format::Email);
        self
    }

    // ── documentation ────────────────────────────────────────────────────────

    /// The name this field goes by on the wire, when it differs from `name`.
    pub fn alias(mut self, alias: impl Into<String>) -> Self { self.alias = Some(alias.into()); self }
    pub fn title(mut self, title: impl Into<String>) -> Self { self.title = Some(title.into()); self }
    pub fn description(mut self, text: impl Into<String>) -> Self { self.description = Some(text.into()); self }
    pub fn example(mut self, example: impl Into<serde_json::Value>) -> Self { self.example = Some(example.into()); self }

    // ── accessors ────────────────────────────────────────────────────────────

    pub fn name(&self) -> &str { &self.name }
    pub fn source(&self) -> Source { self.source }
    pub fn field_type(&self) -> &FieldType { &self.ty }
    pub fn presence(&self) -> &Presence { &self.presence }
    pub fn constraints(&self) -> &Constraints { &self.constraints }
    pub fn title_text(&self) -> Option<&str> { self.title.as_deref() }
    pub fn description_text(&self) -> Option<&str> { self.description.as_deref() }
    pub fn example_value(&self) -> Option<&serde_json::Value> { self.example.as_ref() }

    pub fn is_required(&self) -> bool {
        matches!(self.presence, Presence::Required)
    }

    /// The key the locator looks up. Header names swap `_` for `-`.
    pub fn wire_name(&self) -> String {
        match (&self.alias, self.source) {
            (Some(alias), _) => alias.clone(),
            (None, Source::Header) => self.name.replace('_', "-"),
            (None, _) => self.name.clone(),
        }
    }

    /// Rejects descriptors that could never bind anything.
    pub(crate) fn check(&self) -> SchemaResult<()> {
        let c = &self.constraints;
        let is_str = matches!(self.ty, FieldType::Str);
        let is_int = matches!(self.ty, FieldType::Integer);

        if self.name.is_empty() {
            return Err(SchemaError::invalid_field("", "field name is empty"));
        }
        if !is_str && (c.min_length.is_some() || c.max_length.is_some()) {
            return Err(self.invalid("length bounds apply to string fields only"));
        }
        if !is_str && (c.one_of.is_some() || c.format.is_some()) {
            return Err(self.invalid("value sets and formats apply to string fields only"));
        }
        if !is_int && (c.gt.is_some() || c.ge.is_some() || c.lt.is_some() || c.le.is_some()) {
            return Err(self.invalid("numeric bounds apply to integer fields only"));
        }
        if let (Some(min), Some(max)) = (c.min_length, c.max_length) {
            if min > max {
                return Err(self.invalid(format!("min_length {min} exceeds max_length {max}")));
            }
        }
        if let Some(values) = &c.one_of {
            if values.is_empty() {
                return Err(self.invalid("one_of needs at least one value"));
            }
        }
        if let Presence::Optional(default) = &self.presence {
            if !self.ty.admits(default) {
                return Err(self.invalid(format!("default is not a valid {}", self.ty.name())));
            }
        }
        match (&self.ty, self.source) {
            (FieldType::Model(nested), Source::Body) => {
                if let Some(f) = nested.fields().iter().find(|f| f.source() != Source::Body) {
                    return Err(self.invalid(format!("nested field `{}` must bind from the body", f.name())));
                }
            }
            (FieldType::Model(_), source) => {
                return Err(self.invalid(format!("nested models bind from the body, not {source}")));
            }
            (FieldType::File, Source::Multipart) => {}
            (FieldType::File, source) => {
                return Err(self.invalid(format!("files bind from multipart parts, not {source}")));
            }
            _ => {}
        }
        if self.source == Source::Path && !self.is_required() {
            return Err(SchemaError::OptionalPathField { field: self.name.clone() });
        }
        Ok(())
    }

    fn invalid(&self, reason: impl Into<String>) -> SchemaError {
        SchemaError::invalid_field(&self.name, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_wire_name_uses_hyphens() {
        let ua = FieldDescriptor::header("user_agent", FieldType::Str).optional();
        assert_eq!(ua.wire_name(), "user-agent");
        let aliased = FieldDescriptor::query("q", FieldType::Str).alias("item-query");
        assert_eq!(aliased.wire_name(), "item-query");
    }

    #[test]
    fn presence_is_either_required_or_defaulted() {
        let f = FieldDescriptor::query("age", FieldType::Integer);
        assert!(f.is_required());
        let f = f.default(18);
        assert_eq!(f.presence(), &Presence::Optional(Value::Int(18)));
    }

    #[test]
    fn rejects_constraints_on_the_wrong_type() {
        let err = FieldDescriptor::query("age", FieldType::Integer).min_length(1).check().unwrap_err();
        assert!(matches!(err, SchemaError::InvalidField { .. }));
        assert!(FieldDescriptor::query("name", FieldType::Str).gt(0).check().is_err());
        assert!(FieldDescriptor::query("name", FieldType::Str).min_length(5).max_length(2).check().is_err());
    }

    #[test]
    fn rejects_optional_path_fields() {
        let err = FieldDescriptor::path("id", FieldType::Integer).optional().check().unwrap_err();
        assert_eq!(err, SchemaError::OptionalPathField { field: "id".into() });
    }

    #[test]
    fn rejects_defaults_of_the_wrong_type() {
        assert!(FieldDescriptor::query("n", FieldType::Integer).default("ten").check().is_err());
        assert!(FieldDescriptor::query("n", FieldType::Integer).default(10).check().is_ok());
        let colour = EnumType::new("HairColor", ["brown", "red"]);
        let f = FieldDescriptor::body("hair", FieldType::Enum(colour)).default(Value::Enum("green".into()));
        assert!(f.check().is_err());
    }

    #[test]
    fn files_only_come_from_multipart() {
        assert!(FieldDescriptor::form("image", FieldType::File).check().is_err());
        assert!(FieldDescriptor::file("image").check().is_ok());
    }
}
