//! Model schemas: ordered field tables, composed and projected explicitly.
//!
//! A schema is built once, checked once, and then only read. "Write" models
//! extend a base schema with extra fields; output models are projections that
//! drop fields which must never be disclosed.
//!
//! ```rust
//! use bindery::{FieldDescriptor, FieldType, Schema};
//!
//! let base = Schema::new("PersonBase", [
//!     FieldDescriptor::body("first_name", FieldType::Str).min_length(1).max_length(50),
//! ])?;
//! let person = base.extend("Person", [
//!     FieldDescriptor::body("password", FieldType::Str).min_length(8),
//! ])?;
//! let person_out = person.project("PersonOut", &["password"])?;
//! assert_eq!(person_out.field_names().collect::<Vec<_>>(), ["first_name"]);
//! # Ok::<(), bindery::SchemaError>(())
//! ```

pub mod constraint;
pub mod field;

use std::collections::HashSet;

use crate::bind::locate::Inputs;
use crate::bind::{self, BoundModel};
use crate::error::{SchemaError, SchemaResult};
use crate::reject::ValidationFailure;
use crate::value::Value;

use field::{FieldDescriptor, FieldType, Source};

/// A named, ordered set of [`FieldDescriptor`]s.
#[derive(Clone, Debug)]
pub struct Schema {
    name: String,
    fields: Vec<FieldDescriptor>,
    base: Option<String>,
}

impl Schema {
    /// Builds and checks a schema.
    ///
    /// # Errors
    ///
    /// Duplicate field names, descriptors that can never bind, and request
    /// shapes mixing a JSON body with form fields.
    pub fn new(
        name: impl Into<String>,
        fields: impl IntoIterator<Item = FieldDescriptor>,
    ) -> SchemaResult<Self> {
        let schema = Self { name: name.into(), fields: fields.into_iter().collect(), base: None };
        schema.check()?;
        Ok(schema)
    }

    /// A schema with no fields, for endpoints that take no input.
    pub fn empty(name: impl Into<String>) -> Self {
        Self { name: name.into(), fields: Vec::new(), base: None }
    }

    /// Every field of `self` followed by `extra`. Base fields are never
    /// overridden: redeclaring one is a [`SchemaError::DuplicateField`].
    pub fn extend(
        &self,
        name: impl Into<String>,
        extra: impl IntoIterator<Item = FieldDescriptor>,
    ) -> SchemaResult<Self> {
        let mut fields = self.fields.clone();
        fields.extend(extra);
        let schema = Self { name: name.into(), fields, base: Some(self.name.clone()) };
        schema.check()?;
        Ok(schema)
    }

    /// `self` without the `excluded` fields. The remaining descriptors are
    /// kept exactly as declared.
    pub fn project(&self, name: impl Into<String>, excluded: &[&str]) -> SchemaResult<Self> {
        let name = name.into();
        if let Some(unknown) = excluded.iter().find(|f| self.field(f).is_none()) {
            return Err(SchemaError::UnknownField {
                projection: name,
                schema: self.name.clone(),
                field: (*unknown).to_owned(),
            });
        }
        let fields = self
            .fields
            .iter()
            .filter(|f| !excluded.contains(&f.name()))
            .cloned()
            .collect();
        Ok(Self { name, fields, base: Some(self.name.clone()) })
    }

    pub fn name(&self) -> &str { &self.name }

    /// The schema this one was extended or projected from.
    pub fn base(&self) -> Option<&str> { self.base.as_deref() }

    pub fn fields(&self) -> &[FieldDescriptor] { &self.fields }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(FieldDescriptor::name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Binds a located request against this schema.
    pub fn bind(&self, inputs: &Inputs) -> Result<BoundModel, ValidationFailure> {
        bind::bind(self, inputs)
    }

    /// Validates a JSON object as this schema's body, e.g. to re-parse a
    /// response payload.
    pub fn validate_json(&self, payload: &serde_json::Value) -> Result<BoundModel, ValidationFailure> {
        bind::bind_json(self, payload)
    }

    /// Serializes `model` through this schema: only fields this schema
    /// declares are emitted, in declaration order.
    pub fn render(&self, model: &BoundModel) -> serde_json::Value {
        let mut out = serde_json::Map::new();
        for field in &self.fields {
            if let Some(value) = model.get(field.name()) {
                out.insert(field.name().to_owned(), self.render_value(field, value));
            }
        }
        serde_json::Value::Object(out)
    }

    /// Filters an arbitrary JSON object through this schema. Non-object
    /// payloads render as an empty object.
    pub fn render_json(&self, payload: &serde_json::Value) -> serde_json::Value {
        let mut out = serde_json::Map::new();
        if let Some(obj) = payload.as_object() {
            for field in &self.fields {
                if let Some(value) = obj.get(field.name()) {
                    let value = match field.field_type() {
                        FieldType::Model(nested) => nested.render_json(value),
                        _ => value.clone(),
                    };
                    out.insert(field.name().to_owned(), value);
                }
            }
        }
        serde_json::Value::Object(out)
    }

    fn render_value(&self, field: &FieldDescriptor, value: &Value) -> serde_json::Value {
        match (field.field_type(), value) {
            (FieldType::Model(nested), Value::Model(inner)) => nested.render(inner),
            _ => value.to_json(),
        }
    }

    fn check(&self) -> SchemaResult<()> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            field.check()?;
            if !seen.insert(field.name()) {
                return Err(SchemaError::DuplicateField {
                    schema: self.name.clone(),
                    field: field.name().to_owned(),
                });
            }
        }
        let has_body = self.fields.iter().any(|f| f.source() == Source::Body);
        let has_form = self.fields.iter().any(|f| f.source().is_form());
        if has_body && has_form {
            return Err(SchemaError::MixedBody { schema: self.name.clone() });
        }
        Ok(())
    }
}
