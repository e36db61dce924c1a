//! The validation engine.
//!
//! [`bind`] walks a schema's fields in declaration order, locates each raw
//! value, coerces it, and checks its constraints. A broken field never stops
//! the walk: the caller gets every violation of the request at once, or a
//! [`BoundModel`] when there are none.
//!
//! Body fields follow one extra rule. When a request schema's only body field
//! is a nested model, the JSON payload itself is that model and violations
//! are located at `["body", <field>]`. Otherwise every body field is embedded
//! under its own key: `["body", <key>, <field>]`.

pub mod coerce;
pub mod locate;

use tracing::trace;

use crate::reject::{ValidationFailure, Violation, ViolationKind};
use crate::schema::Schema;
use crate::schema::field::{FieldDescriptor, FieldType, Presence, Source};
use crate::value::{UploadedFile, Value};

use coerce::coerce;
use locate::{BodyView, Inputs, Raw};

/// How a field got its value.
#[derive(Clone, Debug, PartialEq)]
pub enum BoundValue {
    /// Supplied by the request and valid.
    Present(Value),
    /// Not supplied; the declared default.
    Defaulted(Value),
}

impl BoundValue {
    pub fn value(&self) -> &Value {
        match self {
            Self::Present(v) | Self::Defaulted(v) => v,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Self::Present(v) | Self::Defaulted(v) => v,
        }
    }
}

/// A request bound to a schema with zero violations.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundModel {
    schema: String,
    fields: Vec<(String, BoundValue)>,
}

impl BoundModel {
    pub(crate) fn new(schema: &str, fields: Vec<(String, BoundValue)>) -> Self {
        Self { schema: schema.to_owned(), fields }
    }

    /// The name of the schema this model was bound against.
    pub fn schema_name(&self) -> &str { &self.schema }

    pub fn len(&self) -> usize { self.fields.len() }
    pub fn is_empty(&self) -> bool { self.fields.is_empty() }

    pub fn bound(&self, name: &str) -> Option<&BoundValue> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bound(name).map(BoundValue::value)
    }

    pub fn str(&self, name: &str) -> Option<&str> { self.get(name)?.as_str() }
    pub fn int(&self, name: &str) -> Option<i64> { self.get(name)?.as_i64() }
    pub fn bool(&self, name: &str) -> Option<bool> { self.get(name)?.as_bool() }
    pub fn file(&self, name: &str) -> Option<&UploadedFile> { self.get(name)?.as_file() }
    pub fn model(&self, name: &str) -> Option<&BoundModel> { self.get(name)?.as_model() }

    pub fn is_defaulted(&self, name: &str) -> bool {
        matches!(self.bound(name), Some(BoundValue::Defaulted(_)))
    }

    /// Moves a nested model out, e.g. to return it from a handler.
    pub fn take_model(&mut self, name: &str) -> Option<BoundModel> {
        let idx = self.fields.iter().position(|(k, v)| k == name && v.value().as_model().is_some())?;
        match self.fields.remove(idx).1.into_value() {
            Value::Model(m) => Some(m),
            _ => None,
        }
    }

    /// Overwrites (or appends) a field. Handlers may do this freely; output
    /// projection still decides what leaves the process.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        let value = BoundValue::Present(value.into());
        match self.fields.iter_mut().find(|(k, _)| k == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name.to_owned(), value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.value()))
    }

    /// Every field, unfiltered.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.iter().map(|(k, v)| (k.to_owned(), v.to_json())).collect(),
        )
    }
}

/// Binds `inputs` against `schema`.
pub fn bind(schema: &Schema, inputs: &Inputs) -> Result<BoundModel, ValidationFailure> {
    let mut binder = Binder::default();
    let lone_model = lone_body_model(schema);
    let mut values = Vec::with_capacity(schema.fields().len());

    for field in schema.fields() {
        let channel = field.source().as_str().to_owned();
        if field.source().reads_body() {
            if let BodyView::Malformed(reason) = inputs.body() {
                binder.malformed_body(reason);
                continue;
            }
        }
        let outcome = match field.source() {
            Source::Body if lone_model == Some(field.name()) => {
                let raw = match inputs.body() {
                    BodyView::Json(json) => Some(Raw::Json(json)),
                    _ => None,
                };
                binder.field(field, raw, vec![channel])
            }
            _ => binder.field(field, inputs.locate(field), vec![channel, field.wire_name()]),
        };
        if let Some(value) = outcome {
            values.push((field.name().to_owned(), value));
        }
    }

    match ValidationFailure::from_violations(binder.violations) {
        Some(failure) => {
            trace!(schema = schema.name(), violations = failure.len(), "bind rejected");
            Err(failure)
        }
        None => Ok(BoundModel::new(schema.name(), values)),
    }
}

/// Binds a bare JSON payload against `schema`, every field read by key.
pub fn bind_json(schema: &Schema, payload: &serde_json::Value) -> Result<BoundModel, ValidationFailure> {
    let mut binder = Binder::default();
    let value = match payload {
        serde_json::Value::Object(obj) => binder.model(schema, obj, &["body".to_owned()]),
        _ => {
            binder.reject(vec!["body".to_owned()], ViolationKind::TypeMismatch, "value is not a valid object");
            None
        }
    };
    match (value, ValidationFailure::from_violations(binder.violations)) {
        (_, Some(failure)) => Err(failure),
        (Some(Value::Model(model)), None) => Ok(model),
        _ => Ok(BoundModel::new(schema.name(), Vec::new())),
    }
}

/// The name of the request schema's only body field, when it is a model.
fn lone_body_model(schema: &Schema) -> Option<&str> {
    let mut body = schema.fields().iter().filter(|f| f.source() == Source::Body);
    match (body.next(), body.next()) {
        (Some(f), None) if matches!(f.field_type(), FieldType::Model(_)) => Some(f.name()),
        _ => None,
    }
}

#[derive(Default)]
struct Binder {
    violations: Vec<Violation>,
    body_reported: bool,
}

impl Binder {
    fn reject(&mut self, location: Vec<String>, kind: ViolationKind, message: impl Into<String>) {
        self.violations.push(Violation::new(location, kind, message));
    }

    /// One violation for the whole body, however many fields read from it.
    fn malformed_body(&mut self, reason: &str) {
        if !self.body_reported {
            self.body_reported = true;
            self.reject(vec!["body".to_owned()], ViolationKind::TypeMismatch, reason);
        }
    }

    fn field(&mut self, field: &FieldDescriptor, raw: Option<Raw<'_>>, location: Vec<String>) -> Option<BoundValue> {
        let Some(raw) = raw else {
            return match field.presence() {
                Presence::Required => {
                    self.reject(location, ViolationKind::MissingRequired, "field required");
                    None
                }
                Presence::Optional(default) => Some(BoundValue::Defaulted(default.clone())),
            };
        };

        let value = match (field.field_type(), raw) {
            (FieldType::Model(nested), Raw::Json(serde_json::Value::Object(obj))) => {
                self.model(nested, obj, &location)?
            }
            (FieldType::Model(_), _) => {
                self.reject(location, ViolationKind::TypeMismatch, "value is not a valid object");
                return None;
            }
            (ty, raw) => match coerce(raw, ty) {
                Ok(value) => value,
                Err(message) => {
                    self.reject(location, ViolationKind::TypeMismatch, message);
                    return None;
                }
            },
        };

        let broken = field.constraints().check(&value);
        if broken.is_empty() {
            return Some(BoundValue::Present(value));
        }
        for (kind, message) in broken {
            self.reject(location.clone(), kind, message);
        }
        None
    }

    /// Binds a JSON object against a nested schema. `None` if any of its
    /// fields was rejected.
    fn model(
        &mut self,
        schema: &Schema,
        obj: &serde_json::Map<String, serde_json::Value>,
        location: &[String],
    ) -> Option<Value> {
        let before = self.violations.len();
        let mut values = Vec::with_capacity(schema.fields().len());
        for field in schema.fields() {
            let wire = field.wire_name();
            let raw = obj.get(&wire).filter(|v| !v.is_null()).map(Raw::Json);
            let mut loc = location.to_vec();
            loc.push(wire);
            if let Some(value) = self.field(field, raw, loc) {
                values.push((field.name().to_owned(), value));
            }
        }
        (self.violations.len() == before).then(|| Value::Model(BoundModel::new(schema.name(), values)))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::field::EnumType;

    fn person() -> Schema {
        Schema::new("Person", [
            FieldDescriptor::body("first_name", FieldType::Str).min_length(1).max_length(50),
            FieldDescriptor::body("last_name", FieldType::Str).min_length(1).max_length(50),
            FieldDescriptor::body("age", FieldType::Integer).gt(0).le(115),
            FieldDescriptor::body("hair_color", FieldType::Enum(EnumType::new("HairColor", ["white", "brown"]))).optional(),
            FieldDescriptor::body("is_married", FieldType::Boolean).optional(),
        ])
        .unwrap()
    }

    fn kinds(failure: &ValidationFailure) -> Vec<(String, ViolationKind)> {
        failure
            .violations()
            .iter()
            .map(|v| (v.location.join("."), v.kind))
            .collect()
    }

    #[test]
    fn binds_present_and_defaulted_values() {
        let model = bind_json(&person(), &json!({
            "first_name": "Cristian", "last_name": "Rojas", "age": 28, "is_married": null,
        }))
        .unwrap();
        assert_eq!(model.str("first_name"), Some("Cristian"));
        assert_eq!(model.int("age"), Some(28));
        assert!(model.is_defaulted("hair_color"));
        assert!(model.is_defaulted("is_married"));
        assert_eq!(model.get("is_married"), Some(&Value::Null));
    }

    #[test]
    fn reports_every_broken_field_in_order() {
        let err = bind_json(&person(), &json!({ "last_name": "", "age": "old", "hair_color": "Brown" }))
            .unwrap_err();
        assert_eq!(kinds(&err), [
            ("body.first_name".to_owned(), ViolationKind::MissingRequired),
            ("body.last_name".to_owned(), ViolationKind::BelowMin),
            ("body.age".to_owned(), ViolationKind::TypeMismatch),
            ("body.hair_color".to_owned(), ViolationKind::TypeMismatch),
        ]);
    }

    #[test]
    fn lone_body_model_binds_the_payload_itself() {
        let request = Schema::new("create_person", [
            FieldDescriptor::body("person", FieldType::model(&person())),
        ])
        .unwrap();
        let inputs = Inputs::from_json(json!({ "first_name": "Ana", "last_name": "Gil", "age": 0 }));
        let err = bind(&request, &inputs).unwrap_err();
        assert_eq!(kinds(&err), [("body.age".to_owned(), ViolationKind::BelowMin)]);

        let inputs = Inputs::from_json(json!({ "first_name": "Ana", "last_name": "Gil", "age": 30 }));
        let model = bind(&request, &inputs).unwrap();
        assert_eq!(model.model("person").and_then(|p| p.int("age")), Some(30));
    }

    #[test]
    fn several_body_fields_are_embedded_by_key() {
        let location = Schema::new("Location", [FieldDescriptor::body("city", FieldType::Str)]).unwrap();
        let request = Schema::new("update", [
            FieldDescriptor::body("person", FieldType::model(&person())),
            FieldDescriptor::body("location", FieldType::model(&location)),
        ])
        .unwrap();
        let inputs = Inputs::from_json(json!({
            "person": { "first_name": "Ana", "last_name": "Gil", "age": 200 },
            "location": "Bogotá",
        }));
        let err = bind(&request, &inputs).unwrap_err();
        assert_eq!(kinds(&err), [
            ("body.person.age".to_owned(), ViolationKind::AboveMax),
            ("body.location".to_owned(), ViolationKind::TypeMismatch),
        ]);
    }

    #[test]
    fn absent_body_is_missing_not_malformed() {
        let request = Schema::new("create_person", [
            FieldDescriptor::body("person", FieldType::model(&person())),
        ])
        .unwrap();
        let err = bind(&request, &Inputs::default()).unwrap_err();
        assert_eq!(kinds(&err), [("body".to_owned(), ViolationKind::MissingRequired)]);
    }

    #[tokio::test]
    async fn malformed_multipart_is_one_body_violation() {
        let upload = Schema::new("post_image", [
            FieldDescriptor::file("image"),
            FieldDescriptor::form("caption", FieldType::Str),
        ])
        .unwrap();
        let (parts, ()) = http::Request::builder()
            .uri("/post-image")
            .header("content-type", "multipart/form-data; boundary=XyZ")
            .body(())
            .unwrap()
            .into_parts();
        let truncated = bytes::Bytes::from_static(
            b"--XyZ\r\nContent-Disposition: form-data; name=\"image\"; filename=\"a.png\"\r\n\r\nPNG",
        );
        let req = crate::request::Request::new(crate::method::Method::Post, parts, truncated, Default::default());
        let inputs = Inputs::read(&req, &locate::UploadLimits::default()).await.unwrap();

        let err = bind(&upload, &inputs).unwrap_err();
        assert_eq!(kinds(&err), [("body".to_owned(), ViolationKind::TypeMismatch)]);
    }

    #[test]
    fn non_object_payloads_are_type_mismatches() {
        let err = bind_json(&person(), &json!([1, 2, 3])).unwrap_err();
        assert_eq!(kinds(&err), [("body".to_owned(), ViolationKind::TypeMismatch)]);
    }

    #[test]
    fn handlers_can_overwrite_and_take_fields() {
        let request = Schema::new("create_person", [
            FieldDescriptor::body("person", FieldType::model(&person())),
        ])
        .unwrap();
        let inputs = Inputs::from_json(json!({ "first_name": "Ana", "last_name": "Gil", "age": 30 }));
        let mut model = bind(&request, &inputs).unwrap();
        let mut person = model.take_model("person").unwrap();
        assert!(model.is_empty());
        person.set("age", 31);
        person.set("nickname", "annie");
        assert_eq!(person.int("age"), Some(31));
        assert_eq!(person.to_json()["nickname"], "annie");
    }
}
