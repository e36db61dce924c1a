//! Endpoint declarations: route, input schema, output schema, handler.
//!
//! One generic pipeline serves every endpoint. The declaration supplies the
//! data it needs, nothing is hand-written per endpoint:
//!
//! ```rust
//! use bindery::{BoundModel, Endpoint, FieldDescriptor, FieldType, Rejection, Schema, Status};
//!
//! let person = Schema::new("Person", [
//!     FieldDescriptor::body("name", FieldType::Str),
//!     FieldDescriptor::body("password", FieldType::Str).min_length(8),
//! ])?;
//! let person_out = person.project("PersonOut", &["password"])?;
//!
//! async fn create(mut input: BoundModel) -> Result<Option<BoundModel>, Rejection> {
//!     Ok(input.take_model("person"))
//! }
//!
//! let endpoint = Endpoint::post("/person/new")
//!     .input(Schema::new("create_person", [
//!         FieldDescriptor::body("person", FieldType::model(&person)),
//!     ])?)
//!     .output(person_out)
//!     .status(Status::Created)
//!     .tag("Persons")
//!     .summary("Create Person in the app")
//!     .handle(create);
//! # Ok::<(), bindery::SchemaError>(())
//! ```

use std::sync::Arc;

use crate::bind::BoundModel;
use crate::error::{SchemaError, SchemaResult};
use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::response::{IntoResponse, Json, Response};
use crate::schema::Schema;
use crate::schema::field::Source;
use crate::status::Status;

/// What a handler hands back for serialization.
///
/// Whatever it is, an endpoint with an output schema only emits the fields
/// that schema declares.
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    Model(BoundModel),
    Json(serde_json::Value),
    /// No body, e.g. for `204 No Content`.
    Empty,
}

impl From<BoundModel> for Reply {
    fn from(m: BoundModel) -> Self { Self::Model(m) }
}

impl From<serde_json::Value> for Reply {
    fn from(v: serde_json::Value) -> Self { Self::Json(v) }
}

impl From<()> for Reply {
    fn from((): ()) -> Self { Self::Empty }
}

impl<T: Into<Reply>> From<Option<T>> for Reply {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Json(serde_json::Value::Null), Into::into)
    }
}

/// Documentation metadata. Carried for generators; never affects binding.
#[derive(Clone, Debug, Default)]
pub struct Docs {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub deprecated: bool,
}

/// A declared endpoint.
pub struct Endpoint {
    method: Method,
    path: String,
    input: Schema,
    output: Option<Schema>,
    status: Status,
    docs: Docs,
    handler: BoxedHandler,
}

/// Builder returned by [`Endpoint::new`] and the per-method shortcuts.
/// Terminated by [`EndpointBuilder::handle`].
pub struct EndpointBuilder {
    method: Method,
    path: String,
    input: Option<Schema>,
    output: Option<Schema>,
    status: Status,
    docs: Docs,
}

impl Endpoint {
    pub fn new(method: Method, path: &str) -> EndpointBuilder {
        EndpointBuilder {
            method,
            path: path.to_owned(),
            input: None,
            output: None,
            status: Status::Ok,
            docs: Docs::default(),
        }
    }

    pub fn get(path: &str) -> EndpointBuilder { Self::new(Method::Get, path) }
    pub fn post(path: &str) -> EndpointBuilder { Self::new(Method::Post, path) }
    pub fn put(path: &str) -> EndpointBuilder { Self::new(Method::Put, path) }
    pub fn patch(path: &str) -> EndpointBuilder { Self::new(Method::Patch, path) }
    pub fn delete(path: &str) -> EndpointBuilder { Self::new(Method::Delete, path) }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn input(&self) -> &Schema { &self.input }
    pub fn output(&self) -> Option<&Schema> { self.output.as_ref() }
    pub fn status(&self) -> Status { self.status }
    pub fn docs(&self) -> &Docs { &self.docs }

    pub(crate) fn handler(&self) -> &BoxedHandler { &self.handler }

    /// Serializes a handler's reply with the endpoint's success status.
    pub(crate) fn render(&self, reply: Reply) -> Response {
        let body = match (reply, &self.output) {
            (Reply::Empty, _) => return Response::builder().status(self.status).no_body(),
            (Reply::Model(m), Some(out)) => out.render(&m),
            (Reply::Json(v), Some(out)) => out.render_json(&v),
            (Reply::Model(m), None) => m.to_json(),
            (Reply::Json(v), None) => v,
        };
        Json(self.status, body).into_response()
    }

    /// Path fields must name a `{segment}` of the route.
    pub(crate) fn check(&self) -> SchemaResult<()> {
        for field in self.input.fields().iter().filter(|f| f.source() == Source::Path) {
            let segment = format!("{{{}}}", field.wire_name());
            if !self.path.split('/').any(|s| s == segment) {
                return Err(SchemaError::UnboundPathField {
                    field: field.name().to_owned(),
                    route: self.path.clone(),
                });
            }
        }
        Ok(())
    }
}

impl EndpointBuilder {
    /// The request schema. Defaults to a schema with no fields.
    pub fn input(mut self, schema: Schema) -> Self { self.input = Some(schema); self }

    /// The output projection every reply is rendered through.
    pub fn output(mut self, schema: Schema) -> Self { self.output = Some(schema); self }

    /// The status of a successful reply. Defaults to `200 OK`.
    pub fn status(mut self, status: Status) -> Self { self.status = status; self }

    pub fn tag(mut self, tag: impl Into<String>) -> Self { self.docs.tags.push(tag.into()); self }
    pub fn summary(mut self, text: impl Into<String>) -> Self { self.docs.summary = Some(text.into()); self }
    pub fn description(mut self, text: impl Into<String>) -> Self { self.docs.description = Some(text.into()); self }
    pub fn deprecated(mut self) -> Self { self.docs.deprecated = true; self }

    pub fn handle(self, handler: impl Handler) -> Endpoint {
        let input = self
            .input
            .unwrap_or_else(|| Schema::empty(format!("{} {}", self.method, self.path)));
        Endpoint {
            method: self.method,
            path: self.path,
            input,
            output: self.output,
            status: self.status,
            docs: self.docs,
            handler: handler.into_boxed_handler(),
        }
    }
}

/// Shared, immutable endpoint as stored in the router.
pub(crate) type SharedEndpoint = Arc<Endpoint>;
