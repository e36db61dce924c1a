//! # bindery
//!
//! Declarative request binding and validation for small HTTP APIs behind a
//! reverse proxy.
//!
//! ## The contract
//!
//! Every endpoint declares what it accepts as a [`Schema`]: an ordered table
//! of [`FieldDescriptor`]s, each naming its source channel (path, query,
//! form, header, cookie, multipart part, JSON body), its type, and its
//! constraints. bindery reads the request once, binds every field, and either
//! hands the handler a [`BoundModel`] or answers `422` with **every** invalid
//! field at once. Handlers never see unvalidated input.
//!
//! What leaves the process is declared too: an endpoint's output schema is a
//! projection of its input model, and replies are rendered through it. A
//! handler that returns the full internal model still cannot leak a password.
//!
//! Failures come in two shapes that never mix:
//!
//! - **validation**: `422`, `[{"location": [...], "message": "...", "kind": "..."}]`
//! - **domain**: the handler's status, `{"detail": "..."}`
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use bindery::{
//!     BoundModel, Endpoint, FieldDescriptor, FieldType, Rejection, Router, Schema, Server, Status,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), bindery::Error> {
//!     let person = Schema::new("Person", [
//!         FieldDescriptor::body("first_name", FieldType::Str).min_length(1).max_length(50),
//!         FieldDescriptor::body("age", FieldType::Integer).gt(0).le(115),
//!         FieldDescriptor::body("password", FieldType::Str).min_length(8),
//!     ])?;
//!     let person_out = person.project("PersonOut", &["password"])?;
//!
//!     let app = Router::new().endpoint(
//!         Endpoint::post("/person/new")
//!             .input(Schema::new("create_person", [
//!                 FieldDescriptor::body("person", FieldType::model(&person)),
//!             ])?)
//!             .output(person_out)
//!             .status(Status::Created)
//!             .handle(create_person),
//!     );
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await
//! }
//!
//! async fn create_person(mut input: BoundModel) -> Result<Option<BoundModel>, Rejection> {
//!     Ok(input.take_model("person"))
//! }
//! ```

mod endpoint;
mod error;
mod handler;
mod lookup;
mod method;
mod reject;
mod request;
mod response;
mod router;
mod server;
mod status;
mod value;

pub mod bind;
pub mod schema;

pub use bind::locate::{Inputs, UploadLimits};
pub use bind::{BoundModel, BoundValue};
pub use endpoint::{Docs, Endpoint, EndpointBuilder, Reply};
pub use error::{BodyError, Error, SchemaError, SchemaResult};
pub use handler::Handler;
pub use lookup::{ExistenceLookup, KnownIds};
pub use method::Method;
pub use reject::{DomainError, Rejection, ValidationFailure, Violation, ViolationKind};
pub use request::Request;
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use schema::Schema;
pub use schema::constraint::{Constraints, Format};
pub use schema::field::{EnumType, FieldDescriptor, FieldType, Presence, Source};
pub use server::Server;
pub use status::Status;
pub use value::{UploadedFile, Value};
