//! Unified error types.

use thiserror::Error;

/// The error type returned by bindery's fallible infrastructure operations.
///
/// Application-level outcomes (404, 422, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// binding to a port, accepting a connection, and schema definitions that
/// cannot work.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("schema: {0}")]
    Schema(#[from] SchemaError),
}

pub type SchemaResult<T> = Result<T, SchemaError>;

/// A schema or endpoint declaration that can never bind a request.
///
/// These are programming errors. They surface when the schema is built or the
/// endpoint is registered, never while a request is being served.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum SchemaError {
    #[error("schema `{schema}` declares field `{field}` more than once")]
    DuplicateField { schema: String, field: String },

    #[error("field `{field}`: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("path field `{field}` must be required")]
    OptionalPathField { field: String },

    #[error("path field `{field}` has no `{{{field}}}` segment in route `{route}`")]
    UnboundPathField { field: String, route: String },

    #[error("schema `{schema}` mixes a JSON body with form or multipart fields")]
    MixedBody { schema: String },

    #[error("projection `{projection}` excludes `{field}`, which `{schema}` does not declare")]
    UnknownField { projection: String, schema: String, field: String },

    #[error("invalid route `{route}`: {reason}")]
    InvalidRoute { route: String, reason: String },
}

impl SchemaError {
    pub(crate) fn invalid_field(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidField { field: field.to_owned(), reason: reason.into() }
    }
}

/// Failure to read a request body for reasons other than its content.
///
/// Malformed content is a validation failure. This covers the body exceeding
/// the configured [`UploadLimits`](crate::UploadLimits).
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum BodyError {
    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("part `{field}` exceeds {limit} bytes")]
    PartTooLarge { field: String, limit: u64 },
}
