//! HTTP status codes as a typed enum.
//!
//! Use [`Status`] for an endpoint's success status or the status of a
//! [`DomainError`](crate::DomainError).
//!
//! ```rust
//! use bindery::{DomainError, Endpoint, Status};
//!
//! // 201 on success instead of the default 200
//! # async fn create(m: bindery::BoundModel) -> Result<bindery::BoundModel, bindery::Rejection> { Ok(m) }
//! let endpoint = Endpoint::post("/person/new").status(Status::Created).handle(create);
//!
//! // a domain failure carries the status its handler picks
//! let missing = DomainError::new(Status::NotFound, "this person doesn't exist");
//! ```

/// The statuses bindery answers with, plus the ones handlers commonly raise
/// through [`DomainError`](crate::DomainError).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Status {
    Ok,                   // 200
    Created,              // 201
    NoContent,            // 204
    BadRequest,           // 400
    Unauthorized,         // 401
    Forbidden,            // 403
    NotFound,             // 404
    MethodNotAllowed,     // 405
    Conflict,             // 409
    ContentTooLarge,      // 413
    UnprocessableContent, // 422
    InternalServerError,  // 500
}

impl Status {
    /// The numeric code, e.g. `422` for [`Status::UnprocessableContent`].
    pub fn code(self) -> u16 {
        match self {
            Self::Ok                   => 200,
            Self::Created              => 201,
            Self::NoContent            => 204,
            Self::BadRequest           => 400,
            Self::Unauthorized         => 401,
            Self::Forbidden            => 403,
            Self::NotFound             => 404,
            Self::MethodNotAllowed     => 405,
            Self::Conflict             => 409,
            Self::ContentTooLarge      => 413,
            Self::UnprocessableContent => 422,
            Self::InternalServerError  => 500,
        }
    }

    /// `true` for 2xx codes.
    pub fn is_success(self) -> bool {
        (200..300).contains(&self.code())
    }
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 { s.code() }
}

impl From<Status> for http::StatusCode {
    fn from(s: Status) -> Self {
        // Every variant is a registered code, so the conversion cannot fail.
        http::StatusCode::from_u16(s.code()).unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
    }
}
