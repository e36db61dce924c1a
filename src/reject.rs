//! The two failure families and how each is rendered.
//!
//! | Family | Raised by | Status | Payload |
//! |---|---|---|---|
//! | [`ValidationFailure`] | the binding engine, before any handler runs | 422 | `[{"location", "message", "kind"}, …]` |
//! | [`DomainError`] | handler logic, after a successful bind | chosen by the handler | `{"detail": "…"}` |
//!
//! The shapes are never merged. [`Rejection`] only exists so a handler can
//! return either family through `?`.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::error::BodyError;
use crate::response::{IntoResponse, Json, Response};
use crate::status::Status;

/// What a single field got wrong.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    MissingRequired,
    TypeMismatch,
    BelowMin,
    AboveMax,
    NotInEnum,
    FormatInvalid,
}

impl ViolationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingRequired => "missing-required",
            Self::TypeMismatch    => "type-mismatch",
            Self::BelowMin        => "below-min",
            Self::AboveMax        => "above-max",
            Self::NotInEnum       => "not-in-enum",
            Self::FormatInvalid   => "format-invalid",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rule one field broke.
///
/// `location` starts with the source channel and ends with the field's wire
/// name, e.g. `["body", "person", "age"]` or `["query", "name"]`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Violation {
    pub location: Vec<String>,
    pub message: String,
    pub kind: ViolationKind,
}

impl Violation {
    pub fn new(location: Vec<String>, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self { location, message: message.into(), kind }
    }
}

/// Every violation found while binding one request, in field declaration
/// order. Never empty.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Error)]
#[serde(transparent)]
#[error("{}", summary(.violations))]
pub struct ValidationFailure {
    violations: Vec<Violation>,
}

fn summary(violations: &[Violation]) -> String {
    match violations.first() {
        Some(first) => format!(
            "{} invalid field(s), first at {}: {}",
            violations.len(),
            first.location.join("."),
            first.message
        ),
        None => "no invalid fields".to_owned(),
    }
}

impl ValidationFailure {
    /// `None` when there is nothing to report.
    pub(crate) fn from_violations(violations: Vec<Violation>) -> Option<Self> {
        if violations.is_empty() { None } else { Some(Self { violations }) }
    }

    pub fn violations(&self) -> &[Violation] { &self.violations }

    pub fn len(&self) -> usize { self.violations.len() }

    /// Always `false`; a failure carries at least one violation.
    pub fn is_empty(&self) -> bool { self.violations.is_empty() }

    /// The violations reported for the field whose location ends in `name`.
    pub fn for_field<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Violation> + 'a {
        self.violations
            .iter()
            .filter(move |v| v.location.last().is_some_and(|last| last == name))
    }
}

impl IntoResponse for ValidationFailure {
    fn into_response(self) -> Response {
        Json(Status::UnprocessableContent, self).into_response()
    }
}

/// A failure raised by handler logic after the request bound successfully.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("{detail}")]
pub struct DomainError {
    status: Status,
    detail: String,
}

#[derive(Serialize)]
struct Detail<'a> {
    detail: &'a str,
}

impl DomainError {
    pub fn new(status: Status, detail: impl Into<String>) -> Self {
        Self { status, detail: detail.into() }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(Status::NotFound, detail)
    }

    pub fn status(&self) -> Status { self.status }
    pub fn detail(&self) -> &str { &self.detail }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        Json(self.status, Detail { detail: &self.detail }).into_response()
    }
}

impl From<BodyError> for DomainError {
    fn from(e: BodyError) -> Self {
        Self::new(Status::ContentTooLarge, e.to_string())
    }
}

/// Either failure family, for handler return types.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum Rejection {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(v) => v.into_response(),
            Self::Domain(d) => d.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure() -> ValidationFailure {
        ValidationFailure::from_violations(vec![
            Violation::new(vec!["body".into(), "age".into()], ViolationKind::BelowMin, "ensure this value is greater than 0"),
            Violation::new(vec!["query".into(), "name".into()], ViolationKind::MissingRequired, "field required"),
        ])
        .unwrap()
    }

    #[test]
    fn no_violations_no_failure() {
        assert!(ValidationFailure::from_violations(Vec::new()).is_none());
    }

    #[test]
    fn validation_payload_is_an_ordered_list() {
        let res = failure().into_response();
        assert_eq!(res.status_code(), 422);
        assert_eq!(
            res.json_body().unwrap(),
            serde_json::json!([
                { "location": ["body", "age"], "message": "ensure this value is greater than 0", "kind": "below-min" },
                { "location": ["query", "name"], "message": "field required", "kind": "missing-required" },
            ])
        );
    }

    #[test]
    fn domain_payload_is_a_detail_object() {
        let res = Rejection::from(DomainError::not_found("this person doesn't exist")).into_response();
        assert_eq!(res.status_code(), 404);
        assert_eq!(res.json_body().unwrap(), serde_json::json!({ "detail": "this person doesn't exist" }));
    }

    #[test]
    fn display_names_the_first_violation() {
        assert_eq!(
            failure().to_string(),
            "2 invalid field(s), first at body.age: ensure this value is greater than 0"
        );
    }

    #[test]
    fn for_field_matches_the_last_location_segment() {
        let f = failure();
        assert_eq!(f.for_field("age").count(), 1);
        assert_eq!(f.for_field("body").count(), 0);
    }
}
