//! Raw values per source channel.
//!
//! [`Inputs::read`] takes everything a request offers once: path parameters,
//! query pairs, headers, cookies, and the body parsed according to its media
//! type. Path and query values are percent-decoded. Multipart file parts are
//! drained completely before any field is bound. Lookups afterwards are plain
//! reads.

use std::borrow::Cow;
use std::collections::HashMap;
use std::convert::Infallible;

use bytes::Bytes;
use http::HeaderMap;
use multer::{Constraints, Multipart, SizeLimit};
use percent_encoding::percent_decode_str;
use tracing::debug;

use crate::error::BodyError;
use crate::request::Request;
use crate::schema::field::{FieldDescriptor, Source};
use crate::value::UploadedFile;

/// Byte limits applied while draining a `multipart/form-data` body.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UploadLimits {
    /// The whole multipart stream.
    pub whole_stream: u64,
    /// Any single part, file or text.
    pub per_part: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self { whole_stream: 16 * 1024 * 1024, per_part: 8 * 1024 * 1024 }
    }
}

/// A located, not yet coerced value.
#[derive(Clone, Debug)]
pub enum Raw<'a> {
    Text(Cow<'a, str>),
    Json(&'a serde_json::Value),
    File(&'a UploadedFile),
    /// Percent-decodes to bytes that are not UTF-8.
    Undecodable,
}

/// What the body channel holds for JSON-bound fields.
#[derive(Debug)]
pub(crate) enum BodyView<'a> {
    Absent,
    Json(&'a serde_json::Value),
    Malformed(&'a str),
}

#[derive(Debug, Default)]
enum Payload {
    #[default]
    Empty,
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
    Multipart {
        texts: Vec<(String, String)>,
        files: Vec<(String, UploadedFile)>,
    },
    Malformed(String),
}

/// Every raw input of one request.
#[derive(Debug, Default)]
pub struct Inputs {
    params: HashMap<String, String>,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    cookies: Vec<(String, String)>,
    payload: Payload,
}

impl Inputs {
    /// Reads `req` once.
    ///
    /// # Errors
    ///
    /// Only when a multipart body breaks `limits`. Malformed bodies are kept
    /// and reported as validation failures of the body channel.
    pub async fn read(req: &Request, limits: &UploadLimits) -> Result<Self, BodyError> {
        let query = req
            .query_string()
            .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();

        let payload = match req.media_type().as_deref() {
            _ if req.body().is_empty() => Payload::Empty,
            Some("application/x-www-form-urlencoded") => {
                Payload::Form(form_urlencoded::parse(req.body()).into_owned().collect())
            }
            Some("multipart/form-data") => {
                let content_type = req.content_type().unwrap_or_default();
                read_multipart(req.body.clone(), content_type, limits).await?
            }
            _ => match serde_json::from_slice(req.body()) {
                Ok(json) => Payload::Json(json),
                Err(e) => Payload::Malformed(format!("invalid JSON: {e}")),
            },
        };

        Ok(Self {
            params: req.params.clone(),
            query,
            headers: req.headers().clone(),
            cookies: req.cookies(),
            payload,
        })
    }

    /// Inputs whose only channel is a JSON body.
    pub fn from_json(body: serde_json::Value) -> Self {
        Self { payload: Payload::Json(body), ..Self::default() }
    }

    /// The raw value of a non-body field, or `None` when it was not supplied.
    pub(crate) fn locate(&self, field: &FieldDescriptor) -> Option<Raw<'_>> {
        let wire = field.wire_name();
        match field.source() {
            Source::Path => self.params.get(&wire).map(|v| match percent_decode_str(v).decode_utf8() {
                Ok(decoded) => Raw::Text(decoded),
                Err(_) => Raw::Undecodable,
            }),
            Source::Query => first(&self.query, &wire),
            Source::Cookie => first(&self.cookies, &wire),
            Source::Header => self
                .headers
                .get(wire.as_str())
                .map(|v| Raw::Text(String::from_utf8_lossy(v.as_bytes()))),
            Source::Form => match &self.payload {
                Payload::Form(pairs) => first(pairs, &wire),
                Payload::Multipart { texts, files } => {
                    first(texts, &wire).or_else(|| file(files, &wire))
                }
                _ => None,
            },
            Source::Multipart => match &self.payload {
                Payload::Multipart { texts, files } => {
                    file(files, &wire).or_else(|| first(texts, &wire))
                }
                _ => None,
            },
            Source::Body => match &self.payload {
                Payload::Json(json) => json.get(&wire).filter(|v| !v.is_null()).map(Raw::Json),
                _ => None,
            },
        }
    }

    pub(crate) fn body(&self) -> BodyView<'_> {
        match &self.payload {
            Payload::Json(serde_json::Value::Null) => BodyView::Absent,
            Payload::Json(json) => BodyView::Json(json),
            Payload::Malformed(reason) => BodyView::Malformed(reason),
            _ => BodyView::Absent,
        }
    }
}

fn first<'a>(pairs: &'a [(String, String)], name: &str) -> Option<Raw<'a>> {
    pairs
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| Raw::Text(Cow::Borrowed(v.as_str())))
}

fn file<'a>(files: &'a [(String, UploadedFile)], name: &str) -> Option<Raw<'a>> {
    files.iter().find(|(k, _)| k == name).map(|(_, f)| Raw::File(f))
}

async fn read_multipart(
    body: Bytes,
    content_type: &str,
    limits: &UploadLimits,
) -> Result<Payload, BodyError> {
    let boundary = match multer::parse_boundary(content_type) {
        Ok(b) => b,
        Err(e) => return Ok(Payload::Malformed(e.to_string())),
    };
    let constraints = Constraints::new().size_limit(
        SizeLimit::new()
            .whole_stream(limits.whole_stream)
            .per_field(limits.per_part),
    );
    let stream = futures_util::stream::once(async move { Ok::<Bytes, Infallible>(body) });
    let mut multipart = Multipart::with_constraints(stream, boundary, constraints);

    let mut texts = Vec::new();
    let mut files = Vec::new();
    loop {
        let part = match multipart.next_field().await {
            Ok(Some(part)) => part,
            Ok(None) => break,
            Err(e) => return multipart_failure(e),
        };
        let name = part.name().unwrap_or_default().to_owned();
        let filename = part.file_name().map(str::to_owned);
        let content_type = part.content_type().map(ToString::to_string);
        let data = match part.bytes().await {
            Ok(data) => data,
            Err(e) => return multipart_failure(e),
        };
        debug!(part = %name, bytes = data.len(), file = filename.is_some(), "multipart part drained");
        match filename {
            Some(_) => files.push((name, UploadedFile::new(filename, content_type, data))),
            None => texts.push((name, String::from_utf8_lossy(&data).into_owned())),
        }
    }
    Ok(Payload::Multipart { texts, files })
}

fn multipart_failure(e: multer::Error) -> Result<Payload, BodyError> {
    match e {
        multer::Error::StreamSizeExceeded { limit } => Err(BodyError::TooLarge { limit }),
        multer::Error::FieldSizeExceeded { limit, field_name } => Err(BodyError::PartTooLarge {
            field: field_name.unwrap_or_default(),
            limit,
        }),
        other => Ok(Payload::Malformed(format!("invalid multipart body: {other}"))),
    }
}
