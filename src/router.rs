//! Radix-tree endpoint registry and the request pipeline.
//!
//! One tree per HTTP method, O(path-length) lookup. Every matched request
//! runs the same pipeline:
//!
//! ```text
//! lookup → read inputs once → bind input schema ─┬─ 422 violation list
//!                                                └─ handler ─┬─ {"detail"} with the handler's status
//!                                                            └─ reply rendered through the output schema
//! ```
//!
//! The registry is a plain value built at startup and handed to
//! [`Server::serve`](crate::Server::serve). There is no global app state.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use matchit::Router as MatchitRouter;
use tracing::{debug, info, warn};

use crate::bind::locate::{Inputs, UploadLimits};
use crate::endpoint::{Endpoint, SharedEndpoint};
use crate::error::SchemaError;
use crate::method::Method;
use crate::reject::{DomainError, Rejection};
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::status::Status;

/// The endpoint registry.
///
/// Build it once at startup; each [`Router::endpoint`] call returns `self`
/// so registrations chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<SharedEndpoint>>,
    endpoints: Vec<SharedEndpoint>,
    limits: UploadLimits,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), endpoints: Vec::new(), limits: UploadLimits::default() }
    }

    /// Registers an endpoint. Returns `self` for chaining.
    ///
    /// # Panics
    ///
    /// Panics if the route is invalid or conflicts with an existing one, or
    /// if the endpoint's path fields do not match its route. Use
    /// [`Router::try_endpoint`] to handle these as errors.
    pub fn endpoint(self, endpoint: Endpoint) -> Self {
        let route = format!("{} {}", endpoint.method(), endpoint.path());
        self.try_endpoint(endpoint)
            .unwrap_or_else(|e| panic!("cannot register `{route}`: {e}"))
    }

    /// Registers an endpoint, reporting declaration mistakes as errors.
    pub fn try_endpoint(mut self, endpoint: Endpoint) -> Result<Self, SchemaError> {
        endpoint.check()?;
        let endpoint = Arc::new(endpoint);
        self.routes
            .entry(endpoint.method())
            .or_default()
            .insert(endpoint.path(), Arc::clone(&endpoint))
            .map_err(|e| SchemaError::InvalidRoute {
                route: endpoint.path().to_owned(),
                reason: e.to_string(),
            })?;
        debug!(method = %endpoint.method(), path = endpoint.path(), "endpoint registered");
        self.endpoints.push(endpoint);
        Ok(self)
    }

    /// Byte limits for multipart bodies.
    pub fn upload_limits(mut self, limits: UploadLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Every registered endpoint in registration order, e.g. for a
    /// documentation generator.
    pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter().map(|e| e.as_ref())
    }

    /// Runs one request through the full pipeline.
    ///
    /// The server calls this for every request after reading its body. Tests
    /// and embedders can call it directly, no socket involved.
    pub async fn call(&self, req: http::Request<Bytes>) -> Response {
        let (parts, body) = req.into_parts();
        let path = parts.uri.path().to_owned();

        let Ok(method) = Method::try_from(&parts.method) else {
            return DomainError::new(Status::MethodNotAllowed, "Method Not Allowed").into_response();
        };
        let Some((endpoint, params)) = self.lookup(method, &path) else {
            return self.unmatched(&path);
        };

        let request = Request::new(method, parts, body, params);
        let response = match Inputs::read(&request, &self.limits).await {
            Err(e) => {
                warn!(%method, %path, "request body rejected: {e}");
                DomainError::from(e).into_response()
            }
            Ok(inputs) => match endpoint.input().bind(&inputs) {
                Err(failure) => {
                    debug!(%method, %path, violations = failure.len(), "request failed validation");
                    failure.into_response()
                }
                Ok(model) => match endpoint.handler().call(model).await {
                    Ok(reply) => endpoint.render(reply),
                    Err(rejection) => {
                        if let Rejection::Domain(e) = &rejection {
                            debug!(%method, %path, status = e.status().code(), "handler raised: {e}");
                        }
                        rejection.into_response()
                    }
                },
            },
        };

        info!(%method, %path, status = response.status_code(), "request served");
        response
    }

    fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(SharedEndpoint, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let endpoint = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((endpoint, params))
    }

    /// 405 when another method owns the path, 404 otherwise.
    fn unmatched(&self, path: &str) -> Response {
        let known = Method::ALL
            .iter()
            .filter_map(|m| self.routes.get(m))
            .any(|tree| tree.at(path).is_ok());
        if known {
            DomainError::new(Status::MethodNotAllowed, "Method Not Allowed").into_response()
        } else {
            DomainError::not_found("Not Found").into_response()
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
