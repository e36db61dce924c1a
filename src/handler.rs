//! Handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! Every endpoint holds a handler of a different concrete type, so the router
//! stores them behind one trait object (`dyn ErasedHandler`).
//!
//! ```text
//! async fn create(person: BoundModel) -> Result<BoundModel, Rejection> { … }
//!        ↓ Endpoint::post("/person/new").handle(create)
//! create.into_boxed_handler()                      ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(create))                      ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(model)  once the request bound      ← one vtable dispatch
//!        ↓
//! Box::pin(async { create(model).await.map(Into::into) })  ← BoxFuture
//! ```
//!
//! Handlers only ever see a [`BoundModel`]: a request that fails to bind is
//! answered before any handler code runs.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::bind::BoundModel;
use crate::endpoint::Reply;
use crate::reject::Rejection;

// ── Internal types ────────────────────────────────────────────────────────────

/// What a handler resolves to once its output is normalized into a [`Reply`].
pub(crate) type Outcome = Result<Reply, Rejection>;

/// A heap-allocated, type-erased handler future.
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Outcome> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, model: BoundModel) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid endpoint handler.
///
/// You never implement this yourself. It is satisfied by any `async fn` (or
/// closure returning a future) with the shape:
///
/// ```text
/// async fn name(input: BoundModel) -> Result<impl Into<Reply>, Rejection>
/// ```
///
/// Collaborators such as an [`ExistenceLookup`](crate::ExistenceLookup) are
/// captured by a closure:
///
/// ```rust
/// use std::sync::Arc;
/// use bindery::{BoundModel, DomainError, Endpoint, ExistenceLookup, KnownIds, Rejection};
///
/// let known: Arc<dyn ExistenceLookup> = Arc::new(KnownIds::new([1, 2, 3]));
/// let endpoint = Endpoint::get("/person/{id}").handle(move |input: BoundModel| {
///     let known = Arc::clone(&known);
///     async move {
///         let id = input.int("id").unwrap_or_default();
///         if !known.exists(id) {
///             return Err(Rejection::from(DomainError::not_found("no such person")));
///         }
///         Ok(serde_json::json!({ "id": id }))
///     }
/// });
/// ```
///
/// The trait is sealed: only the blanket impl below satisfies it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(BoundModel) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, Rejection>> + Send + 'static,
    R: Into<Reply> + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(BoundModel) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, Rejection>> + Send + 'static,
    R: Into<Reply> + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Holds a concrete handler `F` and implements [`ErasedHandler`] for it.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(BoundModel) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R, Rejection>> + Send + 'static,
    R: Into<Reply> + Send + 'static,
{
    fn call(&self, model: BoundModel) -> BoxFuture {
        let fut = (self.0)(model);
        Box::pin(async move { fut.await.map(Into::into) })
    }
}
