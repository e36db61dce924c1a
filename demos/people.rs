//! The people API as a runnable server.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example people
//!
//! Try:
//!   curl -X POST http://localhost:3000/person/new \
//!        -H 'content-type: application/json' \
//!        -d '{"first_name":"Cristian","last_name":"Rojas","age":28,"password":"estoesunaprueba"}'
//!   curl 'http://localhost:3000/person/details?name=Laura&age=28'
//!   curl http://localhost:3000/person/details/99
//!   curl -X POST http://localhost:3000/login -d 'username=cristian&password=supersecret'
//!   curl -X POST http://localhost:3000/post-image -F image=@photo.png

mod people_app;

use std::sync::Arc;

use bindery::{KnownIds, Server};

#[tokio::main]
async fn main() -> Result<(), bindery::Error> {
    tracing_subscriber::fmt::init();

    let known = Arc::new(KnownIds::new(1..=5));
    let app = people_app::app(known)?;

    Server::from_env("BINDERY_ADDR", "0.0.0.0:3000").serve(app).await
}
