//! The people API: every source channel behind one router.
//!
//! Shared by the `people` demo binary and the integration tests.

use std::sync::Arc;

use bindery::{
    BoundModel, DomainError, Endpoint, EnumType, ExistenceLookup, FieldDescriptor, FieldType,
    Rejection, Router, Schema, SchemaResult, Status,
};
use serde_json::json;

pub fn hair_color() -> EnumType {
    EnumType::new("HairColor", ["white", "brown", "black", "blonde", "red"])
}

/// The fields shared by what a person sends and what they get back.
pub fn person_base() -> SchemaResult<Schema> {
    Schema::new("PersonBase", [
        FieldDescriptor::body("first_name", FieldType::Str)
            .min_length(1)
            .max_length(50)
            .example("Cristian"),
        FieldDescriptor::body("last_name", FieldType::Str)
            .min_length(1)
            .max_length(50)
            .example("Rojas"),
        FieldDescriptor::body("age", FieldType::Integer).gt(0).le(115).example(28),
        FieldDescriptor::body("hair_color", FieldType::Enum(hair_color()))
            .optional()
            .example("brown"),
        FieldDescriptor::body("is_married", FieldType::Boolean).optional().example(false),
    ])
}

pub struct Models {
    pub person: Schema,
    pub person_out: Schema,
    pub login_out: Schema,
}

pub fn models() -> SchemaResult<Models> {
    let person = person_base()?.extend("Person", [
        FieldDescriptor::body("password", FieldType::Str)
            .min_length(8)
            .example("estoesunaprueba"),
    ])?;
    let person_out = person.project("PersonOut", &["password"])?;
    let login_out = Schema::new("LoginOut", [
        FieldDescriptor::body("username", FieldType::Str).max_length(20).example("cristian2021"),
        FieldDescriptor::body("message", FieldType::Str).default("Login Successfully!"),
    ])?;
    Ok(Models { person, person_out, login_out })
}

pub fn app(known: Arc<dyn ExistenceLookup>) -> SchemaResult<Router> {
    let Models { person, person_out, login_out } = models()?;

    let person_id = || {
        FieldDescriptor::path("person_id", FieldType::Integer)
            .gt(0)
            .title("Person ID")
            .example(3)
    };

    let show_by_id = move |input: BoundModel| {
        let known = Arc::clone(&known);
        async move {
            let id = input.int("person_id").unwrap_or_default();
            if !known.exists(id) {
                return Err(Rejection::from(DomainError::not_found("¡This person doesn't exist!")));
            }
            let mut body = serde_json::Map::new();
            body.insert(id.to_string(), json!("It exists!"));
            Ok(serde_json::Value::Object(body))
        }
    };

    Router::new()
        .try_endpoint(Endpoint::get("/").tag("Home").summary("Home").handle(home))?
        .try_endpoint(
            Endpoint::post("/person/new")
                .input(Schema::new("create_person", [
                    FieldDescriptor::body("person", FieldType::model(&person)),
                ])?)
                .output(person_out.clone())
                .status(Status::Created)
                .tag("Persons")
                .summary("Create Person in the app")
                .handle(create_person),
        )?
        .try_endpoint(
            Endpoint::get("/person/details")
                .input(Schema::new("show_person", [
                    FieldDescriptor::query("name", FieldType::Str)
                        .optional()
                        .min_length(1)
                        .max_length(50)
                        .title("Person Name")
                        .description("This is the person name. It's between 1 and 50 characters")
                        .example("Laura"),
                    FieldDescriptor::query("age", FieldType::Str)
                        .title("Person Age")
                        .description("This is the person age. It's required")
                        .example("28"),
                ])?)
                .tag("Persons")
                .handle(show_person),
        )?
        .try_endpoint(
            Endpoint::get("/person/details/{person_id}")
                .input(Schema::new("show_person_by_id", [person_id()])?)
                .tag("Persons")
                .handle(show_by_id),
        )?
        .try_endpoint(
            Endpoint::put("/person/{person_id}")
                .input(Schema::new("update_person", [
                    person_id(),
                    FieldDescriptor::body("person", FieldType::model(&person)),
                ])?)
                .output(person_out)
                .tag("Persons")
                .handle(update_person),
        )?
        .try_endpoint(
            Endpoint::post("/login")
                .input(Schema::new("login", [
                    FieldDescriptor::form("username", FieldType::Str).max_length(20),
                    FieldDescriptor::form("password", FieldType::Str).min_length(8),
                ])?)
                .output(login_out)
                .tag("Login")
                .handle(login),
        )?
        .try_endpoint(
            Endpoint::post("/contact")
                .input(Schema::new("contact", [
                    FieldDescriptor::form("first_name", FieldType::Str).min_length(1).max_length(20),
                    FieldDescriptor::form("last_name", FieldType::Str).min_length(1).max_length(20),
                    FieldDescriptor::form("email", FieldType::Str).email(),
                    FieldDescriptor::form("message", FieldType::Str).min_length(20),
                    FieldDescriptor::header("user_agent", FieldType::Str).optional(),
                    FieldDescriptor::cookie("ads", FieldType::Str).optional(),
                ])?)
                .tag("Contact")
                .handle(contact),
        )?
        .try_endpoint(
            Endpoint::post("/post-image")
                .input(Schema::new("post_image", [FieldDescriptor::file("image")])?)
                .tag("Files")
                .handle(post_image),
        )
}

async fn home(_: BoundModel) -> Result<serde_json::Value, Rejection> {
    Ok(json!({ "Hello": "World" }))
}

async fn create_person(mut input: BoundModel) -> Result<Option<BoundModel>, Rejection> {
    Ok(input.take_model("person"))
}

async fn show_person(input: BoundModel) -> Result<serde_json::Value, Rejection> {
    let name = input.str("name").unwrap_or("null").to_owned();
    let age = input.str("age").unwrap_or_default();
    let mut body = serde_json::Map::new();
    body.insert(name, json!(age));
    Ok(serde_json::Value::Object(body))
}

async fn update_person(mut input: BoundModel) -> Result<Option<BoundModel>, Rejection> {
    Ok(input.take_model("person"))
}

async fn login(mut input: BoundModel) -> Result<BoundModel, Rejection> {
    input.set("message", "Login Successfully!");
    Ok(input)
}

async fn contact(input: BoundModel) -> Result<serde_json::Value, Rejection> {
    Ok(json!(input.str("user_agent")))
}

async fn post_image(input: BoundModel) -> Result<serde_json::Value, Rejection> {
    let image = input
        .file("image")
        .ok_or_else(|| DomainError::new(Status::BadRequest, "no image was uploaded"))?;
    Ok(image.metadata())
}
