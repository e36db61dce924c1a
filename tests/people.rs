#[path = "../demos/people_app.rs"]
mod people_app;

use std::sync::Arc;

use bindery::{KnownIds, Response, Router};
use bytes::Bytes;
use serde_json::{Value, json};

fn app() -> Router {
    people_app::app(Arc::new(KnownIds::new(1..=5))).unwrap()
}

fn get(uri: &str) -> http::Request<Bytes> {
    http::Request::builder().uri(uri).body(Bytes::new()).unwrap()
}

fn send_json(method: &str, uri: &str, body: Value) -> http::Request<Bytes> {
    http::Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Bytes::from(body.to_string()))
        .unwrap()
}

fn post_form(uri: &str) -> http::request::Builder {
    http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
}

fn person() -> Value {
    json!({
        "first_name": "Cristian",
        "last_name": "Rojas",
        "age": 28,
        "hair_color": "brown",
        "is_married": false,
        "password": "estoesunaprueba",
    })
}

fn with(field: &str, value: Value) -> Value {
    let mut p = person();
    p[field] = value;
    p
}

/// `(location, kind)` of every reported violation, in order.
fn violations(res: &Response) -> Vec<(String, String)> {
    assert_eq!(res.status_code(), 422, "expected a validation failure");
    res.json_body()
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|v| {
            let location: Vec<&str> = v["location"].as_array().unwrap().iter().map(|s| s.as_str().unwrap()).collect();
            (location.join("."), v["kind"].as_str().unwrap().to_owned())
        })
        .collect()
}

fn one(location: &str, kind: &str) -> Vec<(String, String)> {
    vec![(location.to_owned(), kind.to_owned())]
}

#[tokio::test]
async fn home_says_hello() {
    let res = app().call(get("/")).await;
    assert_eq!(res.status_code(), 200);
    assert_eq!(res.json_body().unwrap(), json!({ "Hello": "World" }));
}

#[tokio::test]
async fn creating_a_person_never_echoes_the_password() {
    let res = app().call(send_json("POST", "/person/new", person())).await;
    assert_eq!(res.status_code(), 201);
    let body = res.json_body().unwrap();
    assert_eq!(body, json!({
        "first_name": "Cristian",
        "last_name": "Rojas",
        "age": 28,
        "hair_color": "brown",
        "is_married": false,
    }));
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn optional_fields_default_to_null() {
    let mut p = person();
    p.as_object_mut().unwrap().retain(|k, _| k != "hair_color" && k != "is_married");
    let res = app().call(send_json("POST", "/person/new", p)).await;
    assert_eq!(res.status_code(), 201);
    let body = res.json_body().unwrap();
    assert_eq!(body["hair_color"], Value::Null);
    assert_eq!(body["is_married"], Value::Null);
}

#[tokio::test]
async fn age_zero_is_the_only_violation() {
    let res = app().call(send_json("POST", "/person/new", with("age", json!(0)))).await;
    assert_eq!(violations(&res), one("body.age", "below-min"));
}

#[tokio::test]
async fn every_broken_field_is_reported_at_once() {
    let res = app().call(send_json("POST", "/person/new", json!({}))).await;
    assert_eq!(violations(&res), [
        ("body.first_name".to_owned(), "missing-required".to_owned()),
        ("body.last_name".to_owned(), "missing-required".to_owned()),
        ("body.age".to_owned(), "missing-required".to_owned()),
        ("body.password".to_owned(), "missing-required".to_owned()),
    ]);

    let broken = json!({
        "first_name": "",
        "last_name": "Rojas",
        "age": "old",
        "hair_color": "purple",
        "password": "short",
    });
    let res = app().call(send_json("POST", "/person/new", broken)).await;
    assert_eq!(violations(&res), [
        ("body.first_name".to_owned(), "below-min".to_owned()),
        ("body.age".to_owned(), "type-mismatch".to_owned()),
        ("body.hair_color".to_owned(), "type-mismatch".to_owned()),
        ("body.password".to_owned(), "below-min".to_owned()),
    ]);
}

#[tokio::test]
async fn length_and_range_boundaries() {
    let app = app();
    for (field, value, expected) in [
        ("first_name", json!(""), Some("below-min")),
        ("first_name", json!("a"), None),
        ("first_name", json!("a".repeat(50)), None),
        ("first_name", json!("a".repeat(51)), Some("above-max")),
        ("age", json!(0), Some("below-min")),
        ("age", json!(1), None),
        ("age", json!(115), None),
        ("age", json!(116), Some("above-max")),
        ("password", json!("1234567"), Some("below-min")),
        ("password", json!("12345678"), None),
    ] {
        let res = app.call(send_json("POST", "/person/new", with(field, value.clone()))).await;
        match expected {
            Some(kind) => assert_eq!(violations(&res), one(&format!("body.{field}"), kind), "{field} = {value}"),
            None => assert_eq!(res.status_code(), 201, "{field} = {value}"),
        }
    }
}

#[tokio::test]
async fn enum_tags_are_case_sensitive() {
    let app = app();
    let res = app.call(send_json("POST", "/person/new", with("hair_color", json!("Brown")))).await;
    assert_eq!(violations(&res), one("body.hair_color", "type-mismatch"));

    let res = app.call(send_json("POST", "/person/new", with("hair_color", json!("blonde")))).await;
    assert_eq!(res.status_code(), 201);
}

#[tokio::test]
async fn malformed_json_is_one_body_violation() {
    let req = http::Request::builder()
        .method("POST")
        .uri("/person/new")
        .header("content-type", "application/json")
        .body(Bytes::from_static(b"{\"first_name\": "))
        .unwrap();
    let res = app().call(req).await;
    assert_eq!(violations(&res), one("body", "type-mismatch"));
}

#[tokio::test]
async fn query_parameters_bind_with_defaults() {
    let app = app();
    let res = app.call(get("/person/details?name=Laura&age=28")).await;
    assert_eq!(res.json_body().unwrap(), json!({ "Laura": "28" }));

    let res = app.call(get("/person/details?age=28")).await;
    assert_eq!(res.json_body().unwrap(), json!({ "null": "28" }));

    let res = app.call(get("/person/details?name=")).await;
    assert_eq!(violations(&res), [
        ("query.name".to_owned(), "below-min".to_owned()),
        ("query.age".to_owned(), "missing-required".to_owned()),
    ]);
}

#[tokio::test]
async fn unknown_people_are_domain_errors() {
    let app = app();
    let res = app.call(get("/person/details/99")).await;
    assert_eq!(res.status_code(), 404);
    assert_eq!(res.json_body().unwrap(), json!({ "detail": "¡This person doesn't exist!" }));

    let res = app.call(get("/person/details/3")).await;
    assert_eq!(res.status_code(), 200);
    assert_eq!(res.json_body().unwrap(), json!({ "3": "It exists!" }));

    let res = app.call(get("/person/details/%33")).await;
    assert_eq!(res.json_body().unwrap(), json!({ "3": "It exists!" }));
}

#[tokio::test]
async fn path_parameters_are_validated_before_lookup() {
    let app = app();
    let res = app.call(get("/person/details/0")).await;
    assert_eq!(violations(&res), one("path.person_id", "below-min"));

    let res = app.call(get("/person/details/three")).await;
    assert_eq!(violations(&res), one("path.person_id", "type-mismatch"));
}

#[tokio::test]
async fn updates_bind_path_and_body_together() {
    let app = app();
    let res = app.call(send_json("PUT", "/person/3", with("age", json!(29)))).await;
    assert_eq!(res.status_code(), 200);
    let body = res.json_body().unwrap();
    assert_eq!(body["age"], 29);
    assert!(body.get("password").is_none());

    let res = app.call(send_json("PUT", "/person/0", with("age", json!(0)))).await;
    assert_eq!(violations(&res), [
        ("path.person_id".to_owned(), "below-min".to_owned()),
        ("body.age".to_owned(), "below-min".to_owned()),
    ]);
}

#[tokio::test]
async fn login_replies_through_its_projection() {
    let app = app();
    let req = post_form("/login")
        .body(Bytes::from_static(b"username=cristian2021&password=supersecret"))
        .unwrap();
    let res = app.call(req).await;
    assert_eq!(res.status_code(), 200);
    assert_eq!(res.json_body().unwrap(), json!({
        "username": "cristian2021",
        "message": "Login Successfully!",
    }));

    let req = post_form("/login")
        .body(Bytes::from_static(b"username=cristian2021&password=short"))
        .unwrap();
    assert_eq!(violations(&app.call(req).await), one("form.password", "below-min"));
}

#[tokio::test]
async fn contact_reads_form_header_and_cookie() {
    let app = app();
    let req = post_form("/contact")
        .header("user-agent", "curl/8.4")
        .header("cookie", "ads=no")
        .body(Bytes::from_static(
            b"first_name=Ana&last_name=Gil&email=ana%40example.com&message=Hello+there%2C+this+is+long+enough",
        ))
        .unwrap();
    let res = app.call(req).await;
    assert_eq!(res.status_code(), 200);
    assert_eq!(res.json_body().unwrap(), json!("curl/8.4"));

    let req = post_form("/contact")
        .body(Bytes::from_static(b"first_name=Ana&last_name=Gil&email=not-an-email&message=too+short"))
        .unwrap();
    assert_eq!(violations(&app.call(req).await), [
        ("form.email".to_owned(), "format-invalid".to_owned()),
        ("form.message".to_owned(), "below-min".to_owned()),
    ]);
}

#[tokio::test]
async fn uploads_report_their_size_in_kilobytes() {
    let mut body = Vec::new();
    body.extend_from_slice(
        b"--XyZ\r\n\
Content-Disposition: form-data; name=\"image\"; filename=\"photo.png\"\r\n\
Content-Type: image/png\r\n\r\n",
    );
    body.extend(std::iter::repeat_n(b'x', 2048));
    body.extend_from_slice(b"\r\n--XyZ--\r\n");

    let req = http::Request::builder()
        .method("POST")
        .uri("/post-image")
        .header("content-type", "multipart/form-data; boundary=XyZ")
        .body(Bytes::from(body))
        .unwrap();
    let res = app().call(req).await;
    assert_eq!(res.status_code(), 200);
    assert_eq!(res.json_body().unwrap(), json!({
        "filename": "photo.png",
        "content_type": "image/png",
        "size_kb": 2.0,
    }));
}

#[tokio::test]
async fn broken_multipart_is_one_body_violation() {
    let app = app();
    let truncated = http::Request::builder()
        .method("POST")
        .uri("/post-image")
        .header("content-type", "multipart/form-data; boundary=XyZ")
        .body(Bytes::from_static(
            b"--XyZ\r\nContent-Disposition: form-data; name=\"image\"; filename=\"photo.png\"\r\n\r\nPNGDATA",
        ))
        .unwrap();
    assert_eq!(violations(&app.call(truncated).await), one("body", "type-mismatch"));

    let no_boundary = http::Request::builder()
        .method("POST")
        .uri("/post-image")
        .header("content-type", "multipart/form-data")
        .body(Bytes::from_static(b"--XyZ--\r\n"))
        .unwrap();
    assert_eq!(violations(&app.call(no_boundary).await), one("body", "type-mismatch"));
}

#[tokio::test]
async fn missing_uploads_are_reported() {
    let req = http::Request::builder()
        .method("POST")
        .uri("/post-image")
        .body(Bytes::new())
        .unwrap();
    assert_eq!(violations(&app().call(req).await), one("multipart.image", "missing-required"));
}

#[tokio::test]
async fn unrouted_requests() {
    let app = app();
    let res = app.call(get("/nobody")).await;
    assert_eq!(res.status_code(), 404);
    assert_eq!(res.json_body().unwrap(), json!({ "detail": "Not Found" }));

    let res = app.call(get("/person/new")).await;
    assert_eq!(res.status_code(), 405);
}

#[tokio::test]
async fn responses_parse_back_through_the_output_schema() {
    let models = people_app::models().unwrap();
    let res = app().call(send_json("POST", "/person/new", person())).await;
    let reply = res.json_body().unwrap();

    let parsed = models.person_out.validate_json(&reply).unwrap();
    assert_eq!(parsed.str("first_name"), Some("Cristian"));
    assert_eq!(parsed.int("age"), Some(28));
    assert!(parsed.get("password").is_none());
    assert_eq!(models.person_out.render(&parsed), reply);

    // the full model would reject a reply that has no password
    let err = models.person.validate_json(&reply).unwrap_err();
    assert_eq!(err.for_field("password").count(), 1);
}
