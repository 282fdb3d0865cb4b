mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{setup, Script};
use parley_types::{CharacterStore, NewPersona};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_check_returns_ok() {
    let app = setup(Script::default());

    let response = app.router.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn add_get_and_list_characters() {
    let app = setup(Script::default());

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/v1/characters",
            json!({
                "name": "Ada Lovelace",
                "prompt": "A mathematician who speaks in precise, enthusiastic sentences.",
                "profile_image_url": "https://example.com/ada.png"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let id = json_body(response).await["id"].as_i64().unwrap();

    // profile_image_url is optional.
    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/v1/characters",
            json!({ "name": "Grace Hopper", "prompt": "A rear admiral and compiler pioneer." }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let second = json_body(response).await["id"].as_i64().unwrap();
    assert!(second > id);

    let response = app
        .router
        .clone()
        .oneshot(get(&format!("/v1/characters/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let persona = json_body(response).await;
    assert_eq!(persona["id"], id);
    assert_eq!(persona["name"], "Ada Lovelace");
    assert_eq!(
        persona["prompt"],
        "A mathematician who speaks in precise, enthusiastic sentences."
    );
    assert_eq!(persona["profile_image_url"], "https://example.com/ada.png");

    let response = app.router.oneshot(get("/v1/characters")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let list = json_body(response).await;
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Ada Lovelace", "Grace Hopper"]);
    assert_eq!(list[1]["profile_image_url"], "");
}

#[tokio::test]
async fn unknown_character_is_404() {
    let app = setup(Script::default());

    let response = app.router.oneshot(get("/v1/characters/99")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = json_body(response).await;
    assert!(json["error"].as_str().unwrap().contains("99"));
}

#[tokio::test]
async fn blank_name_is_rejected() {
    let app = setup(Script::default());

    let response = app
        .router
        .oneshot(post_json(
            "/v1/characters",
            json!({ "name": "   ", "prompt": "nobody" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.characters.get_all().unwrap().is_empty());
}

#[tokio::test]
async fn characters_added_through_the_store_are_visible() {
    let app = setup(Script::default());
    let id = app
        .characters
        .add(&NewPersona {
            name: "Nikola Tesla".to_string(),
            prompt_description: "An inventor fascinated by alternating current.".to_string(),
            profile_image_url: String::new(),
        })
        .unwrap();

    let response = app
        .router
        .oneshot(get(&format!("/v1/characters/{}", id)))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["name"], "Nikola Tesla");
}

#[tokio::test]
async fn json_routes_reject_oversized_bodies() {
    let app = setup(Script::default());
    let huge = "x".repeat(parley_server::MAX_REQUEST_BODY_BYTES + 1);

    let response = app
        .router
        .oneshot(post_json(
            "/v1/characters",
            json!({ "name": "Big", "prompt": huge }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let app = setup(Script::default());

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/v1/characters")
                .header("origin", "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );
}
