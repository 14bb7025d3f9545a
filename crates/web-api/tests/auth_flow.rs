mod support;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use support::spawn_app;

#[tokio::test]
async fn register_login_roundtrip() {
    let app = spawn_app().await;
    let client = Client::new();

    let created = client
        .post(app.http("/api/auth/register"))
        .json(&json!({
            "username": "alice",
            "password": "secret42",
            "displayName": "Alice K"
        }))
        .send()
        .await
        .expect("register");
    assert_eq!(created.status(), StatusCode::CREATED);

    let user = created.json::<Value>().await.expect("user json");
    assert_eq!(user["username"], "alice");
    assert_eq!(user["displayName"], "Alice K");
    assert!(user["id"].as_str().is_some());
    // 密码哈希绝不能出现在响应里
    assert!(user.get("password").is_none());
    assert!(user.get("passwordHash").is_none());

    let logged_in = client
        .post(app.http("/api/auth/login"))
        .json(&json!({ "username": "alice", "password": "secret42" }))
        .send()
        .await
        .expect("login");
    assert_eq!(logged_in.status(), StatusCode::OK);
    let logged_in = logged_in.json::<Value>().await.expect("login json");
    assert_eq!(logged_in["id"], user["id"]);
}

#[tokio::test]
async fn duplicate_username_is_a_conflict() {
    let app = spawn_app().await;
    let client = Client::new();
    let payload = json!({
        "username": "alice",
        "password": "secret42",
        "displayName": "Alice"
    });

    let first = client
        .post(app.http("/api/auth/register"))
        .json(&payload)
        .send()
        .await
        .expect("first register");
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = client
        .post(app.http("/api/auth/register"))
        .json(&payload)
        .send()
        .await
        .expect("second register");
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body = second.json::<Value>().await.expect("error body");
    assert_eq!(body["code"], "USER_EXISTS");
}

#[tokio::test]
async fn short_credentials_are_rejected_with_reason() {
    let app = spawn_app().await;
    let client = Client::new();

    let short_username = client
        .post(app.http("/api/auth/register"))
        .json(&json!({ "username": "a", "password": "secret42" }))
        .send()
        .await
        .expect("short username");
    assert_eq!(short_username.status(), StatusCode::BAD_REQUEST);
    let body = short_username.json::<Value>().await.expect("error body");
    assert_eq!(body["code"], "INVALID_ARGUMENT");
    assert!(body["message"].as_str().unwrap().contains("username"));

    let short_password = client
        .post(app.http("/api/auth/register"))
        .json(&json!({ "username": "alice", "password": "short" }))
        .send()
        .await
        .expect("short password");
    assert_eq!(short_password.status(), StatusCode::BAD_REQUEST);

    // 失败的注册没有副作用：同名注册仍然成功
    let retry = client
        .post(app.http("/api/auth/register"))
        .json(&json!({ "username": "alice", "password": "secret42" }))
        .send()
        .await
        .expect("retry");
    assert_eq!(retry.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn bad_credentials_are_rejected_uniformly() {
    let app = spawn_app().await;
    let client = Client::new();

    client
        .post(app.http("/api/auth/register"))
        .json(&json!({ "username": "alice", "password": "secret42" }))
        .send()
        .await
        .expect("register");

    let wrong_password = client
        .post(app.http("/api/auth/login"))
        .json(&json!({ "username": "alice", "password": "nope00" }))
        .send()
        .await
        .expect("wrong password");
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);

    let unknown_user = client
        .post(app.http("/api/auth/login"))
        .json(&json!({ "username": "bob", "password": "secret42" }))
        .send()
        .await
        .expect("unknown user");
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
}
