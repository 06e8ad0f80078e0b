// tests/api_tests.rs

mod common;

use common::spawn_app;

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app.get("/random_path_that_does_not_exist").await;

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn register_works() {
    // Arrange
    let app = spawn_app().await;
    let unique_name = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);

    // Act
    let response = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&serde_json::json!({
            "username": unique_name,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["type"], "Bearer");
    assert_eq!(body["user"]["username"], unique_name.as_str());
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn register_fails_validation() {
    let app = spawn_app().await;

    // Username that is too short
    let response = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&serde_json::json!({
            "username": "yo",
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let app = spawn_app().await;
    let body = serde_json::json!({ "username": "duplicate", "password": "password123" });

    let first = app.client.post(app.url("/api/auth/register")).json(&body).send().await.unwrap();
    let second = app.client.post(app.url("/api/auth/register")).json(&body).send().await.unwrap();

    assert_eq!(first.status().as_u16(), 201);
    assert_eq!(second.status().as_u16(), 409);
}

#[tokio::test]
async fn login_and_me_flow() {
    let app = spawn_app().await;
    let credentials = serde_json::json!({ "username": "login_user", "password": "password123" });
    app.client
        .post(app.url("/api/auth/register"))
        .json(&credentials)
        .send()
        .await
        .unwrap();

    // Wrong password
    let bad = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&serde_json::json!({ "username": "login_user", "password": "nope-nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status().as_u16(), 401);

    // Right password
    let login: serde_json::Value = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&credentials)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let token = login["token"].as_str().expect("Token not found");

    let me: serde_json::Value = app
        .client
        .get(app.url("/api/auth/me"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["username"], "login_user");
}

#[tokio::test]
async fn protected_routes_require_token() {
    let app = spawn_app().await;

    let no_token = app
        .client
        .post(app.url("/api/exams"))
        .json(&serde_json::json!({ "name": "Anything" }))
        .send()
        .await
        .unwrap();
    assert_eq!(no_token.status().as_u16(), 401);

    let bad_token = app
        .post_json("/api/exams", "not.a.jwt", serde_json::json!({ "name": "Anything" }))
        .await;
    assert_eq!(bad_token.status().as_u16(), 401);
}

#[tokio::test]
async fn exam_crud_and_ownership() {
    let app = spawn_app().await;
    let (owner, _) = app.register().await;
    let (stranger, _) = app.register().await;

    let exam_id = app.create_exam(&owner, "Capitals").await;

    // Same owner, same name
    let dup = app
        .post_json("/api/exams", &owner, serde_json::json!({ "name": "Capitals" }))
        .await;
    assert_eq!(dup.status().as_u16(), 409);

    // Different owner may reuse the name
    app.create_exam(&stranger, "Capitals").await;

    let listed: Vec<serde_json::Value> = app.get("/api/exams").await.json().await.unwrap();
    assert_eq!(listed.len(), 2);

    // Stranger cannot rename or delete
    let rename = app
        .client
        .put(app.url(&format!("/api/exams/{}", exam_id)))
        .bearer_auth(&stranger)
        .json(&serde_json::json!({ "name": "Mine now" }))
        .send()
        .await
        .unwrap();
    assert_eq!(rename.status().as_u16(), 403);

    // Owner renames
    let renamed: serde_json::Value = app
        .client
        .put(app.url(&format!("/api/exams/{}", exam_id)))
        .bearer_auth(&owner)
        .json(&serde_json::json!({ "name": "World capitals" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(renamed["name"], "World capitals");

    // Owner deletes, then it is gone
    let deleted = app
        .client
        .delete(app.url(&format!("/api/exams/{}", exam_id)))
        .bearer_auth(&owner)
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 204);
    assert_eq!(app.get(&format!("/api/exams/{}", exam_id)).await.status().as_u16(), 404);
}

#[tokio::test]
async fn item_group_must_belong_to_the_exam() {
    let app = spawn_app().await;
    let (owner, _) = app.register().await;

    let birds = app.create_exam(&owner, "Birds").await;
    let trees = app.create_exam(&owner, "Trees").await;
    let conifers = app.create_group(&owner, trees, "Conifers").await;

    let resp = app
        .post_json(
            "/api/items",
            &owner,
            serde_json::json!({ "name": "Pine", "examId": birds, "groupId": conifers }),
        )
        .await;
    assert_eq!(resp.status().as_u16(), 400);

    // Duplicate group name inside one exam
    let dup = app
        .post_json(
            "/api/groups",
            &owner,
            serde_json::json!({ "name": "Conifers", "examId": trees }),
        )
        .await;
    assert_eq!(dup.status().as_u16(), 409);
}

#[tokio::test]
async fn deleting_group_removes_its_items() {
    let app = spawn_app().await;
    let (owner, _) = app.register().await;

    let exam = app.create_exam(&owner, "Fish").await;
    let group = app.create_group(&owner, exam, "Salmonids").await;
    let item = app.create_item(&owner, exam, group, "Trout").await;

    let deleted = app
        .client
        .delete(app.url(&format!("/api/groups/{}", group)))
        .bearer_auth(&owner)
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 204);

    assert_eq!(app.get(&format!("/api/items/{}", item)).await.status().as_u16(), 404);
    let items: Vec<serde_json::Value> = app
        .get(&format!("/api/exams/{}/items", exam))
        .await
        .json()
        .await
        .unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn item_update_moves_between_groups_of_same_exam() {
    let app = spawn_app().await;
    let (owner, _) = app.register().await;

    let exam = app.create_exam(&owner, "Shapes").await;
    let round = app.create_group(&owner, exam, "Round").await;
    let angular = app.create_group(&owner, exam, "Angular").await;
    let item = app.create_item(&owner, exam, round, "Square").await;

    let updated: serde_json::Value = app
        .client
        .put(app.url(&format!("/api/items/{}", item)))
        .bearer_auth(&owner)
        .json(&serde_json::json!({ "groupId": angular }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(updated["groupId"], angular);
    assert_eq!(updated["name"], "Square");
    assert_eq!(updated["image"], "Square.png");
}

#[tokio::test]
async fn item_cannot_move_to_group_of_another_exam() {
    let app = spawn_app().await;
    let (owner, _) = app.register().await;

    let shapes = app.create_exam(&owner, "Shapes").await;
    let colours = app.create_exam(&owner, "Colours").await;
    let round = app.create_group(&owner, shapes, "Round").await;
    let warm = app.create_group(&owner, colours, "Warm").await;
    let item = app.create_item(&owner, shapes, round, "Circle").await;

    let resp = app
        .client
        .put(app.url(&format!("/api/items/{}", item)))
        .bearer_auth(&owner)
        .json(&serde_json::json!({ "groupId": warm }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "bad_request");

    // Still where it was
    let unchanged: serde_json::Value = app
        .get(&format!("/api/items/{}", item))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(unchanged["groupId"], round);
    assert_eq!(unchanged["examId"], shapes);
}

#[tokio::test]
async fn upload_then_download_file() {
    let app = spawn_app().await;
    let (token, _) = app.register().await;

    let part = reqwest::multipart::Part::bytes(b"fake-png-bytes".to_vec()).file_name("cat.png");
    let form = reqwest::multipart::Form::new().part("file", part);

    let resp = app
        .client
        .post(app.url("/api/files"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);

    let body: serde_json::Value = resp.json().await.unwrap();
    let key = body["url"].as_str().unwrap();
    assert!(key.ends_with(".png"));

    let downloaded = app.get(&format!("/files/{}", key)).await;
    assert_eq!(downloaded.status().as_u16(), 200);
    assert_eq!(downloaded.bytes().await.unwrap().as_ref(), b"fake-png-bytes");
}
