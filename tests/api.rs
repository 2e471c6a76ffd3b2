//! HTTP-level tests against a spawned `curio serve`.
//!
//! Every test gets its own data directory, signing secret and port.

mod common;

use common::test_server::{TestServer, image_part};
use reqwest::StatusCode;
use reqwest::multipart::Form;
use serde_json::{Value, json};

const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01];
const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

#[tokio::test]
async fn test_health() {
    let server = TestServer::start().await;
    let resp = server
        .client
        .get(server.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_signup_token_resolves_to_self() {
    let server = TestServer::start().await;
    let alice = server.sign_up("alice", "pw1", "Alice").await;

    let (status, body) = server.get_json(&alice, "/api/Users").await;
    assert_eq!(status, 200);
    assert_eq!(body["id"], alice.id);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["name"], "Alice");
    assert_eq!(body["categories"], json!([]));
    assert!(body.get("passwordHash").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_duplicate_signup_conflicts() {
    let server = TestServer::start().await;
    server.sign_up("alice", "pw1", "Alice").await;

    let resp = server
        .client
        .post(server.url("/api/Users/SignUp"))
        .json(&json!({"username": "alice", "password": "pw2", "name": "Alice2"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_signup_validation() {
    let server = TestServer::start().await;

    for body in [
        json!({"username": "", "password": "pw", "name": "A"}),
        json!({"username": "has space", "password": "pw", "name": "A"}),
        json!({"username": "bob", "password": "", "name": "A"}),
        json!({"username": "bob", "password": "pw", "name": ""}),
    ] {
        let resp = server
            .client
            .post(server.url("/api/Users/SignUp"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{body}");
    }

    let resp = server
        .client
        .post(server.url("/api/Users/SignUp"))
        .json(&json!({"username": "bob", "password": "pw"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Invalid request body");

    let resp = server
        .client
        .post(server.url("/api/Users/Login"))
        .header("content-type", "application/json")
        .body("{\"username\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Invalid request body");
}

#[tokio::test]
async fn test_login_succeeds_with_correct_password() {
    let server = TestServer::start().await;
    let alice = server.sign_up("alice", "pw1", "Alice").await;

    let resp = server
        .client
        .post(server.url("/api/Users/Login"))
        .json(&json!({"username": "alice", "password": "pw1"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["userId"], alice.id);
    assert_ne!(body["token"], alice.token.as_str());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let server = TestServer::start().await;
    server.sign_up("alice", "pw1", "Alice").await;

    let wrong_password = server
        .client
        .post(server.url("/api/Users/Login"))
        .json(&json!({"username": "alice", "password": "nope"}))
        .send()
        .await
        .unwrap();
    let unknown_user = server
        .client
        .post(server.url("/api/Users/Login"))
        .json(&json!({"username": "mallory", "password": "nope"}))
        .send()
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::NOT_FOUND);
    assert_eq!(unknown_user.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        wrong_password.text().await.unwrap(),
        unknown_user.text().await.unwrap()
    );
}

#[tokio::test]
async fn test_missing_or_bad_token_is_unauthorized() {
    let server = TestServer::start().await;

    let resp = server
        .client
        .get(server.url("/api/Users"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key("www-authenticate"));

    let resp = server
        .client
        .get(server.url("/api/Users/Categories"))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = server
        .client
        .get(server.url("/api/Users"))
        .header("Authorization", "Basic YWxpY2U6cHcx")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_category_for_another_user_is_forbidden() {
    let server = TestServer::start().await;
    let alice = server.sign_up("alice", "pw1", "Alice").await;
    let bob = server.sign_up("bob", "pw2", "Bob").await;

    let form = Form::new()
        .text("UserId", alice.id.clone())
        .text("Name", "Stolen");
    let resp = server
        .client
        .post(server.url("/api/Users/Categories"))
        .bearer_auth(&bob.token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let (_, categories) = server.get_json(&alice, "/api/Users/Categories").await;
    assert_eq!(categories, json!([]));
    let (_, categories) = server.get_json(&bob, "/api/Users/Categories").await;
    assert_eq!(categories, json!([]));
}

#[tokio::test]
async fn test_create_artefact_for_another_user_is_forbidden() {
    let server = TestServer::start().await;
    let alice = server.sign_up("alice", "pw1", "Alice").await;
    let bob = server.sign_up("bob", "pw2", "Bob").await;

    let form = Form::new()
        .text("UserId", alice.id.clone())
        .text("ArtefactIndex", "1")
        .part("Image", image_part(JPEG_BYTES, "photo.jpg"));
    let resp = server
        .client
        .post(server.url("/api/Users/Artefacts"))
        .bearer_auth(&bob.token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let (_, artefacts) = server.get_json(&alice, "/api/Users/Artefacts").await;
    assert_eq!(artefacts, json!([]));
}

#[tokio::test]
async fn test_artefact_requires_image() {
    let server = TestServer::start().await;
    let alice = server.sign_up("alice", "pw1", "Alice").await;

    let form = Form::new()
        .text("UserId", alice.id.clone())
        .text("ArtefactIndex", "1");
    let resp = server
        .client
        .post(server.url("/api/Users/Artefacts"))
        .bearer_auth(&alice.token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_artefact_in_someone_elses_category_is_forbidden() {
    let server = TestServer::start().await;
    let alice = server.sign_up("alice", "pw1", "Alice").await;
    let bob = server.sign_up("bob", "pw2", "Bob").await;
    let category = server.create_category(&alice, "Food", None).await;

    let form = Form::new()
        .text("UserId", bob.id.clone())
        .text("CategoryId", category["categoryId"].as_str().unwrap().to_string())
        .part("Image", image_part(JPEG_BYTES, "photo.jpg"));
    let resp = server
        .client
        .post(server.url("/api/Users/Artefacts"))
        .bearer_auth(&bob.token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let form = Form::new()
        .text("UserId", bob.id.clone())
        .text("CategoryId", "00000000-0000-0000-0000-000000000000")
        .part("Image", image_part(JPEG_BYTES, "photo.jpg"));
    let resp = server
        .client
        .post(server.url("/api/Users/Artefacts"))
        .bearer_auth(&bob.token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_artefact_image_round_trip() {
    let server = TestServer::start().await;
    let alice = server.sign_up("alice", "pw1", "Alice").await;

    let created = server.create_artefact(&alice, None, 4, JPEG_BYTES).await;
    let artefact_id = created["artefactId"].as_str().unwrap();
    assert_eq!(created["artefactIndex"], 4);
    assert_eq!(created["userId"], alice.id);

    let (status, artefact) = server
        .get_json(&alice, &format!("/api/Users/Artefacts/{artefact_id}"))
        .await;
    assert_eq!(status, 200);

    let image_url = artefact["imageUrl"].as_str().unwrap();
    assert_eq!(
        image_url,
        server.url(&format!("/api/Assets/Artefacts/{artefact_id}.jpg"))
    );

    let resp = server
        .client
        .get(image_url)
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "image/jpeg");
    assert_eq!(resp.headers()["x-content-type-options"], "nosniff");
    assert_eq!(resp.bytes().await.unwrap().as_ref(), JPEG_BYTES);

    let resp = server.client.get(image_url).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_asset_requests_are_validated() {
    let server = TestServer::start().await;
    let alice = server.sign_up("alice", "pw1", "Alice").await;

    let (status, _) = server
        .get_json(&alice, "/api/Assets/Secrets/whatever.jpg")
        .await;
    assert_eq!(status, 400);

    let (status, _) = server
        .get_json(&alice, "/api/Assets/Artefacts/missing.jpg")
        .await;
    assert_eq!(status, 404);

    let (status, _) = server
        .get_json(&alice, "/api/Assets/Artefacts/..secret")
        .await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_reads_are_scoped_to_owner() {
    let server = TestServer::start().await;
    let alice = server.sign_up("alice", "pw1", "Alice").await;
    let bob = server.sign_up("bob", "pw2", "Bob").await;

    let category = server.create_category(&alice, "Food", None).await;
    let category_id = category["categoryId"].as_str().unwrap();
    let artefact = server.create_artefact(&alice, Some(category_id), 0, JPEG_BYTES).await;
    let artefact_id = artefact["artefactId"].as_str().unwrap();

    let (status, _) = server
        .get_json(&bob, &format!("/api/Users/Categories/{category_id}"))
        .await;
    assert_eq!(status, 404);
    let (status, _) = server
        .get_json(&bob, &format!("/api/Users/Artefacts/{artefact_id}"))
        .await;
    assert_eq!(status, 404);

    let (status, body) = server
        .get_json(&alice, &format!("/api/Users/Categories/{category_id}"))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["artefacts"][0]["artefactId"], artefact_id);

    let (_, profile) = server.get_json(&alice, "/api/Users").await;
    assert_eq!(profile["categories"][0]["categoryId"], category_id);
    assert_eq!(
        profile["categories"][0]["artefacts"][0]["artefactId"],
        artefact_id
    );
}

#[tokio::test]
async fn test_delete_category_of_another_user_is_forbidden() {
    let server = TestServer::start().await;
    let alice = server.sign_up("alice", "pw1", "Alice").await;
    let bob = server.sign_up("bob", "pw2", "Bob").await;

    let category = server.create_category(&alice, "Food", None).await;
    let category_id = category["categoryId"].as_str().unwrap();
    let artefact = server.create_artefact(&alice, Some(category_id), 0, JPEG_BYTES).await;
    let artefact_id = artefact["artefactId"].as_str().unwrap();

    let resp = server
        .client
        .delete(server.url(&format!("/api/Users/Categories/{category_id}")))
        .bearer_auth(&bob.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let (status, _) = server
        .get_json(&alice, &format!("/api/Users/Categories/{category_id}"))
        .await;
    assert_eq!(status, 200);
    let (status, _) = server
        .get_json(&alice, &format!("/api/Users/Artefacts/{artefact_id}"))
        .await;
    assert_eq!(status, 200);
    assert_eq!(server.asset_files("Artefacts", artefact_id).len(), 1);
}

#[tokio::test]
async fn test_delete_category_removes_artefacts_and_images() {
    let server = TestServer::start().await;
    let alice = server.sign_up("alice", "pw1", "Alice").await;

    let category = server.create_category(&alice, "Food", Some(PNG_BYTES)).await;
    let category_id = category["categoryId"].as_str().unwrap();
    let artefact = server.create_artefact(&alice, Some(category_id), 0, JPEG_BYTES).await;
    let artefact_id = artefact["artefactId"].as_str().unwrap();
    assert_eq!(server.asset_files("Categories", category_id).len(), 1);

    let resp = server
        .client
        .delete(server.url(&format!("/api/Users/Categories/{category_id}")))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    assert!(server.asset_files("Categories", category_id).is_empty());
    assert!(server.asset_files("Artefacts", artefact_id).is_empty());
    let (status, _) = server
        .get_json(&alice, &format!("/api/Users/Artefacts/{artefact_id}"))
        .await;
    assert_eq!(status, 404);

    let resp = server
        .client
        .delete(server.url(&format!("/api/Users/Categories/{category_id}")))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_user_removes_everything() {
    let server = TestServer::start().await;
    let alice = server.sign_up("alice", "pw1", "Alice").await;
    let bob = server.sign_up("bob", "pw2", "Bob").await;

    let category = server.create_category(&alice, "Food", Some(PNG_BYTES)).await;
    let category_id = category["categoryId"].as_str().unwrap().to_string();
    let filed = server.create_artefact(&alice, Some(&category_id), 0, JPEG_BYTES).await;
    let loose = server.create_artefact(&alice, None, 1, JPEG_BYTES).await;
    let artefact_ids = [
        filed["artefactId"].as_str().unwrap().to_string(),
        loose["artefactId"].as_str().unwrap().to_string(),
    ];

    let resp = server
        .client
        .delete(server.url(&format!("/api/Users/{}", alice.id)))
        .bearer_auth(&bob.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = server
        .client
        .delete(server.url(&format!("/api/Users/{}", alice.id)))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    assert!(server.asset_files("Categories", &category_id).is_empty());
    for id in &artefact_ids {
        assert!(server.asset_files("Artefacts", id).is_empty());
    }

    // The token outlives the account but no longer resolves to a user.
    let (status, _) = server.get_json(&alice, "/api/Users").await;
    assert_eq!(status, 401);

    let resp = server
        .client
        .delete(server.url(&format!("/api/Users/{}", alice.id)))
        .bearer_auth(&bob.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let (status, _) = server
        .get_json(&bob, &format!("/api/Users/Categories/{category_id}"))
        .await;
    assert_eq!(status, 404);
    for id in &artefact_ids {
        let (status, _) = server
            .get_json(&bob, &format!("/api/Users/Artefacts/{id}"))
            .await;
        assert_eq!(status, 404);
    }
}

#[tokio::test]
async fn test_patch_category_is_partial_and_idempotent() {
    let server = TestServer::start().await;
    let alice = server.sign_up("alice", "pw1", "Alice").await;

    let form = Form::new()
        .text("UserId", alice.id.clone())
        .text("Name", "Food")
        .text("CategoryIndex", "2");
    let resp = server
        .client
        .post(server.url("/api/Users/Categories"))
        .bearer_auth(&alice.token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    let category: Value = resp.json().await.unwrap();
    let category_id = category["categoryId"].as_str().unwrap().to_string();

    for _ in 0..2 {
        let form = Form::new()
            .text("CategoryId", category_id.clone())
            .text("Name", "Drinks");
        let resp = server
            .client
            .patch(server.url("/api/Users/Categories"))
            .bearer_auth(&alice.token)
            .multipart(form)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let (_, body) = server
            .get_json(&alice, &format!("/api/Users/Categories/{category_id}"))
            .await;
        assert_eq!(body["name"], "Drinks");
        assert_eq!(body["categoryIndex"], 2);
        assert!(body["imageUrl"].is_null());
    }

    let form = Form::new()
        .text("CategoryId", category_id.clone())
        .text("CategoryIndex", "");
    let resp = server
        .client
        .patch(server.url("/api/Users/Categories"))
        .bearer_auth(&alice.token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let (_, body) = server
        .get_json(&alice, &format!("/api/Users/Categories/{category_id}"))
        .await;
    assert!(body["categoryIndex"].is_null());
    assert_eq!(body["name"], "Drinks");
}

#[tokio::test]
async fn test_patch_category_statuses() {
    let server = TestServer::start().await;
    let alice = server.sign_up("alice", "pw1", "Alice").await;
    let bob = server.sign_up("bob", "pw2", "Bob").await;
    let category = server.create_category(&alice, "Food", None).await;
    let category_id = category["categoryId"].as_str().unwrap().to_string();

    let cases = [
        (&bob, Form::new().text("CategoryId", category_id.clone()), 403),
        (
            &alice,
            Form::new().text("CategoryId", "00000000-0000-0000-0000-000000000000"),
            404,
        ),
        (&alice, Form::new().text("Name", "Drinks"), 400),
        (
            &alice,
            Form::new()
                .text("CategoryId", category_id.clone())
                .text("CategoryIndex", "300"),
            400,
        ),
    ];

    for (user, form, expected) in cases {
        let resp = server
            .client
            .patch(server.url("/api/Users/Categories"))
            .bearer_auth(&user.token)
            .multipart(form)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), expected);
    }
}

#[tokio::test]
async fn test_patch_artefact_replaces_image() {
    let server = TestServer::start().await;
    let alice = server.sign_up("alice", "pw1", "Alice").await;

    let created = server.create_artefact(&alice, None, 1, JPEG_BYTES).await;
    let artefact_id = created["artefactId"].as_str().unwrap().to_string();

    let form = Form::new()
        .text("ArtefactId", artefact_id.clone())
        .part("Image", image_part(PNG_BYTES, "new.png"));
    let resp = server
        .client
        .patch(server.url("/api/Users/Artefacts"))
        .bearer_auth(&alice.token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let files = server.asset_files("Artefacts", &artefact_id);
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].extension().unwrap(), "png");

    let (_, artefact) = server
        .get_json(&alice, &format!("/api/Users/Artefacts/{artefact_id}"))
        .await;
    assert_eq!(artefact["artefactIndex"], 1);
    let image_url = artefact["imageUrl"].as_str().unwrap();
    assert!(image_url.ends_with(".png"));

    let resp = server
        .client
        .get(image_url)
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["content-type"], "image/png");
    assert_eq!(resp.bytes().await.unwrap().as_ref(), PNG_BYTES);
}

#[tokio::test]
async fn test_patch_artefact_fields() {
    let server = TestServer::start().await;
    let alice = server.sign_up("alice", "pw1", "Alice").await;
    let category = server.create_category(&alice, "Food", None).await;
    let category_id = category["categoryId"].as_str().unwrap().to_string();

    let created = server.create_artefact(&alice, None, 1, JPEG_BYTES).await;
    let artefact_id = created["artefactId"].as_str().unwrap().to_string();

    let form = Form::new()
        .text("artefactId", artefact_id.clone())
        .text("categoryId", category_id.clone())
        .text("artefactIndex", "9");
    let resp = server
        .client
        .patch(server.url("/api/Users/Artefacts"))
        .bearer_auth(&alice.token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let (_, artefact) = server
        .get_json(&alice, &format!("/api/Users/Artefacts/{artefact_id}"))
        .await;
    assert_eq!(artefact["categoryId"], category_id.as_str());
    assert_eq!(artefact["artefactIndex"], 9);

    let form = Form::new()
        .text("ArtefactId", artefact_id.clone())
        .text("ArtefactIndex", "");
    let resp = server
        .client
        .patch(server.url("/api/Users/Artefacts"))
        .bearer_auth(&alice.token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let form = Form::new()
        .text("ArtefactId", artefact_id.clone())
        .text("CategoryId", "");
    let resp = server
        .client
        .patch(server.url("/api/Users/Artefacts"))
        .bearer_auth(&alice.token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let (_, artefact) = server
        .get_json(&alice, &format!("/api/Users/Artefacts/{artefact_id}"))
        .await;
    assert!(artefact["categoryId"].is_null());
    assert_eq!(artefact["artefactIndex"], 9);
}

#[tokio::test]
async fn test_delete_artefact() {
    let server = TestServer::start().await;
    let alice = server.sign_up("alice", "pw1", "Alice").await;
    let bob = server.sign_up("bob", "pw2", "Bob").await;

    let created = server.create_artefact(&alice, None, 0, JPEG_BYTES).await;
    let artefact_id = created["artefactId"].as_str().unwrap().to_string();
    let path = format!("/api/Users/Artefacts/{artefact_id}");

    let resp = server
        .client
        .delete(server.url(&path))
        .bearer_auth(&bob.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(server.asset_files("Artefacts", &artefact_id).len(), 1);

    let resp = server
        .client
        .delete(server.url(&path))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(server.asset_files("Artefacts", &artefact_id).is_empty());

    let (status, _) = server.get_json(&alice, &path).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_oversized_image_is_rejected() {
    let server = TestServer::start_with_config("max_upload_bytes = 16\n").await;
    let alice = server.sign_up("alice", "pw", "Alice").await;
    let image = vec![0u8; 2048];

    let form = Form::new()
        .text("UserId", alice.id.clone())
        .text("ArtefactIndex", "1")
        .part("Image", image_part(&image, "photo.jpg"));
    let resp = server
        .client
        .post(server.url("/api/Users/Artefacts"))
        .bearer_auth(&alice.token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());

    let form = Form::new()
        .text("UserId", alice.id.clone())
        .text("Name", "Big")
        .part("Image", image_part(&image, "cover.png"));
    let resp = server
        .client
        .post(server.url("/api/Users/Categories"))
        .bearer_auth(&alice.token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let (status, artefacts) = server.get_json(&alice, "/api/Users/Artefacts").await;
    assert_eq!(status, 200);
    assert_eq!(artefacts, json!([]));
    let (status, categories) = server.get_json(&alice, "/api/Users/Categories").await;
    assert_eq!(status, 200);
    assert_eq!(categories, json!([]));

    for kind in ["Artefacts", "Categories"] {
        let dir = server.data_dir().join("Assets").join(kind);
        let stored = std::fs::read_dir(dir)
            .map(|entries| entries.count())
            .unwrap_or(0);
        assert_eq!(stored, 0, "{kind}");
    }
}
