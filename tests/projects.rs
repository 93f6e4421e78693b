mod common;

use actix_web::cookie::Cookie;
use actix_web::http::{header, StatusCode};
use actix_web::test;
use common::{context, init_app, sign_in};
use odot::models::ProjectResponse;
use pretty_assertions::assert_eq;
use serde_json::json;

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

#[actix_rt::test]
async fn test_current_user() {
    let ctx = context();
    let app = init_app(&ctx).await;
    let session = sign_in(&app, "code-ada").await;

    let req = test::TestRequest::get()
        .uri("/api/users/me")
        .insert_header(bearer(&session.access_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(
        body["profile_picture_url"],
        "https://pics.example.com/google-ada.png"
    );

    // The access cookie works as well as the header.
    let req = test::TestRequest::get()
        .uri("/api/users/me")
        .cookie(Cookie::new("auth_token", session.access_token.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/api/users/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Authorization token required");
}

#[actix_rt::test]
async fn test_create_and_list_projects() {
    let ctx = context();
    let app = init_app(&ctx).await;
    let ada = sign_in(&app, "code-ada").await;
    let grace = sign_in(&app, "code-grace").await;

    let req = test::TestRequest::post()
        .uri("/api/projects")
        .insert_header(bearer(&ada.access_token))
        .set_json(json!({
            "name": "Home",
            "description": "Chores and errands",
            "color": "#3b82f6"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let home: ProjectResponse = test::read_body_json(resp).await;
    assert_eq!(home.name, "Home");
    assert_eq!(home.parent_project_id, None);

    let req = test::TestRequest::post()
        .uri("/api/projects")
        .insert_header(bearer(&ada.access_token))
        .set_json(json!({
            "name": "Garden",
            "description": "",
            "color": "#22c55e",
            "parent_project_id": home.id
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let garden: ProjectResponse = test::read_body_json(resp).await;
    assert_eq!(garden.parent_project_id, Some(home.id));
    assert_eq!(garden.description, None);

    let req = test::TestRequest::get()
        .uri("/api/projects")
        .insert_header(bearer(&ada.access_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let listed: Vec<ProjectResponse> = test::read_body_json(resp).await;
    assert_eq!(listed, vec![home, garden]);

    let req = test::TestRequest::get()
        .uri("/api/projects")
        .insert_header(bearer(&grace.access_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let listed: Vec<ProjectResponse> = test::read_body_json(resp).await;
    assert!(listed.is_empty());
}

#[actix_rt::test]
async fn test_parent_project_must_belong_to_caller() {
    let ctx = context();
    let app = init_app(&ctx).await;
    let ada = sign_in(&app, "code-ada").await;
    let grace = sign_in(&app, "code-grace").await;

    let req = test::TestRequest::post()
        .uri("/api/projects")
        .insert_header(bearer(&ada.access_token))
        .set_json(json!({ "name": "Private", "color": "#000000" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let private: ProjectResponse = test::read_body_json(resp).await;

    let test_cases = vec![
        (private.id, StatusCode::FORBIDDEN, "someone else's parent"),
        (9999, StatusCode::NOT_FOUND, "missing parent"),
    ];

    for (parent_id, expected_status, description) in test_cases {
        let req = test::TestRequest::post()
            .uri("/api/projects")
            .insert_header(bearer(&grace.access_token))
            .set_json(json!({
                "name": "Nested",
                "color": "#ffffff",
                "parent_project_id": parent_id
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected_status, "{}", description);
    }
}

#[actix_rt::test]
async fn test_project_validation_errors() {
    let ctx = context();
    let app = init_app(&ctx).await;
    let ada = sign_in(&app, "code-ada").await;

    let test_cases = vec![
        (
            json!({ "color": "#ffffff" }),
            StatusCode::BAD_REQUEST,
            "missing name",
        ),
        (
            json!({ "name": "", "color": "#ffffff" }),
            StatusCode::UNPROCESSABLE_ENTITY,
            "empty name",
        ),
        (
            json!({ "name": "Work", "color": "red" }),
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid color",
        ),
    ];

    for (payload, expected_status, description) in test_cases {
        let req = test::TestRequest::post()
            .uri("/api/projects")
            .insert_header(bearer(&ada.access_token))
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected_status, "{}", description);
    }
}

#[actix_rt::test]
async fn test_refresh_token_is_not_an_access_token() {
    let ctx = context();
    let app = init_app(&ctx).await;
    let ada = sign_in(&app, "code-ada").await;

    let req = test::TestRequest::get()
        .uri("/api/projects")
        .insert_header(bearer(&ada.refresh_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
