mod common;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use marketplace_api::{
    dto::auth::{LoginRequest, RegisterRequest},
    error::AppError,
    routes::app,
    services::auth_service::{login_user, register_user},
};
use tower::ServiceExt;

#[tokio::test]
async fn admin_role_comes_from_the_allow_list() -> anyhow::Result<()> {
    let state = common::setup_state().await?;

    let seller = register_user(
        &state,
        RegisterRequest {
            email: "Seller@Shop.test".into(),
            password: "correct horse".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(seller.email, common::ADMIN_EMAIL);
    assert_eq!(seller.role, "admin");

    let buyer = register_user(
        &state,
        RegisterRequest {
            email: "buyer@shop.test".into(),
            password: "correct horse".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(buyer.role, "user");
    Ok(())
}

#[tokio::test]
async fn duplicate_email_and_bad_password_are_rejected() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    register_user(
        &state,
        RegisterRequest {
            email: "buyer@shop.test".into(),
            password: "correct horse".into(),
        },
    )
    .await?;

    let dup = register_user(
        &state,
        RegisterRequest {
            email: "buyer@shop.test".into(),
            password: "another one".into(),
        },
    )
    .await;
    assert!(matches!(dup, Err(AppError::BadRequest(_))));

    let wrong = login_user(
        &state,
        LoginRequest {
            email: "buyer@shop.test".into(),
            password: "wrong password".into(),
        },
    )
    .await;
    assert!(matches!(wrong, Err(AppError::BadRequest(_))));
    Ok(())
}

#[tokio::test]
async fn login_token_opens_the_session_endpoint() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    register_user(
        &state,
        RegisterRequest {
            email: "buyer@shop.test".into(),
            password: "correct horse".into(),
        },
    )
    .await?;
    let login = login_user(
        &state,
        LoginRequest {
            email: "buyer@shop.test".into(),
            password: "correct horse".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert!(login.token.starts_with("Bearer "));

    let response = app(state)
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header(header::AUTHORIZATION, login.token)
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await?;
    let json: serde_json::Value = serde_json::from_slice(&body)?;
    assert_eq!(json["data"]["email"], "buyer@shop.test");
    assert_eq!(json["data"]["role"], "user");
    Ok(())
}

#[tokio::test]
async fn buyer_token_cannot_reach_admin_routes() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    register_user(
        &state,
        RegisterRequest {
            email: "buyer@shop.test".into(),
            password: "correct horse".into(),
        },
    )
    .await?;
    let token = login_user(
        &state,
        LoginRequest {
            email: "buyer@shop.test".into(),
            password: "correct horse".into(),
        },
    )
    .await?
    .data
    .unwrap()
    .token;

    let response = app(state)
        .oneshot(
            Request::builder()
                .uri("/api/admin/discount-codes")
                .header(header::AUTHORIZATION, token)
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    Ok(())
}
