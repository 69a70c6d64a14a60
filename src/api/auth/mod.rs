pub mod login;
pub mod register;

use crate::AppState;
use axum::routing::post;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/auth endpoints (mounted at /api/auth)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register::register))
        .route("/login", post(login::login))
}

#[derive(OpenApi)]
#[openapi(
    paths(register::register, login::login),
    components(schemas(
        register::RegisterRequest,
        register::RegisterResponse,
        login::LoginRequest,
        login::LoginResponse,
    ))
)]
pub struct ApiDoc;
