use crate::{
    auth::{AuthError, LoginCredentials, TokenResponse},
    handlers::common::{success_response, validate_input},
    AppState,
};
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tracing::{info, warn};

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    summary = "Admin login",
    description = "Exchanges the configured admin credentials for a bearer token",
    request_body = LoginCredentials,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Username or password missing", body = crate::errors::ErrorResponse),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<LoginCredentials>,
) -> Response {
    if let Err(err) = validate_input(&credentials) {
        return err.into_response();
    }

    match state.auth.login(&credentials) {
        Ok(token) => {
            info!(username = %credentials.username, "admin logged in");
            success_response(token)
        }
        Err(AuthError::InvalidCredentials) => {
            warn!(username = %credentials.username, "rejected login");
            AuthError::InvalidCredentials.into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}
