// handlers/protected/user.rs - POST /api/user/logout and GET /api/user/me

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Extension,
};
use serde_json::{json, Value};

use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, TOKEN_COOKIE};
use crate::services::UserService;

/// POST /api/user/logout - Tokens are stateless; this only expires the cookie.
pub async fn logout(Extension(auth_user): Extension<AuthUser>) -> impl IntoResponse {
    tracing::info!("User {} logged out", auth_user.username);
    let cookie = format!("{}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0", TOKEN_COOKIE);

    (
        [(header::SET_COOKIE, cookie)],
        ApiResponse::<Value>::success(json!({ "message": "Logged out" })),
    )
}

/// GET /api/user/me - Profile of the authenticated caller
pub async fn me(
    State(users): State<UserService>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<User> {
    let user = users.me(auth_user.user_id).await?;
    Ok(ApiResponse::success(user))
}
