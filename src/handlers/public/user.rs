// handlers/public/user.rs - POST /api/user/register and POST /api/user/login

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};

use crate::database::models::{LoginUser, RegisterUser, User};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Valid, TOKEN_COOKIE};
use crate::services::UserService;

/**
 * POST /api/user/register - Create a new account with role `user`
 *
 * Expected Input:
 * ```json
 * { "username": "alice", "email": "alice@example.com", "password": "at least 8 chars" }
 * ```
 */
pub async fn register(
    State(users): State<UserService>,
    Valid(input): Valid<RegisterUser>,
) -> ApiResult<User> {
    let user = users.register(input).await?;
    Ok(ApiResponse::success(user))
}

/**
 * POST /api/user/login - Exchange credentials for a JWT
 *
 * The token is returned in the body and also set as an HttpOnly `token`
 * cookie for browser clients.
 *
 * Expected Output (Success):
 * ```json
 * {
 *   "success": true,
 *   "data": { "token": "eyJhbGciOiJIUzI1NiI...", "expiresIn": 86400, "user": { ... } }
 * }
 * ```
 */
pub async fn login(
    State(users): State<UserService>,
    Valid(input): Valid<LoginUser>,
) -> Result<impl IntoResponse, ApiError> {
    let session = users.login(input).await?;
    let cookie = format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        TOKEN_COOKIE, session.token, session.expires_in
    );

    Ok(([(header::SET_COOKIE, cookie)], ApiResponse::success(session)))
}
