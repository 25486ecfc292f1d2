//! Authentication endpoints (staff and reader sessions)

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        staff::{ChangePassword, Staff, UpdateProfile},
        user::CreateUser,
    },
    AppState,
};

use super::AuthenticatedUser;

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response (the token also travels in an HTTP-only cookie)
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub user: SessionUser,
    pub privileges: Vec<String>,
}

/// Authenticated identity as returned to the frontend
#[derive(Serialize, ToSchema)]
pub struct SessionUser {
    pub id: i32,
    pub name: Option<String>,
    pub email: String,
}

fn access_cookie(name: &str, token: String) -> Cookie<'static> {
    Cookie::build((name.to_string(), token))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .path("/")
        .build()
}

fn clear_cookie(name: &str) -> Cookie<'static> {
    let mut cookie = access_cookie(name, String::new());
    cookie.make_removal();
    cookie
}

/// Staff login: verifies credentials and sets the access cookie
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> AppResult<Response> {
    let (staff, claims, token) = state
        .services
        .auth
        .login_staff(&request.email, &request.password)
        .await?;

    let jar = jar.add(access_cookie(&state.config.auth.cookie_name, token));
    let body = Json(LoginResponse {
        success: true,
        user: SessionUser {
            id: staff.id,
            name: staff.name,
            email: staff.email,
        },
        privileges: claims.privileges,
    });

    Ok((jar, body).into_response())
}

/// Reader login: verifies credentials and sets the access cookie
#[utoipa::path(
    post,
    path = "/reader-auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login_reader(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> AppResult<Response> {
    let (user, token) = state
        .services
        .auth
        .login_reader(&request.email, &request.password)
        .await?;

    let jar = jar.add(access_cookie(&state.config.auth.cookie_name, token));
    let body = Json(LoginResponse {
        success: true,
        user: SessionUser {
            id: user.id,
            name: user.name,
            email: user.email,
        },
        privileges: Vec::new(),
    });

    Ok((jar, body).into_response())
}

/// Reader self-signup (account starts pending until staff verify it)
#[utoipa::path(
    post,
    path = "/reader-auth/signup",
    tag = "auth",
    request_body = CreateUser,
    responses(
        (status = 201, description = "Account created"),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn signup_reader(
    State(state): State<AppState>,
    Json(request): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<SessionUser>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = state.services.auth.signup_reader(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(SessionUser {
            id: user.id,
            name: user.name,
            email: user.email,
        }),
    ))
}

/// Clear the access cookie
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    responses((status = 200, description = "Logged out"))
)]
pub async fn logout(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    jar: CookieJar,
) -> AppResult<Response> {
    if claims.is_staff() {
        state
            .services
            .repository
            .audit
            .add(&claims.sub, "logged out")
            .await?;
    }

    let jar = jar.add(clear_cookie(&state.config.auth.cookie_name));
    Ok((jar, Json(serde_json::json!({ "message": "Logged out successfully" }))).into_response())
}

/// Current session's profile
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user profile", body = Staff),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Response> {
    if claims.is_staff() {
        let staff = state
            .services
            .repository
            .staff
            .get_by_email(&claims.sub)
            .await?
            .ok_or_else(|| AppError::UserNotFound("User not found".to_string()))?;
        Ok(Json(staff).into_response())
    } else {
        let user = state
            .services
            .repository
            .users
            .get_by_email(&claims.sub)
            .await?
            .ok_or_else(|| AppError::UserNotFound("User not found".to_string()))?;
        Ok(Json(user).into_response())
    }
}

/// Update the current session's profile
#[utoipa::path(
    put,
    path = "/auth/profile",
    tag = "auth",
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<UpdateProfile>,
) -> AppResult<Response> {
    if claims.is_staff() {
        let staff = state
            .services
            .repository
            .staff
            .update_profile_by_email(
                &claims.sub,
                request.name.as_deref(),
                request.birthdate.as_deref(),
                request.address.as_deref(),
                request.phone.as_deref(),
            )
            .await?;
        Ok(Json(staff).into_response())
    } else {
        let user = state
            .services
            .repository
            .users
            .update_profile_by_email(
                &claims.sub,
                request.name.as_deref(),
                request.birthdate.as_deref(),
                request.address.as_deref(),
                request.phone.as_deref(),
            )
            .await?;
        Ok(Json(user).into_response())
    }
}

/// Change the current session's password
#[utoipa::path(
    put,
    path = "/auth/password",
    tag = "auth",
    request_body = ChangePassword,
    responses(
        (status = 200, description = "Password updated"),
        (status = 400, description = "Old password incorrect")
    )
)]
pub async fn change_password(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<ChangePassword>,
) -> AppResult<Json<serde_json::Value>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    if claims.is_staff() {
        state
            .services
            .auth
            .change_staff_password(&claims.sub, &request.old_password, &request.new_password)
            .await?;
    } else {
        state
            .services
            .auth
            .change_reader_password(&claims.sub, &request.old_password, &request.new_password)
            .await?;
    }

    Ok(Json(
        serde_json::json!({ "success": "Password updated successfully." }),
    ))
}
