use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::{
    accounts::{
        dto::{
            CheckRequest, LoginRequest, ProfileQuery, ProfileResponse, SignupRequest,
            UpdateImageRequest,
        },
        password, repo,
    },
    error::AppError,
    state::AppState,
    validate::require,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/check", post(check))
        .route("/profile", get(profile))
        .route("/img", post(update_profile_image))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let username = require(&payload.username, "username")?;
    let password = require(&payload.password, "password")?;
    let first_name = require(&payload.first_name, "firstName")?;
    let last_name = require(&payload.last_name, "lastName")?;
    let email = require(&payload.email, "email")?;

    let hash = password::hash_password(password)?;
    let inserted =
        repo::insert_user(&state.db, username, &hash, first_name, last_name, email).await?;

    let Some(user_id) = inserted else {
        warn!(username = %username, "signup username taken");
        return Err(AppError::Conflict("Username already exists".into()));
    };

    info!(user_id = %user_id, username = %username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let username = require(&payload.username, "username")?;
    let password = require(&payload.password, "password")?;

    let user = repo::find_by_username(&state.db, username)
        .await?
        .ok_or_else(|| {
            warn!(username = %username, "login unknown username");
            AppError::NotFound("User not found. Please sign up.".into())
        })?;

    let ok = password::verify_password(password, &user.password_hash)?;
    if !ok {
        warn!(username = %username, user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized(
            "Incorrect username or password.".into(),
        ));
    }

    info!(user_id = %user.id, username = %username, "user logged in");
    Ok(Json(json!({ "message": "Login successful" })))
}

#[instrument(skip(state, payload))]
pub async fn check(
    State(state): State<AppState>,
    Json(payload): Json<CheckRequest>,
) -> Result<Json<Value>, AppError> {
    let username = require(&payload.username, "username")?;
    let email = require(&payload.email, "email")?;

    if let Some((taken_username, taken_email)) =
        repo::find_username_or_email(&state.db, username, email).await?
    {
        // Username takes priority when both collide.
        if taken_username == username {
            return Err(AppError::Conflict("Username already exists".into()));
        }
        if taken_email == email {
            return Err(AppError::Conflict("Email already exists".into()));
        }
    }

    Ok(Json(json!({ "message": "Available" })))
}

#[instrument(skip(state))]
pub async fn profile(
    State(state): State<AppState>,
    Query(query): Query<ProfileQuery>,
) -> Result<Json<ProfileResponse>, AppError> {
    let username = require(&query.username, "username")?;

    let row = repo::profile_by_username(&state.db, username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(Json(ProfileResponse {
        username: row.username,
        email: row.email,
        img: row.img,
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_profile_image(
    State(state): State<AppState>,
    Json(payload): Json<UpdateImageRequest>,
) -> Result<Json<Value>, AppError> {
    let img = require(&payload.img, "img")?;
    let username = require(&payload.username, "username")?;

    let affected = repo::set_profile_image(&state.db, username, img).await?;
    if affected == 0 {
        warn!(username = %username, "image update matched no user");
        return Err(AppError::NotFound("User not found".into()));
    }

    info!(username = %username, "profile image updated");
    Ok(Json(json!({ "message": "Image updated successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Validation failures must surface before any database access; the fake
    // state's pool is lazy and never connects.

    #[tokio::test]
    async fn signup_rejects_missing_fields() {
        let state = AppState::fake();
        let payload = SignupRequest {
            username: Some("alice".into()),
            password: Some("pw".into()),
            first_name: None,
            last_name: Some("Smith".into()),
            email: Some("a@example.com".into()),
        };
        let err = signup(State(state), Json(payload)).await.unwrap_err();
        assert!(err.to_string().contains("firstName is required"));
    }

    #[tokio::test]
    async fn login_rejects_blank_password() {
        let state = AppState::fake();
        let payload = LoginRequest {
            username: Some("alice".into()),
            password: Some("   ".into()),
        };
        let err = login(State(state), Json(payload)).await.unwrap_err();
        assert!(err.to_string().contains("password is required"));
    }

    #[tokio::test]
    async fn check_rejects_missing_email() {
        let state = AppState::fake();
        let payload = CheckRequest {
            username: Some("alice".into()),
            email: None,
        };
        let err = check(State(state), Json(payload)).await.unwrap_err();
        assert!(err.to_string().contains("email is required"));
    }

    #[tokio::test]
    async fn profile_rejects_missing_query_param() {
        let state = AppState::fake();
        let err = profile(State(state), Query(ProfileQuery { username: None }))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("username is required"));
    }

    #[tokio::test]
    async fn update_image_rejects_missing_img() {
        let state = AppState::fake();
        let payload = UpdateImageRequest {
            img: None,
            username: Some("alice".into()),
        };
        let err = update_profile_image(State(state), Json(payload))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("img is required"));
    }
}
