use std::sync::Arc;

use axum::{http::StatusCode, Extension, Json};

use crate::{
    authentication::{get_jwt_token, hash_password_argon2, verify_password_argon2},
    config::Config,
    data_formats::{LoginRequest, RegisterRequest, UserResponse, UserWrapper},
    db_helpers::{get_user_by_email, insert_user},
    errors::RequestError,
    store::Store,
};

type UserJson = UserWrapper<UserResponse>;

type JsonResult<T> = Result<Json<T>, (StatusCode, Json<String>)>;

// ----------------- User Handlers -----------------

/// POST /users/login
pub async fn login_user(
    Extension(store): Extension<Arc<Store>>,
    Extension(config): Extension<Arc<Config>>,
    Json(UserWrapper { user: request }): Json<UserWrapper<LoginRequest>>,
) -> JsonResult<UserJson> {
    let user = get_user_by_email(&store, &request.email)
        .await
        .map_err(|_| {
            RequestError::RunTimeError("Could not login user\nPlease Try again").to_json_response()
        })?;
    let user = match user {
        Some(user) => user,
        None => {
            return Err(RequestError::RunTimeError("Email not found").to_json_response());
        }
    };
    let is_password_correct = verify_password_argon2(request.password, user.password.clone())
        .await
        .map_err(|_| {
            RequestError::RunTimeError("Could not login user\nPlease Try again").to_json_response()
        })?;

    if !is_password_correct {
        return Err(RequestError::RunTimeError("Incorrect password").to_json_response());
    }
    let token = get_jwt_token(user.id, &config.jwt_secret)
        .map_err(|_| RequestError::ServerError.to_json_response())?;
    Ok(Json(UserWrapper::wrap_with_user_data(UserResponse::new(
        user, token,
    ))))
}

/// POST /users
pub async fn register_user(
    Extension(store): Extension<Arc<Store>>,
    Extension(config): Extension<Arc<Config>>,
    Json(UserWrapper { mut user }): Json<UserWrapper<RegisterRequest>>,
) -> JsonResult<UserJson> {
    user.password = hash_password_argon2(user.password).await.map_err(|_| {
        RequestError::RunTimeError("Could not register user\nPlease Try again").to_json_response()
    })?;

    let user = insert_user(&store, &user).await.map_err(|e| {
        if e.is_unique_violation() {
            return RequestError::RunTimeError("Email or username already exists")
                .to_json_response();
        }
        tracing::error!("Could not register user: {}", e);
        RequestError::RunTimeError("Could not register user").to_json_response()
    })?;
    tracing::info!(id = user.id, "user registered");

    let token = get_jwt_token(user.id, &config.jwt_secret).map_err(|_| {
        RequestError::RunTimeError("Could not generate JWT successfully\nTry again later")
            .to_json_response()
    })?;
    Ok(Json(UserWrapper::wrap_with_user_data(UserResponse::new(
        user, token,
    ))))
}
