use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, Query},
    Extension, Form, Json,
};
use chrono::Utc;

use crate::{
    authentication::MaybeUser,
    data_formats::{
        parse_id, CreatePhotoCommentRequest, Envelope, ListQueryParams, PhotoCommentResponse,
        Reply, RequiredFields,
    },
    db_helpers::{
        add_photo_comment_in_db, delete_photo_comment_in_db, get_photo_by_id_in_db,
        get_photo_comment_by_id_in_db, get_user_by_id, list_photo_comments_in_db,
        update_photo_comment_by_id_in_db,
    },
    errors::RequestError,
    models::{PhotoComment, Row},
    store::Store,
};

// ----------------- Photo Comment Handlers -----------------

/// POST /photo_comments
pub async fn create_photo_comment(
    Extension(store): Extension<Arc<Store>>,
    maybe_user: MaybeUser,
    Query(query): Query<HashMap<String, String>>,
    Form(request): Form<CreatePhotoCommentRequest>,
) -> Json<Envelope<PhotoCommentResponse>> {
    let photo_id = request
        .photo_id
        .as_deref()
        .or(query.get("photo_id").map(String::as_str))
        .map(parse_id)
        .unwrap_or(0);
    Json(insert_photo_comment(&store, maybe_user, photo_id, request).await.into())
}

async fn insert_photo_comment(
    store: &Store,
    maybe_user: MaybeUser,
    photo_id: i64,
    request: CreatePhotoCommentRequest,
) -> Result<PhotoCommentResponse, RequestError> {
    request.check()?;
    let photo = get_photo_by_id_in_db(store, photo_id).await?;
    let user = maybe_user.require()?;
    let user = get_user_by_id(store, user.id)
        .await?
        .ok_or(RequestError::NotFound("User not found"))?;

    let now = Utc::now();
    let mut comment = PhotoComment {
        id: 0,
        content: Some(request.content),
        created_at: Some(now),
        updated_at: Some(now),
        photo_id: Some(photo.id),
        user_id: Some(user.id),
    };
    comment.id = add_photo_comment_in_db(store, &comment).await?;
    tracing::info!(id = comment.id, photo_id = photo.id, "photo comment created");
    Ok(PhotoCommentResponse { comment, photo })
}

/// GET /photo_comments/:id
pub async fn get_photo_comment(
    Extension(store): Extension<Arc<Store>>,
    Path(id): Path<String>,
) -> Json<Reply<PhotoComment>> {
    Json(get_photo_comment_by_id_in_db(&store, parse_id(&id)).await.into())
}

/// GET /photo_comments?query=k:v&fields=a,b&sortby=a&order=desc&limit=10&offset=0
pub async fn list_photo_comments(
    Extension(store): Extension<Arc<Store>>,
    Query(params): Query<ListQueryParams>,
) -> Json<Reply<Vec<Row>>> {
    let result = match params.into_list_params() {
        Ok(params) => list_photo_comments_in_db(&store, &params).await,
        Err(e) => Err(e),
    };
    Json(result.into())
}

/// PUT /photo_comments/:id
pub async fn update_photo_comment(
    Extension(store): Extension<Arc<Store>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Json<Reply<&'static str>> {
    Json(replace_photo_comment(&store, parse_id(&id), &body).await.into())
}

async fn replace_photo_comment(
    store: &Store,
    id: i64,
    body: &[u8],
) -> Result<&'static str, RequestError> {
    let mut comment: PhotoComment = serde_json::from_slice(body)
        .map_err(|e| RequestError::Validation(format!("invalid JSON body: {}", e)))?;
    comment.id = id;
    update_photo_comment_by_id_in_db(store, &comment).await?;
    Ok("OK")
}

/// DELETE /photo_comments/:id
pub async fn delete_photo_comment(
    Extension(store): Extension<Arc<Store>>,
    Path(id): Path<String>,
) -> Json<Reply<&'static str>> {
    let result = delete_photo_comment_in_db(&store, parse_id(&id))
        .await
        .map(|_| "OK");
    Json(result.into())
}
