use std::sync::Arc;

use axum::{extract::Path, Extension, Form, Json};
use chrono::Utc;

use crate::{
    authentication::MaybeUser,
    data_formats::{parse_id, CreatePhotoRequest, Envelope, Reply, RequiredFields},
    db_helpers::{add_photo_in_db, get_photo_by_id_in_db},
    errors::RequestError,
    models::Photo,
    store::Store,
};

// ----------------- Photo Handlers -----------------

/// POST /photos
pub async fn create_photo(
    Extension(store): Extension<Arc<Store>>,
    maybe_user: MaybeUser,
    Form(request): Form<CreatePhotoRequest>,
) -> Json<Envelope<Photo>> {
    Json(insert_photo(&store, maybe_user, request).await.into())
}

async fn insert_photo(
    store: &Store,
    maybe_user: MaybeUser,
    request: CreatePhotoRequest,
) -> Result<Photo, RequestError> {
    request.check()?;
    let user = maybe_user.require()?;
    let now = Utc::now();
    let mut photo = Photo {
        id: 0,
        title: Some(request.title),
        url: Some(request.url),
        user_id: Some(user.id),
        created_at: Some(now),
        updated_at: Some(now),
    };
    photo.id = add_photo_in_db(store, &photo).await?;
    Ok(photo)
}

/// GET /photos/:id
pub async fn get_photo(
    Extension(store): Extension<Arc<Store>>,
    Path(id): Path<String>,
) -> Json<Reply<Photo>> {
    Json(get_photo_by_id_in_db(&store, parse_id(&id)).await.into())
}
