use axum::http::{StatusCode, Uri};

mod articles;
mod photo_comments;
mod photos;
mod users;

pub use articles::*;
pub use photo_comments::*;
pub use photos::*;
pub use users::*;

// ----------------- Helper Handlers -----------------
pub async fn alive() -> &'static str {
    "alive"
}

pub async fn not_found(uri: Uri) -> Result<(), (StatusCode, String)> {
    Err((
        StatusCode::NOT_FOUND,
        format!("URL {} provided was not found", uri),
    ))
}
