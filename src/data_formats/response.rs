use serde::{Deserialize, Serialize};

use crate::{
    errors::RequestError,
    models::{Article, Photo, PhotoComment, User},
};

pub const CREATED_MESSAGE: &str = "created successfully";

/// Display size attached to every article projection.
pub const ARTICLE_IMAGE_WIDTH: i32 = 800;
pub const ARTICLE_IMAGE_HEIGHT: i32 = 800;

/// `{code, data, message}` wrapper returned by create endpoints.
#[derive(Serialize, Debug)]
pub struct Envelope<T> {
    pub code: u8,
    pub data: Option<T>,
    pub message: String,
}

impl<T> Envelope<T> {
    pub fn created(data: T) -> Self {
        Envelope {
            code: 0,
            data: Some(data),
            message: CREATED_MESSAGE.to_string(),
        }
    }

    pub fn failed(error: RequestError) -> Self {
        if let RequestError::DatabaseError(e) = &error {
            tracing::error!("Database error: {}", e);
        }
        Envelope {
            code: 1,
            data: None,
            message: error.to_string(),
        }
    }
}

impl<T> From<Result<T, RequestError>> for Envelope<T> {
    fn from(result: Result<T, RequestError>) -> Self {
        match result {
            Ok(data) => Envelope::created(data),
            Err(error) => Envelope::failed(error),
        }
    }
}

/// Either the payload itself or a bare error string.
#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum Reply<T> {
    Payload(T),
    Error(String),
}

impl<T> From<Result<T, RequestError>> for Reply<T> {
    fn from(result: Result<T, RequestError>) -> Self {
        match result {
            Ok(payload) => Reply::Payload(payload),
            Err(error) => {
                if let RequestError::DatabaseError(e) = &error {
                    tracing::error!("Database error: {}", e);
                }
                Reply::Error(error.to_string())
            }
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct UserResponse {
    pub email: String,
    pub token: String,
    pub username: String,
}

impl UserResponse {
    pub fn new(User { username, email, .. }: User, token: String) -> Self {
        UserResponse {
            email,
            token,
            username,
        }
    }
}

/// A freshly created comment together with the photo it was resolved against.
#[derive(Serialize, Debug)]
pub struct PhotoCommentResponse {
    #[serde(flatten)]
    pub comment: PhotoComment,
    pub photo: Photo,
}

/// Public projection of an article: epoch timestamp and fixed image size.
#[derive(Deserialize, Serialize, Debug, PartialEq)]
pub struct ArticleApiResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: i64,
    pub title_image: String,
    pub image_width: i32,
    pub image_height: i32,
}

impl From<Article> for ArticleApiResponse {
    fn from(
        Article {
            id,
            title,
            content,
            created_at,
            title_image,
            ..
        }: Article,
    ) -> Self {
        ArticleApiResponse {
            id,
            title: title.unwrap_or_default(),
            content: content.unwrap_or_default(),
            created_at: created_at.map(|at| at.timestamp()).unwrap_or_default(),
            title_image: title_image.unwrap_or_default(),
            image_width: ARTICLE_IMAGE_WIDTH,
            image_height: ARTICLE_IMAGE_HEIGHT,
        }
    }
}
