use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::errors::RequestError;

// ----------------- User Request -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
}

// ----------------- Form Requests -----------------

/// Form body of `POST /photo_comments`. `photo_id` may also come from the query string.
#[derive(Deserialize, Debug, Default, Validate)]
#[serde(default)]
pub struct CreatePhotoCommentRequest {
    #[validate(custom = "required")]
    pub content: String,
    pub photo_id: Option<String>,
}

#[derive(Deserialize, Debug, Default, Validate)]
#[serde(default)]
pub struct CreateArticleRequest {
    #[validate(custom = "required")]
    pub title: String,
    #[validate(custom = "required")]
    pub content: String,
    pub title_image: Option<String>,
}

#[derive(Deserialize, Debug, Default, Validate)]
#[serde(default)]
pub struct CreatePhotoRequest {
    #[validate(custom = "required")]
    pub title: String,
    #[validate(custom = "required")]
    pub url: String,
}

fn required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("required");
        error.message = Some(Cow::Borrowed("Can not be empty"));
        return Err(error);
    }
    Ok(())
}

/// Runs the field rules and reports the first failure in declaration order
/// as `"<field> <message>"`.
pub trait RequiredFields: Validate {
    fn declared_fields() -> &'static [&'static str];

    fn check(&self) -> Result<(), RequestError> {
        let errors = match self.validate() {
            Ok(()) => return Ok(()),
            Err(errors) => errors,
        };
        let field_errors = errors.field_errors();
        for field in Self::declared_fields() {
            if let Some(error) = field_errors.get(field).and_then(|errs| errs.first()) {
                let message = error
                    .message
                    .clone()
                    .unwrap_or_else(|| error.code.clone());
                return Err(RequestError::Validation(format!("{} {}", field, message)));
            }
        }
        Err(RequestError::Validation(errors.to_string()))
    }
}

impl RequiredFields for CreatePhotoCommentRequest {
    fn declared_fields() -> &'static [&'static str] {
        &["content"]
    }
}

impl RequiredFields for CreateArticleRequest {
    fn declared_fields() -> &'static [&'static str] {
        &["title", "content"]
    }
}

impl RequiredFields for CreatePhotoRequest {
    fn declared_fields() -> &'static [&'static str] {
        &["title", "url"]
    }
}
