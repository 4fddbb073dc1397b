use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::{authentication::Caller, validation::FieldError};

use super::response::UserResponse;

/// Everything a template needs: its name, who is asking, transient messages
/// and the page specific content flattened alongside.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub template: &'static str,
    pub logged_in: bool,
    pub is_admin: bool,
    pub user: Option<UserResponse>,
    pub flashes: Vec<String>,
    pub errors: Vec<FieldError>,
    #[serde(flatten)]
    pub content: T,
}

impl<T: Serialize> Page<T> {
    pub fn new(template: &'static str, caller: &Caller, content: T) -> Self {
        Page {
            template,
            logged_in: caller.is_authenticated(),
            is_admin: caller.is_admin(),
            user: caller.user().map(UserResponse::new),
            flashes: vec![],
            errors: vec![],
            content,
        }
    }

    pub fn with_errors(mut self, errors: Vec<FieldError>) -> Self {
        self.errors = errors;
        self
    }

    pub fn with_flash(mut self, message: impl Into<String>) -> Self {
        self.flashes.push(message.into());
        self
    }

    pub fn render(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

impl<T: Serialize> IntoResponse for Page<T> {
    fn into_response(self) -> Response {
        self.render(StatusCode::OK)
    }
}
