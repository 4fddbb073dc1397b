use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    authentication::Caller,
    data_formats::{NoContent, Page},
};

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Not Found")]
    NotFound,
    #[error("You need to login first")]
    LoginRequired,
    #[error("Forbidden")]
    Forbidden,
    #[error("{0} is already taken")]
    Duplicate(&'static str),
    #[error("{0}")]
    RunTimeError(&'static str),
    #[error("Internal Server Error")]
    ServerError,
    #[error(transparent)]
    DatabaseError(#[from] sqlx::Error),
}

/// Failures of the register and login flows. The messages are shown to the
/// visitor as flashes on the re-rendered form.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("That email is already registered, log in instead")]
    DuplicateEmail,
    #[error("Email Not found please register")]
    EmailNotFound,
    #[error("Please Check your Password")]
    InvalidPassword,
    #[error(transparent)]
    Request(#[from] RequestError),
}

impl IntoResponse for RequestError {
    /// Used where no caller has been resolved yet, e.g. when resolving the
    /// caller itself fails.
    fn into_response(self) -> Response {
        self.into_page(&Caller::Anonymous)
    }
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::NotFound => StatusCode::NOT_FOUND,
            RequestError::LoginRequired => StatusCode::SEE_OTHER,
            RequestError::Forbidden => StatusCode::FORBIDDEN,
            RequestError::Duplicate(_) | RequestError::RunTimeError(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            RequestError::ServerError | RequestError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Renders the error as a page for `caller`. Missing things use the 404
    /// template, every other failure the generic error template.
    pub fn into_page(self, caller: &Caller) -> Response {
        let (template, message) = match self {
            RequestError::LoginRequired => return Redirect::to("/login").into_response(),
            RequestError::NotFound => ("404.html", self.to_string()),
            RequestError::DatabaseError(ref e) => {
                tracing::error!(error = %e, "database error");
                ("error.html", RequestError::ServerError.to_string())
            }
            _ => ("error.html", self.to_string()),
        };
        Page::new(template, caller, NoContent::default())
            .with_flash(message)
            .render(self.status_code())
    }

    /// Turns a sqlite unique-constraint failure into `Duplicate(field)`,
    /// passing every other error through.
    pub fn unique_violation(error: sqlx::Error, field: &'static str) -> RequestError {
        if let sqlx::Error::Database(e) = &error {
            if e.message().contains("UNIQUE constraint failed") {
                return RequestError::Duplicate(field);
            }
        }
        RequestError::DatabaseError(error)
    }
}

