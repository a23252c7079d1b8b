use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(thiserror::Error, Debug)]
pub enum DBError {
    #[error("Not Found")]
    NotFound,

    #[error("Invalid pk \"{0}\" - object does not exist.")]
    InvalidReference(i32),

    #[error("{0}")]
    Duplicate(&'static str),

    #[error("{0}")]
    NotRelated(&'static str),
}

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    DBError(#[from] DBError),

    #[error("Forbidden request")]
    Forbidden(&'static str),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(&'static str),

    #[error("SQL failed: {0:?}")]
    Sqlx(#[from] sqlx::Error),

    #[error("JWT error: {0:?}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid request: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid request body: {0}")]
    Body(#[from] serde_json::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::JwtError(_) | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Sqlx(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) | AppError::Validation(_) | AppError::Body(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::DBError(DBError::NotFound) => StatusCode::NOT_FOUND,
            AppError::DBError(_) => StatusCode::BAD_REQUEST,
        }
    }
}

// Tell axum how to convert `AppError` into a response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let error_message = match self {
            AppError::Sqlx(_) => {
                tracing::error!("request failed: {:?}", self);
                None
            }
            AppError::Forbidden(reason) => {
                tracing::debug!("forbidden: {reason}");
                None
            }
            AppError::JwtError(ref err) => {
                tracing::debug!("rejected token: {err}");
                None
            }
            _ => Some(self.to_string()),
        };

        let body = Json(json!({
            "error": error_message.unwrap_or_else(|| {
                status.canonical_reason().unwrap_or("Error").to_string()
            }),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_taxonomy_to_status_codes() {
        assert_eq!(
            AppError::from(DBError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(DBError::InvalidReference(3)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(DBError::Duplicate("already there")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::Forbidden("not the author").status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::from(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn malformed_body_is_a_bad_request() {
        let err = serde_json::from_str::<serde_json::Value>("{\"name\": ").unwrap_err();
        assert_eq!(AppError::from(err).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn invalid_reference_names_the_pk() {
        let err = AppError::from(DBError::InvalidReference(42));
        assert_eq!(err.to_string(), "Invalid pk \"42\" - object does not exist.");
    }

    #[test]
    fn internal_errors_hide_details() {
        let response = AppError::from(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
