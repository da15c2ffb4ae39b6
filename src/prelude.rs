use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("improperly configured: {0}")]
    Config(#[from] config::ConfigError),
}

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::Db(_) => "ERR-DB-000",
            Error::Migrate(_) => "ERR-DB-001",
            Error::Io(_) => "ERR-IO-000",
            Error::Config(_) => "ERR-CONF-000",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::error!(code = self.code(), "request failed: {}", &self);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error",
                "code": self.code(),
            })),
        )
            .into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
