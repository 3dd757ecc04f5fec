use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error(transparent)]
    Db(#[from] makershop_db::DbError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error("cannot scan media directory {path}: {source}")]
    Scan {
        path: String,
        source: std::io::Error,
    },
}
