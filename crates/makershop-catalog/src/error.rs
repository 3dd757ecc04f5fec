use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Db(#[from] makershop_db::DbError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error("invalid price {raw:?}: {reason}")]
    InvalidPrice { raw: String, reason: String },

    #[error("cannot derive a SKU from source URL {0}")]
    NoSku(String),

    #[error("cannot write error report: {0}")]
    Report(#[from] std::io::Error),

    #[error("media queue is closed")]
    QueueClosed,
}
