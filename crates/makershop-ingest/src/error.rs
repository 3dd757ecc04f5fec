use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("cannot open import source {path}: {source}")]
    SourceIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported import source extension: {path}")]
    UnsupportedSource { path: String },

    #[error("CSV read error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XLSX read error for {path}: {reason}")]
    Xlsx { path: String, reason: String },

    #[error("workbook {path} has no worksheets")]
    EmptyWorkbook { path: String },

    #[error(transparent)]
    Db(#[from] makershop_db::DbError),
}
