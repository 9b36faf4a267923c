use thiserror::Error as ThisError;

pub type Result<T, E = LauvitError> = std::result::Result<T, E>;

#[derive(Debug, ThisError)]
#[non_exhaustive]
pub enum LauvitError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("migration failed: {0}")]
    Migration(String),
}

impl LauvitError {
    pub fn validation(msg: impl Into<String>) -> Self {
        LauvitError::Validation(msg.into())
    }

    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        LauvitError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LauvitError::NotFound { .. } | LauvitError::Database(diesel::result::Error::NotFound)
        )
    }
}
