use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("invalid seed data: {0}")]
    Fixture(#[from] serde_json::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub(crate) fn appointment_not_found(id: i64) -> Self {
        StoreError::NotFound { entity: "Appointment", id }
    }

    pub(crate) fn project_not_found(id: i64) -> Self {
        StoreError::NotFound { entity: "Project", id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
