// Rentalgen Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Schema drift: {0} (re-run bootstrap)")]
    SchemaDrift(String),

    #[error("No candidates: {0}")]
    NoCandidates(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Cancellation requested")]
    Cancelled,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for SimError {
    fn from(err: anyhow::Error) -> Self {
        SimError::Other(err.to_string())
    }
}

impl SimError {
    /// True when the underlying driver error is a foreign-key or uniqueness
    /// violation, the one row-level failure worth a single retry.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            SimError::Database(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }

    /// Process exit code for fatal errors.
    /// 1 config, 2 connection, 3 schema drift, 4 user cancellation.
    pub fn exit_code(&self) -> i32 {
        match self {
            SimError::InvalidConfig(_) | SimError::Json(_) => 1,
            SimError::Connection(_) => 2,
            SimError::SchemaDrift(_) => 3,
            SimError::Cancelled => 4,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
