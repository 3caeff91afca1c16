use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Constraint violation: {message}")]
    ConstraintViolation {
        /// SQLSTATE reported by the server, when there is one.
        code: Option<String>,
        message: String,
    },

    #[error("Not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn validation(message: impl Into<String>) -> Self {
        StorageError::ValidationError(message.into())
    }

    pub fn constraint(message: impl Into<String>) -> Self {
        StorageError::ConstraintViolation {
            code: None,
            message: message.into(),
        }
    }

    /// Only connectivity failures are worth retrying; everything else will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StorageError::ConnectionFailed(_))
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::ConstraintViolation { code: Some(code), .. } if code == "23505"
        )
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StorageError::ConnectionFailed(error.to_string()),
            sqlx::Error::Database(db_error) => match db_error.code() {
                Some(code) if is_connection_sqlstate(&code) => StorageError::ConnectionFailed(
                    format!("{} (SQLSTATE {})", db_error.message(), code),
                ),
                code => StorageError::ConstraintViolation {
                    code: code.map(|code| code.into_owned()),
                    message: db_error.message().to_string(),
                },
            },
            sqlx::Error::RowNotFound => StorageError::NotFound,
            other => StorageError::Database(other),
        }
    }
}

/// SQLSTATEs the server sends before a statement runs: connection exceptions (08),
/// bad credentials (28), unknown database (3D), exhausted resources (53) and
/// shutdown or startup in progress (57P01..57P03).
fn is_connection_sqlstate(code: &str) -> bool {
    ["08", "28", "3D", "53"]
        .iter()
        .any(|class| code.starts_with(class))
        || matches!(code, "57P01" | "57P02" | "57P03")
}

impl From<ValidationErrors> for StorageError {
    fn from(errors: ValidationErrors) -> Self {
        let mut details: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    format!(
                        "{}: {}",
                        field,
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    )
                })
            })
            .collect();
        details.sort();

        StorageError::ValidationError(details.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_errors_are_connection_failures() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let error = StorageError::from(sqlx::Error::Io(io));

        assert!(matches!(error, StorageError::ConnectionFailed(_)));
        assert!(error.is_retryable());
    }

    #[test]
    fn test_pool_timeout_is_connection_failure() {
        let error = StorageError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(error, StorageError::ConnectionFailed(_)));
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let error = StorageError::from(sqlx::Error::RowNotFound);
        assert!(matches!(error, StorageError::NotFound));
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_unique_violation_detection() {
        let error = StorageError::ConstraintViolation {
            code: Some("23505".to_string()),
            message: "duplicate key value violates unique constraint".to_string(),
        };
        assert!(error.is_unique_violation());
        assert!(!StorageError::constraint("bad json").is_unique_violation());
    }

    #[test]
    fn test_connect_time_sqlstates_are_connection_failures() {
        for code in ["3D000", "28P01", "28000", "08006", "08001", "53300", "57P01", "57P03"] {
            assert!(is_connection_sqlstate(code), "{} should be a connection error", code);
        }
    }

    #[test]
    fn test_statement_sqlstates_stay_constraint_violations() {
        for code in ["23505", "23514", "22P02", "42P01", "57014"] {
            assert!(!is_connection_sqlstate(code), "{} should not be a connection error", code);
        }
    }

    #[test]
    fn test_validation_message_is_kept() {
        let error = StorageError::validation("duplicate candidate id 1");
        assert_eq!(
            error.to_string(),
            "Validation error: duplicate candidate id 1"
        );
    }
}
