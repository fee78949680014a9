use thiserror::Error;

/// Unified error type for database operations that application code can handle
#[derive(Error, Debug)]
pub enum DbError {
    /// Entity not found by the given identifier
    #[error("Entity not found")]
    NotFound,

    /// Unique constraint violation
    #[error("Unique constraint violation")]
    UniqueViolation {
        table: Option<String>,
        /// Column(s) named by the constraint, e.g. `email` or `tweet_id, user_id`
        column: Option<String>,
        message: String,
    },

    /// Foreign key constraint violation
    #[error("Foreign key constraint violation")]
    ForeignKeyViolation { message: String },

    /// Check constraint violation
    #[error("Check constraint violation")]
    CheckViolation { message: String },

    /// Catch-all for non-recoverable errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DbError {
    /// Whether this is a unique violation on the given `table.column`.
    pub fn is_unique_violation_on(&self, table_name: &str, column_name: &str) -> bool {
        matches!(
            self,
            DbError::UniqueViolation { table: Some(t), column: Some(c), .. } if t == table_name && c == column_name
        )
    }
}

/// Convert from sqlx::Error using proper sqlx error categorization
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => DbError::NotFound,
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    let (table, column) = match parse_unique_violation(db_err.message()) {
                        Some((table, column)) => (Some(table), Some(column)),
                        None => (db_err.table().map(|s| s.to_string()), None),
                    };

                    DbError::UniqueViolation {
                        table,
                        column,
                        message: db_err.message().to_string(),
                    }
                } else if db_err.is_foreign_key_violation() {
                    DbError::ForeignKeyViolation {
                        message: db_err.message().to_string(),
                    }
                } else if db_err.is_check_violation() {
                    DbError::CheckViolation {
                        message: db_err.message().to_string(),
                    }
                } else {
                    // All other database errors are non-recoverable - convert to anyhow
                    DbError::Other(anyhow::Error::from(err))
                }
            }
            // All other sqlx errors are non-recoverable - convert to anyhow with context
            _ => DbError::Other(anyhow::Error::from(err)),
        }
    }
}

/// Extract the table and column(s) from a SQLite unique violation message.
///
/// SQLite does not report constraint names, only the offending columns:
/// `"UNIQUE constraint failed: users.email"` or
/// `"UNIQUE constraint failed: likes.tweet_id, likes.user_id"`.
fn parse_unique_violation(message: &str) -> Option<(String, String)> {
    let columns = message.strip_prefix("UNIQUE constraint failed: ")?;

    let mut table = None;
    let mut names = Vec::new();
    for qualified in columns.split(',') {
        let (t, c) = qualified.trim().split_once('.')?;
        table.get_or_insert_with(|| t.to_string());
        names.push(c);
    }

    Some((table?, names.join(", ")))
}

/// Type alias for database operation results
pub type Result<T> = std::result::Result<T, DbError>;
