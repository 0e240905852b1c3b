use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database query failed: {0}")]
    DatabaseQuery(String),

    #[error("database mutation failed: {0}")]
    DatabaseMutation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Classifies a driver error raised by a write statement.
    pub fn mutation(err: rusqlite::Error) -> Self {
        if is_unique_violation(&err) {
            return Error::Conflict(constraint_message(&err));
        }
        Error::DatabaseMutation(err.to_string())
    }
}

/// Read paths use `?` directly; anything not a uniqueness violation is a query failure.
impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        if is_unique_violation(&err) {
            return Error::Conflict(constraint_message(&err));
        }
        Error::DatabaseQuery(err.to_string())
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        }
        _ => false,
    }
}

fn constraint_message(err: &rusqlite::Error) -> String {
    match err {
        rusqlite::Error::SqliteFailure(_, Some(msg)) => msg.clone(),
        other => other.to_string(),
    }
}

/// Maps driver errors from write statements, see [`Error::mutation`].
pub trait MutationResultExt<T> {
    fn mutation(self) -> Result<T>;
}

impl<T> MutationResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn mutation(self) -> Result<T> {
        self.map_err(Error::mutation)
    }
}
