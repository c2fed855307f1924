use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    /// A problem with a definition supplied by the user: a malformed association chain,
    /// an invalid inheritance registration, a zero-sized pool, etc. Raised at definition
    /// time, never deferred to first use.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Validation(String),

    /// Corrupt or truncated compound-type text encountered while typecasting a value.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A failure captured on an async pool worker and re-surfaced on the consuming thread.
    #[error("Async execution error: {0}")]
    Async(String),

    #[error("{0} {1}")]
    WithContext(String, #[source] Box<DatabaseError>),

    #[error("{0}")]
    BoxedError(#[from] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl DatabaseError {
    pub fn with_context(self, context: String) -> DatabaseError {
        DatabaseError::WithContext(context, Box::new(self))
    }
}

pub trait WithContext {
    fn with_context(self, context: String) -> Self;
}

impl<T> WithContext for Result<T, DatabaseError> {
    fn with_context(self, context: String) -> Result<T, DatabaseError> {
        self.map_err(|e| e.with_context(context))
    }
}
