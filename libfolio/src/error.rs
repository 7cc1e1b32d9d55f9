//! Error types for Folio

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FolioError>;

#[derive(Error, Debug)]
pub enum FolioError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Page source error: {0}")]
    Source(#[from] SourceError),

    #[error("Page store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl FolioError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            FolioError::InvalidInput(_) => 3,
            FolioError::Store(err) if err.is_not_found() => 4,
            FolioError::Store(_) => 3,
            FolioError::Config(_) => 1,
            FolioError::Database(_) => 1,
            FolioError::Source(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database operation failed: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Corrupt page row {id}: {reason}")]
    CorruptRow { id: String, reason: String },
}

/// Failures of the backing store a page collection is loaded from.
///
/// Kept separate from an empty result so callers can tell "no pages yet"
/// apart from "the backend could not be reached".
#[derive(Error, Debug, Clone)]
pub enum SourceError {
    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Write failed: {0}")]
    Write(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Outcomes of in-memory store and editor operations that did not apply.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("No page is selected")]
    NoSelection,

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    #[error("Unknown component type: {0}")]
    UnknownComponentType(String),

    #[error("Index {index} is out of bounds for a page with {len} components")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Slug already in use: {0}")]
    DuplicateSlug(String),

    #[error("{0}")]
    InvalidInput(String),
}

impl StoreError {
    /// Whether the operation failed because its target does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::PageNotFound(_)
                | StoreError::ComponentNotFound(_)
                | StoreError::UnknownComponentType(_)
        )
    }
}
