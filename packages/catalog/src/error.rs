// ABOUTME: Error types for catalog lookups
// ABOUTME: Not-found cases for symbols and materials plus query validation

use laundrylens_storage::StorageError;
use thiserror::Error;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Symbol not found")]
    SymbolNotFound,

    #[error("Material not found")]
    MaterialNotFound,

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<sqlx::Error> for CatalogError {
    fn from(e: sqlx::Error) -> Self {
        CatalogError::Storage(StorageError::Sqlx(e))
    }
}
