use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid table type: {0:?}")]
    InvalidTableType(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
