use thiserror::Error;

pub type Result<T> = std::result::Result<T, TreeError>;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("Invalid standard folder catalog: {0}")]
    InvalidCatalog(String),
}
