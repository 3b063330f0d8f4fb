use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{field} count {value} does not fit in a report column")]
    CountOverflow { field: &'static str, value: usize },
}

pub type Result<T> = std::result::Result<T, ModelError>;
