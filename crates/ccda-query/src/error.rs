use thiserror::Error;

/// Errors raised while evaluating a query against a record.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The record is a bare scalar, so it has no members to walk.
    #[error("cannot query a record whose root is {found}, expected an object or array")]
    ScalarRoot { found: &'static str },
}

pub type Result<T> = std::result::Result<T, QueryError>;
