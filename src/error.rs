use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnnIndexError {
    /// A strict lookup was issued for a point that is not in the index.
    #[error("point not found in the index")]
    PointNotFound,
}

pub type Result<T> = std::result::Result<T, KnnIndexError>;
