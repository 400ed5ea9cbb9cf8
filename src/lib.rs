#![doc = include_str!("../README.md")]

pub mod classify;
mod error;
pub mod kdtree;
pub mod point;
pub mod queue;
mod r#type;

pub use error::KnnIndexError;
pub use point::Point;
pub use queue::BoundedPriorityQueue;
pub use r#type::Scalar;
