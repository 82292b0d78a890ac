//! Database query implementations.

pub mod photos;
pub mod records;
