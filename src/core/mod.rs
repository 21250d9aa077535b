//! Crate-wide error handling

pub mod error;

pub use error::{Error, Result};
