pub mod api;
pub mod core;
pub mod error;
pub mod games;

pub use error::{Error, Result};
