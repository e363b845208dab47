pub mod config;
pub mod error;
pub mod filter;
pub mod model;
pub mod query;
pub mod time;

pub use error::{ReqlogError, Result};
