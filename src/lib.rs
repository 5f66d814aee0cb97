pub mod aggregate;
pub mod args;
pub mod commands;
mod config;
mod db;
mod error;
pub mod format;
mod mcp;
pub mod model;
mod utils;

pub use config::Config;
pub use error::{Error, ErrorType, Result};
