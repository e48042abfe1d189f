pub mod config;
pub(crate) mod error;
pub mod gateway;
pub mod prompts;
pub mod server;
pub mod tools;

pub use error::{ElabError, Result};
