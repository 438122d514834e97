pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod guard;
pub mod http;
pub mod lookup;
pub mod resources;
pub mod session;

pub use error::ClientError;

#[cfg(test)]
pub mod testing;
