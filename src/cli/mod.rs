//! CLI module for the `docrag` binary
//!
//! Command line argument parsing plus the handlers that wire configuration
//! into the library services.

pub mod commands;
pub mod handlers;

pub use commands::*;
pub use handlers::*;
