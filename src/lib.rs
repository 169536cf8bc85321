//! cpplibhub - dependency management for C and C++ projects
//!
//! The binary lives in `main.rs`; everything it drives is exposed here so
//! the helper layer can be reused and tested on its own.

pub mod archive;
pub mod cli;
pub mod download;
pub mod env;
pub mod error;
pub mod files;
pub mod settings;
pub mod shell;

pub use error::{Error, Result};
