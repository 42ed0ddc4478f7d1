//! DataMirror Common Library
//!
//! Shared error handling and logging setup for the DataMirror workspace.
//!
//! # Overview
//!
//! This crate provides functionality used across all DataMirror workspace
//! members:
//!
//! - **Error Handling**: the `MirrorError` taxonomy and `Result` alias
//! - **Logging**: centralized `tracing` subscriber initialization
//!
//! # Example
//!
//! ```no_run
//! use mirror_common::logging::{init_logging, LogConfig};
//! use tracing::info;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     init_logging(&config)?;
//!     info!("Application started");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{MirrorError, Result};
