//! Common types and utilities shared across the Salat crates.
//!
//! This crate holds the pieces every other crate (and the `salat` binary)
//! leans on: logging initialisation, the shared error type, and the
//! log-format switch used by configuration. It stays dependency-light so the
//! parsing crates can pull it in without dragging the HTTP stack along.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`SalatError`] and [`Result`]: Shared error handling
//! - [`LogFormat`]: Output encoding for structured logs
//!
//! # Examples
//!
//! ```rust
//! use salat_common::{LogFormat, SalatError};
//!
//! let fmt: LogFormat = "json".parse().unwrap();
//! assert_eq!(fmt, LogFormat::Json);
//!
//! let err = SalatError::Config("missing source url".into());
//! assert_eq!(err.to_string(), "Configuration error: missing source url");
//! ```
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub mod observability;

/// Output encoding for structured logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = SalatError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(SalatError::Config(format!("unknown log format: {other}"))),
        }
    }
}

/// Error types used across the Salat workspace.
#[derive(thiserror::Error, Debug)]
pub enum SalatError {
    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The schedule pipeline could not produce data.
    #[error("Schedule error: {0}")]
    Schedule(String),
}

/// Convenient alias for results that use [`SalatError`].
pub type Result<T> = std::result::Result<T, SalatError>;
