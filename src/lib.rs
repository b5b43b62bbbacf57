//! DingTalk notifier - delivers alert messages to a DingTalk robot webhook
//!
//! This library provides a pluggable alert handler for an alerting pipeline,
//! backed by a hot-reloadable configuration.

pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod diagnostics;
pub mod notification;
pub mod watcher;

// Re-export core types for convenience
pub use crate::core::*;
