//! Core domain types and service traits
//!
//! This module defines the alert event consumed from the surrounding alerting
//! pipeline and the trait contracts the notifier exposes to, or consumes from,
//! that pipeline.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Severity of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertLevel {
    Ok,
    #[default]
    Info,
    Warning,
    Critical,
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlertLevel::Ok => "OK",
            AlertLevel::Info => "INFO",
            AlertLevel::Warning => "WARNING",
            AlertLevel::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

/// The current state of an alert, as rendered by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct EventState {
    /// The human-readable, already templated message.
    pub message: String,
    pub level: AlertLevel,
    pub time: DateTime<Utc>,
}

/// An alert event handed to handlers by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    /// Identifier of the alert this event belongs to.
    pub id: String,
    pub state: EventState,
}

impl AlertEvent {
    /// Creates an event stamped with the current time.
    pub fn new(id: impl Into<String>, message: impl Into<String>, level: AlertLevel) -> Self {
        Self {
            id: id.into(),
            state: EventState {
                message: message.into(),
                level,
                time: Utc::now(),
            },
        }
    }
}

/// A contextual tag attached to diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

// =============================================================================
// Service Traits
// =============================================================================

/// Receives one alert event per invocation.
///
/// Handlers have no way to report failure back to the pipeline; anything that
/// goes wrong must be reported through a [`Diagnostic`].
#[async_trait]
pub trait AlertHandler: Send + Sync {
    async fn handle(&self, event: &AlertEvent);
}

/// Sink for failure reports, optionally bound to contextual tags.
pub trait Diagnostic: Send + Sync {
    /// Returns a diagnostic that attaches `ctx` to every report, in addition
    /// to any context already bound to `self`.
    fn with_context(&self, ctx: &[KeyValue]) -> Arc<dyn Diagnostic>;

    /// Reports an error.
    fn error(&self, msg: &str, err: &(dyn Error + 'static));
}
