//! A `Diagnostic` that reports through `tracing`.

use crate::core::{Diagnostic, KeyValue};
use std::error::Error;
use std::sync::Arc;
use tracing::error;

/// Writes every report as an `ERROR` event with its context rendered as a
/// `context` field.
#[derive(Debug, Clone, Default)]
pub struct TracingDiagnostic {
    context: Vec<KeyValue>,
}

impl TracingDiagnostic {
    pub fn new() -> Self {
        Self::default()
    }

    /// The context bound to this diagnostic, oldest first.
    pub fn context(&self) -> &[KeyValue] {
        &self.context
    }

    fn render_context(&self) -> String {
        self.context
            .iter()
            .map(|kv| format!("{}={}", kv.key, kv.value))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Diagnostic for TracingDiagnostic {
    fn with_context(&self, ctx: &[KeyValue]) -> Arc<dyn Diagnostic> {
        let mut context = self.context.clone();
        context.extend_from_slice(ctx);
        Arc::new(Self { context })
    }

    fn error(&self, msg: &str, err: &(dyn Error + 'static)) {
        error!(context = %self.render_context(), error = %err, "{}", msg);
    }
}
