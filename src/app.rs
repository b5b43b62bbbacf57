//! The command-line workflows, kept out of `main.rs` so they can be driven
//! from tests against a mock webhook.

use crate::core::{AlertEvent, AlertHandler, AlertLevel, KeyValue};
use crate::notification::{DingtalkService, SelfTest};
use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

/// Totals for a `dispatch_lines` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Non-empty lines read.
    pub received: u64,
    /// Lines dropped because DingTalk was disabled when they arrived.
    pub dropped: u64,
}

/// Sends a single message, refusing when DingTalk is disabled.
pub async fn send_message(service: &DingtalkService, message: &str) -> Result<()> {
    if !service.config().enabled {
        anyhow::bail!("DingTalk notifications are disabled");
    }
    service.send(message).await?;
    info!("Message delivered.");
    Ok(())
}

/// Sends the canned test message through the self-test path.
pub async fn run_self_test(service: &DingtalkService) -> Result<()> {
    let options = service.test_options();
    service.run_test(&*options).await?;
    info!("Test message delivered.");
    Ok(())
}

/// Treats every non-empty line of `reader` as an alert and hands it to a
/// handler bound to that alert's id.
///
/// The `enabled` flag is checked per line, so a hot reload that disables
/// DingTalk takes effect for the next line. Delivery failures go to the
/// service's diagnostic and do not stop the loop.
pub async fn dispatch_lines<R>(service: &Arc<DingtalkService>, reader: R) -> Result<RunSummary>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut summary = RunSummary::default();

    while let Some(line) = lines.next_line().await? {
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        summary.received += 1;
        let id = format!("stdin-{}", summary.received);
        if !service.config().enabled {
            warn!(alert_id = %id, "DingTalk notifications are disabled, dropping alert");
            summary.dropped += 1;
            continue;
        }
        let event = AlertEvent::new(id.clone(), message, AlertLevel::Info);
        let handler = service.handler(&[KeyValue::new("alert_id", id)]);
        handler.handle(&event).await;
    }

    info!(
        received = summary.received,
        dropped = summary.dropped,
        "End of input, shutting down."
    );
    Ok(summary)
}
