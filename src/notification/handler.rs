//! Binds a `DingtalkService` to the pipeline's alert-handler interface.

use crate::core::{AlertEvent, AlertHandler, Diagnostic};
use crate::notification::dingtalk::DingtalkService;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

/// Sends each event's message to DingTalk.
///
/// Delivery failures never reach the pipeline; they are reported to the
/// handler's diagnostic instead.
pub struct DingtalkHandler {
    service: Arc<DingtalkService>,
    diag: Arc<dyn Diagnostic>,
}

impl DingtalkHandler {
    pub fn new(service: Arc<DingtalkService>, diag: Arc<dyn Diagnostic>) -> Self {
        Self { service, diag }
    }
}

#[async_trait]
impl AlertHandler for DingtalkHandler {
    #[instrument(skip_all, fields(alert_id = %event.id, level = %event.state.level))]
    async fn handle(&self, event: &AlertEvent) {
        if let Err(e) = self.service.send(&event.state.message).await {
            self.diag.error("failed to send event to DingTalk", &e);
        }
    }
}
