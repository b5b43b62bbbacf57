//! Shared test doubles.
#![allow(dead_code)]

use dingtalk_notifier::config::DingtalkConfig;
use dingtalk_notifier::core::{Diagnostic, KeyValue};
use dingtalk_notifier::notification::DingtalkService;
use std::error::Error;
use std::sync::{Arc, Mutex};
use wiremock::MockServer;

/// A single report captured by `RecordingDiagnostic`.
#[derive(Debug, Clone)]
pub struct Report {
    pub context: Vec<KeyValue>,
    pub msg: String,
    pub error: String,
}

/// A diagnostic that records every report. Children created with
/// `with_context` share the parent's report list.
#[derive(Clone, Default)]
pub struct RecordingDiagnostic {
    context: Vec<KeyValue>,
    reports: Arc<Mutex<Vec<Report>>>,
}

impl RecordingDiagnostic {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().unwrap().clone()
    }
}

impl Diagnostic for RecordingDiagnostic {
    fn with_context(&self, ctx: &[KeyValue]) -> Arc<dyn Diagnostic> {
        let mut context = self.context.clone();
        context.extend_from_slice(ctx);
        Arc::new(Self {
            context,
            reports: self.reports.clone(),
        })
    }

    fn error(&self, msg: &str, err: &(dyn Error + 'static)) {
        self.reports.lock().unwrap().push(Report {
            context: self.context.clone(),
            msg: msg.to_string(),
            error: err.to_string(),
        });
    }
}

/// Builds a service that talks to `server` instead of DingTalk.
pub fn service_for(
    server: &MockServer,
    token: &str,
    diag: Arc<dyn Diagnostic>,
) -> Arc<DingtalkService> {
    Arc::new(
        DingtalkService::new(DingtalkConfig::new(token), diag)
            .with_endpoint(format!("{}/robot/send", server.uri())),
    )
}
