//! Hot-swappable storage for the active DingTalk configuration.

use crate::config::DingtalkConfig;
use arc_swap::ArcSwap;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// A candidate configuration delivered by a reconfiguration event.
///
/// Reconfiguration batches are shared between services, so a batch may carry
/// configuration meant for somebody else.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigCandidate {
    Dingtalk(DingtalkConfig),
    /// Configuration for another service, identified by its name.
    Other { service: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpdateError {
    #[error("expected only one new config object, got {0}")]
    BatchSize(usize),

    #[error("expected a dingtalk config object, got a {0} config")]
    UnexpectedType(String),
}

/// Holds the active configuration as an immutable snapshot.
///
/// Readers never block and never see a mix of two configurations; a stored
/// value is visible to every load that starts after `store` returns.
pub struct ConfigStore {
    current: ArcSwap<DingtalkConfig>,
}

impl ConfigStore {
    pub fn new(config: DingtalkConfig) -> Self {
        Self {
            current: ArcSwap::from_pointee(config),
        }
    }

    /// Replaces the active configuration. The value is not validated here.
    pub fn store(&self, config: DingtalkConfig) {
        self.current.store(Arc::new(config));
    }

    /// Returns the most recently stored configuration.
    pub fn current(&self) -> Arc<DingtalkConfig> {
        self.current.load_full()
    }

    /// Applies a reconfiguration batch, which must hold exactly one DingTalk
    /// configuration.
    pub fn update(&self, batch: Vec<ConfigCandidate>) -> Result<(), UpdateError> {
        if batch.len() != 1 {
            return Err(UpdateError::BatchSize(batch.len()));
        }
        match batch.into_iter().next() {
            Some(ConfigCandidate::Dingtalk(config)) => {
                info!(enabled = config.enabled, "Applying new DingTalk configuration");
                self.store(config);
                Ok(())
            }
            Some(ConfigCandidate::Other { service }) => Err(UpdateError::UnexpectedType(service)),
            None => Err(UpdateError::BatchSize(0)),
        }
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(DingtalkConfig::default())
    }
}
