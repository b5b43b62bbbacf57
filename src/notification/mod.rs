//! Delivery of alerts to a DingTalk robot.
//!
//! `store` holds the hot-swappable configuration, `dingtalk` performs the
//! webhook call, `handler` adapts it to the pipeline's handler interface and
//! `self_test` routes a canned message through the same path.
pub mod dingtalk;
pub mod handler;
pub mod store;

pub use dingtalk::{DingtalkService, SendError, DEFAULT_DINGTALK_URL};
pub use handler::DingtalkHandler;
pub use self_test::{SelfTest, TestError, TestOptions, TEST_MESSAGE};
pub use store::{ConfigCandidate, ConfigStore, UpdateError};
