//! # Run Alerts
//!
//! Status and error summaries pushed to an external channel. The environment
//! file decides which channel, so test runs never alert production.
//!
//! ## Submodules
//!
//! - **notifier**: The `Alerter` trait and message formatting.
//! - **slack**: Slack `chat.postMessage` implementation.

mod notifier;
mod slack;

pub use notifier::{format_message, Alerter, MessageKind};
pub use slack::SlackAlert;
