use async_trait::async_trait;
use std::fmt;

/// Severity of an alert, rendered as a leading emoji.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Error,
    Success,
    Notice,
}

impl MessageKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            MessageKind::Error => "🚨",
            MessageKind::Success => "👍",
            MessageKind::Notice => "ℹ️",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MessageKind::Error => "error",
            MessageKind::Success => "success",
            MessageKind::Notice => "notice",
        };
        f.write_str(label)
    }
}

/// Formats an alert as `<emoji> <script>: <message>`.
pub fn format_message(kind: MessageKind, script_name: &str, message: &str) -> String {
    format!("{} {}: {}", kind.prefix(), script_name, message)
}

/// A channel the run reports its outcome to.
///
/// Posting never fails the run: implementations log delivery problems and
/// return.
#[async_trait]
pub trait Alerter: Send + Sync {
    async fn post(&self, message: &str, kind: MessageKind);
}
