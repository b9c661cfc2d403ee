use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

pub const TOAST_SECS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
        }
    }
}

/// Transient notification shown at the bottom of a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub shown_at: DateTime<Utc>,
}

impl Toast {
    pub fn new(message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            message: message.into(),
            kind,
            shown_at: Utc::now(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, ToastKind::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, ToastKind::Error)
    }

    pub fn is_visible(&self, now: DateTime<Utc>, ttl_secs: i64) -> bool {
        now - self.shown_at < Duration::seconds(ttl_secs)
    }

    /// Milliseconds left before auto-dismiss, zero once expired.
    pub fn remaining_ms(&self, now: DateTime<Utc>, ttl_secs: i64) -> i64 {
        let left = Duration::seconds(ttl_secs) - (now - self.shown_at);
        left.num_milliseconds().max(0)
    }

    pub fn css_class(&self) -> String {
        format!("toast show {}", self.kind.as_str())
    }
}
