use chrono::{DateTime, Duration, Utc};

pub const DEFAULT_TTL: Duration = Duration::seconds(3);
pub const ERROR_TTL: Duration = Duration::seconds(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub kind: ToastKind,
    /// Toasts without expiry stay until they are removed.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Transient messages shown on top of the application.
#[derive(Debug, Default)]
pub struct Toasts {
    next_id: u64,
    toasts: Vec<Toast>,
}

impl Toasts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        message: impl Into<String>,
        kind: ToastKind,
        ttl: Option<Duration>,
        now: DateTime<Utc>,
    ) -> u64 {
        self.next_id += 1;
        self.toasts.push(Toast {
            id: self.next_id,
            message: message.into(),
            kind,
            expires_at: ttl.map(|ttl| now + ttl),
        });
        self.next_id
    }

    /// Show the message of an error, or `fallback` if the message is empty.
    pub fn push_error(
        &mut self,
        err: &dyn std::error::Error,
        fallback: &str,
        now: DateTime<Utc>,
    ) -> u64 {
        let message = err.to_string();
        let message = if message.is_empty() {
            fallback.to_string()
        } else {
            message
        };
        self.push(message, ToastKind::Error, Some(ERROR_TTL), now)
    }

    pub fn remove(&mut self, id: u64) -> Option<Toast> {
        let index = self.toasts.iter().position(|t| t.id == id)?;
        Some(self.toasts.remove(index))
    }

    /// Remove all expired toasts. Returns the number of removed toasts.
    pub fn expire(&mut self, now: DateTime<Utc>) -> usize {
        let len = self.toasts.len();
        self.toasts
            .retain(|t| t.expires_at.is_none_or(|expires_at| expires_at > now));
        len - self.toasts.len()
    }

    pub fn clear(&mut self) {
        self.toasts.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}
