use std::{collections::VecDeque, sync::Mutex};

use chrono::{DateTime, Utc};

/// Upper bound on undrained toasts; the oldest are dropped first.
pub const MAX_PENDING_TOASTS: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Info,
    Error,
}

/// A transient notification for the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Queue of pending toasts. Producers push, the UI drains.
#[derive(Debug, Default)]
pub struct Toasts {
    pending: Mutex<VecDeque<Toast>>,
}

impl Toasts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(ToastLevel::Success, message.into());
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(ToastLevel::Info, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(ToastLevel::Error, message.into());
    }

    /// Removes and returns every pending toast, oldest first.
    pub fn drain(&self) -> Vec<Toast> {
        let mut pending = match self.pending.lock() {
            Ok(pending) => pending,
            Err(poisoned) => poisoned.into_inner(),
        };
        let drained = pending.drain(..).collect();
        drained
    }

    pub fn len(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&self, level: ToastLevel, message: String) {
        match level {
            ToastLevel::Error => tracing::warn!("🔔 {}", message),
            _ => tracing::info!("🔔 {}", message),
        }

        let toast = Toast {
            level,
            message,
            created_at: Utc::now(),
        };
        let mut pending = match self.pending.lock() {
            Ok(pending) => pending,
            Err(poisoned) => poisoned.into_inner(),
        };
        if pending.len() == MAX_PENDING_TOASTS {
            pending.pop_front();
        }
        pending.push_back(toast);
    }
}
