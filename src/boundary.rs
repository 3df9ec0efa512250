use std::{fmt::Display, sync::Mutex};

/// Top-level fallback for view faults nothing else handled.
///
/// A captured fault stays until [`FallbackBoundary::reset`], which the
/// application shell pairs with a hard navigation back to login.
#[derive(Debug, Default)]
pub struct FallbackBoundary {
    fault: Mutex<Option<String>>,
}

impl FallbackBoundary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Passes a successful value through; records an error as the current fault.
    pub fn capture<T, E: Display>(&self, result: std::result::Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                let message = e.to_string();
                tracing::error!("❌ Unhandled view fault: {}", message);
                *self.lock() = Some(message);
                None
            }
        }
    }

    /// The message of the current fault, if any.
    pub fn fault(&self) -> Option<String> {
        self.lock().clone()
    }

    pub fn is_faulted(&self) -> bool {
        self.lock().is_some()
    }

    /// Clears the fault. Returns whether there was one.
    pub fn reset(&self) -> bool {
        self.lock().take().is_some()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        match self.fault.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
