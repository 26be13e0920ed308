//! Debounce gate for hover translation.
//! Suppresses a query for the same text seen within a short window.

use parking_lot::Mutex;
use tokio::time::{Duration, Instant};

/// Most recent admitted query.
#[derive(Debug, Clone, Default)]
pub struct DebounceState {
    pub last_text: String,
    pub last_at: Option<Instant>,
}

/// Shared by every hover; one state for comments and identifiers alike.
pub struct DebounceGate {
    state: Mutex<DebounceState>,
}

impl DebounceGate {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(DebounceState::default()),
        }
    }

    /// Returns false when `text` equals the last admitted text and less than
    /// `window` has passed since it was admitted. Admitted queries overwrite
    /// the state; suppressed ones leave it untouched.
    pub fn admit(&self, text: &str, window: Duration) -> bool {
        let now = Instant::now();
        let mut state = self.state.lock();
        let repeated = state.last_text == text
            && state
                .last_at
                .is_some_and(|at| now.duration_since(at) < window);
        if repeated {
            return false;
        }
        state.last_text.clear();
        state.last_text.push_str(text);
        state.last_at = Some(now);
        true
    }

    pub fn snapshot(&self) -> DebounceState {
        self.state.lock().clone()
    }
}

impl Default for DebounceGate {
    fn default() -> Self {
        Self::new()
    }
}
