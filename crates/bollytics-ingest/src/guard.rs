//! Serializes ingestion cycles.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Lets at most one ingestion cycle run at a time.
///
/// Clones share state. A tick that cannot acquire the guard skips its cycle.
#[derive(Debug, Clone, Default)]
pub struct CycleGuard {
    running: Arc<AtomicBool>,
}

/// Held for the duration of a cycle; releases the guard on drop, including on
/// error or cancellation.
#[derive(Debug)]
pub struct CycleTicket {
    running: Arc<AtomicBool>,
}

impl CycleGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a ticket if no other cycle holds one.
    #[must_use]
    pub fn try_start(&self) -> Option<CycleTicket> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CycleTicket {
                running: Arc::clone(&self.running),
            })
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl Drop for CycleTicket {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_start_is_refused_while_first_runs() {
        let guard = CycleGuard::new();
        let ticket = guard.try_start().expect("first start");
        assert!(guard.is_running());
        assert!(guard.try_start().is_none());
        drop(ticket);
        assert!(!guard.is_running());
        assert!(guard.try_start().is_some());
    }

    #[test]
    fn clones_share_state() {
        let guard = CycleGuard::new();
        let other = guard.clone();
        let _ticket = guard.try_start().unwrap();
        assert!(other.try_start().is_none());
    }

    #[tokio::test]
    async fn ticket_is_released_when_the_task_is_cancelled() {
        let guard = CycleGuard::new();
        let task_guard = guard.clone();
        let handle = tokio::spawn(async move {
            let _ticket = task_guard.try_start().unwrap();
            std::future::pending::<()>().await;
        });
        tokio::task::yield_now().await;
        while !guard.is_running() {
            tokio::task::yield_now().await;
        }
        handle.abort();
        let _ = handle.await;
        assert!(!guard.is_running());
    }
}
