use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Allows at most one outstanding submission at a time.
#[derive(Debug, Clone, Default)]
pub struct SubmissionGuard {
    in_flight: Arc<AtomicBool>,
}

impl SubmissionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the slot, or returns `None` while another submission holds it.
    pub fn try_acquire(&self) -> Option<InFlight> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight {
                flag: Arc::clone(&self.in_flight),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Held for the lifetime of one submission attempt; releases the guard on drop.
#[derive(Debug)]
pub struct InFlight {
    flag: Arc<AtomicBool>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
