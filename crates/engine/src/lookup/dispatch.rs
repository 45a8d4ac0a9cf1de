//! Bounded, paced admission of lookup resolutions.
//!
//! At most `max_concurrent` resolutions run at once, waiters are admitted in
//! FIFO order, and consecutive admissions are at least `spacing` apart so a
//! form with many lookup fields does not burst the upstream API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, Semaphore, SemaphorePermit};
use tokio::time::{Instant, sleep_until};
use tracing::debug;

#[derive(Debug)]
pub struct DispatchQueue {
    permits: Semaphore,
    spacing: Duration,
    last_dispatch: Mutex<Option<Instant>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

/// Admission to run one resolution. The slot is released on drop, whatever
/// the outcome of the work it guarded.
#[derive(Debug)]
pub struct DispatchPermit<'a> {
    _permit: SemaphorePermit<'a>,
    queue: &'a DispatchQueue,
}

impl Drop for DispatchPermit<'_> {
    fn drop(&mut self) {
        self.queue.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl DispatchQueue {
    /// `max_concurrent` is clamped to at least one slot.
    pub fn new(max_concurrent: usize, spacing: Duration) -> Self {
        Self {
            permits: Semaphore::new(max_concurrent.max(1)),
            spacing,
            last_dispatch: Mutex::new(None),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Wait for a free slot and for the spacing window to pass.
    ///
    /// Returns `None` once the queue has been closed.
    pub async fn acquire(&self) -> Option<DispatchPermit<'_>> {
        let permit = self.permits.acquire().await.ok()?;

        {
            let mut last_dispatch = self.last_dispatch.lock().await;
            if let Some(previous) = *last_dispatch {
                let ready_at = previous + self.spacing;
                if Instant::now() < ready_at {
                    sleep_until(ready_at).await;
                }
            }
            *last_dispatch = Some(Instant::now());
        }

        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(in_flight, Ordering::SeqCst);
        debug!(in_flight, available = self.permits.available_permits(), "lookup dispatch admitted");
        Some(DispatchPermit {
            _permit: permit,
            queue: self,
        })
    }

    /// Reject current waiters and every later [`DispatchQueue::acquire`].
    pub fn close(&self) {
        self.permits.close();
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}
