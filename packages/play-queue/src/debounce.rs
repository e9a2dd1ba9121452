//! Cancellable delayed delivery used to coalesce refresh requests

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Sends one message after `delay`, restarting the wait on every `schedule`
///
/// Each scheduled timer carries a generation number. A timer that already
/// fired but was superseded before its message was processed is rejected by
/// [`Debouncer::take_fired`].
pub struct Debouncer<M: Send + 'static> {
    delay: Duration,
    generation: u64,
    pending: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<M>,
    make: fn(u64) -> M,
}

impl<M: Send + 'static> Debouncer<M> {
    pub fn new(delay: Duration, tx: mpsc::UnboundedSender<M>, make: fn(u64) -> M) -> Self {
        Self {
            delay,
            generation: 0,
            pending: None,
            tx,
            make,
        }
    }

    /// Cancel any pending timer and start a new one
    pub fn schedule(&mut self) -> u64 {
        self.cancel();
        self.generation += 1;

        let generation = self.generation;
        let delay = self.delay;
        let tx = self.tx.clone();
        let message = (self.make)(generation);
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(message);
        }));
        generation
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Accept a fired timer if it is the latest one scheduled
    pub fn take_fired(&mut self, generation: u64) -> bool {
        if generation == self.generation && self.pending.is_some() {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

impl<M: Send + 'static> Drop for Debouncer<M> {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn debouncer(ms: u64) -> (Debouncer<u64>, mpsc::UnboundedReceiver<u64>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Debouncer::new(Duration::from_millis(ms), tx, |g| g), rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let (mut debouncer, mut rx) = debouncer(50);
        let generation = debouncer.schedule();

        tokio::time::sleep(Duration::from_millis(49)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(2)).await;
        let fired = rx.recv().await.unwrap();
        assert_eq!(fired, generation);
        assert!(debouncer.take_fired(fired));
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_supersedes_earlier_timer() {
        let (mut debouncer, mut rx) = debouncer(50);
        debouncer.schedule();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let latest = debouncer.schedule();

        // First timer would have fired at 50ms
        tokio::time::sleep(Duration::from_millis(45)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(rx.recv().await.unwrap(), latest);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_generation_rejected() {
        let (mut debouncer, _rx) = debouncer(50);
        let first = debouncer.schedule();
        let second = debouncer.schedule();
        assert!(!debouncer.take_fired(first));
        assert!(debouncer.take_fired(second));
        assert!(!debouncer.take_fired(second));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_timer() {
        let (mut debouncer, mut rx) = debouncer(50);
        debouncer.schedule();
        drop(debouncer);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(rx.recv().await.is_none());
    }
}
