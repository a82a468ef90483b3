//! One-shot replies from the host or from worker threads, and the liveness
//! tokens that guard what happens when they arrive.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;

pub enum PendingState<T> {
    Waiting,
    Ready(T),
    /// The producer went away without answering.
    Lost,
}

/// A value that will arrive later over a channel.
pub struct Pending<T> {
    rx: Receiver<T>,
    finished: bool,
}

impl<T: Send + 'static> Pending<T> {
    pub fn channel() -> (Sender<T>, Self) {
        let (tx, rx) = mpsc::channel();
        (
            tx,
            Self {
                rx,
                finished: false,
            },
        )
    }

    pub fn ready(value: T) -> Self {
        let (tx, pending) = Self::channel();
        let _ = tx.send(value);
        pending
    }

    /// Run `work` on a worker thread and hand its result back.
    pub fn spawn<F>(name: &str, work: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, pending) = Self::channel();
        let spawned = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let _ = tx.send(work());
            });
        if let Err(e) = spawned {
            tracing::error!("failed to spawn {name} worker: {e}");
        }
        pending
    }

    pub fn poll(&mut self) -> PendingState<T> {
        if self.finished {
            return PendingState::Lost;
        }
        match self.rx.try_recv() {
            Ok(v) => {
                self.finished = true;
                PendingState::Ready(v)
            }
            Err(TryRecvError::Empty) => PendingState::Waiting,
            Err(TryRecvError::Disconnected) => {
                self.finished = true;
                PendingState::Lost
            }
        }
    }
}

/// Shared flag flipped exactly once, from alive to dead.
#[derive(Clone, Debug)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn kill(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_value_is_taken_once() {
        let mut p = Pending::ready(5);
        assert!(matches!(p.poll(), PendingState::Ready(5)));
        assert!(matches!(p.poll(), PendingState::Lost));
    }

    #[test]
    fn dropped_sender_is_lost() {
        let (tx, mut p) = Pending::<u8>::channel();
        assert!(matches!(p.poll(), PendingState::Waiting));
        drop(tx);
        assert!(matches!(p.poll(), PendingState::Lost));
    }

    #[test]
    fn liveness_is_shared_between_clones() {
        let a = Liveness::new();
        let b = a.clone();
        b.kill();
        assert!(!a.is_alive());
    }
}
