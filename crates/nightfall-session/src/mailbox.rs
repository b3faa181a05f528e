//! Bounded single-consumer queue with an explicit overflow policy.
//!
//! Producers never wait: [`Mailbox::push`] always returns immediately and
//! reports what happened. The one consumer awaits [`Mailbox::recv`], which
//! keeps yielding queued items after [`Mailbox::close`] until the queue is
//! drained.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;

/// What a full mailbox does with an incoming item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Evict the oldest queued item to admit the new one.
    #[default]
    DropOldest,
    /// Keep the queue as is and reject the new item.
    DropNewest,
}

/// Result of a [`Mailbox::push`].
#[derive(Debug, PartialEq, Eq)]
pub enum PushOutcome<T> {
    /// The item was queued without loss.
    Queued,
    /// The item was queued; this older item was evicted for it.
    Evicted(T),
    /// The mailbox was full and the item was not queued.
    Rejected(T),
    /// The mailbox is closed; the item is handed back.
    Closed(T),
}

impl<T> PushOutcome<T> {
    /// Returns `true` if the pushed item is now in the queue.
    pub fn is_queued(&self) -> bool {
        matches!(self, Self::Queued | Self::Evicted(_))
    }
}

struct Inner<T> {
    queue: VecDeque<T>,
    closed: bool,
}

/// A bounded queue shared between any number of producers and one consumer.
pub struct Mailbox<T> {
    inner: Mutex<Inner<T>>,
    ready: Notify,
    capacity: usize,
    policy: OverflowPolicy,
}

impl<T> Mailbox<T> {
    /// Creates a mailbox holding at most `capacity` items (minimum 1).
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(Inner {
                queue: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            ready: Notify::new(),
            capacity,
            policy,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        // A panicking producer cannot leave the queue half-updated, so the
        // data is still usable after poisoning.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueues `item` without blocking, applying the overflow policy.
    pub fn push(&self, item: T) -> PushOutcome<T> {
        let outcome = {
            let mut inner = self.lock();
            if inner.closed {
                return PushOutcome::Closed(item);
            }
            if inner.queue.len() < self.capacity {
                inner.queue.push_back(item);
                PushOutcome::Queued
            } else {
                match self.policy {
                    OverflowPolicy::DropNewest => {
                        return PushOutcome::Rejected(item);
                    }
                    OverflowPolicy::DropOldest => {
                        let evicted = inner.queue.pop_front();
                        inner.queue.push_back(item);
                        match evicted {
                            Some(old) => PushOutcome::Evicted(old),
                            None => PushOutcome::Queued,
                        }
                    }
                }
            }
        };
        self.ready.notify_one();
        outcome
    }

    /// Waits for the next item.
    ///
    /// Returns `None` once the mailbox is closed and empty.
    pub async fn recv(&self) -> Option<T> {
        loop {
            let notified = self.ready.notified();
            {
                let mut inner = self.lock();
                if let Some(item) = inner.queue.pop_front() {
                    return Some(item);
                }
                if inner.closed {
                    return None;
                }
            }
            notified.await;
        }
    }

    /// Takes the next item if one is queued.
    pub fn try_recv(&self) -> Option<T> {
        self.lock().queue.pop_front()
    }

    /// Removes and returns everything currently queued.
    pub fn drain(&self) -> Vec<T> {
        self.lock().queue.drain(..).collect()
    }

    /// Stops accepting new items. Already queued items remain receivable.
    pub fn close(&self) {
        self.lock().closed = true;
        self.ready.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }
}

impl<T> std::fmt::Debug for Mailbox<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailbox")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .field("policy", &self.policy)
            .finish()
    }
}
