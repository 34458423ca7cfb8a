//! Bounded FIFO queue between producers and the consumer thread.
//!
//! Many producers, one consumer. Producers never touch the store; they only
//! push here, subject to the configured [`OverflowPolicy`].

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::config::{LoggerConfig, OverflowPolicy};
use crate::error::{LogError, Result};
use crate::event::Event;

/// Outcome of a successful push.
#[derive(Debug)]
pub(crate) enum Pushed {
    /// Event queued without displacing anything.
    Queued,
    /// Event queued after evicting the returned oldest event.
    Evicted(Box<Event>),
}

#[derive(Debug, Default)]
struct QueueState {
    items: VecDeque<Event>,
    closed: bool,
    /// Events taken by the consumer but not yet stored.
    in_flight: usize,
}

impl QueueState {
    fn is_drained(&self) -> bool {
        self.items.is_empty() && self.in_flight == 0
    }
}

#[derive(Debug)]
pub(crate) struct EventQueue {
    state: Mutex<QueueState>,
    not_empty: Condvar,
    not_full: Condvar,
    drained: Condvar,
    capacity: usize,
    overflow: OverflowPolicy,
    block_timeout: Option<Duration>,
}

impl EventQueue {
    pub(crate) fn new(config: &LoggerConfig) -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(config.buffer_size),
                ..QueueState::default()
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            drained: Condvar::new(),
            capacity: config.buffer_size,
            overflow: config.overflow,
            block_timeout: config.block_timeout,
        }
    }

    pub(crate) const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Enqueues an event according to the overflow policy.
    pub(crate) fn push(&self, event: Event) -> Result<Pushed> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(LogError::Closed);
        }

        let mut outcome = Pushed::Queued;
        if state.items.len() >= self.capacity {
            match self.overflow {
                OverflowPolicy::Block => {
                    // A timeout too large to represent as an instant waits untimed.
                    let deadline = self
                        .block_timeout
                        .and_then(|t| Instant::now().checked_add(t).map(|at| (at, t)));
                    while state.items.len() >= self.capacity && !state.closed {
                        match deadline {
                            Some((at, limit)) => {
                                if self.not_full.wait_until(&mut state, at).timed_out()
                                    && state.items.len() >= self.capacity
                                    && !state.closed
                                {
                                    return Err(LogError::Timeout(limit));
                                }
                            }
                            None => self.not_full.wait(&mut state),
                        }
                    }
                    if state.closed {
                        return Err(LogError::Closed);
                    }
                }
                OverflowPolicy::DropOldest => {
                    if let Some(oldest) = state.items.pop_front() {
                        outcome = Pushed::Evicted(Box::new(oldest));
                    }
                }
                OverflowPolicy::DropNewest | OverflowPolicy::FailFast => {
                    return Err(LogError::QueueFull {
                        capacity: self.capacity,
                    });
                }
            }
        }

        state.items.push_back(event);
        drop(state);
        self.not_empty.notify_one();
        Ok(outcome)
    }

    /// Takes the next event, waiting while the queue is open and empty.
    ///
    /// Returns `None` once the queue is closed and fully drained. Every
    /// returned event must be acknowledged with [`EventQueue::complete`].
    pub(crate) fn pop(&self) -> Option<Event> {
        let mut state = self.state.lock();
        loop {
            if let Some(event) = state.items.pop_front() {
                state.in_flight += 1;
                drop(state);
                self.not_full.notify_one();
                return Some(event);
            }
            if state.closed {
                return None;
            }
            self.not_empty.wait(&mut state);
        }
    }

    /// Marks one popped event as stored.
    pub(crate) fn complete(&self) {
        let mut state = self.state.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        if state.is_drained() {
            self.drained.notify_all();
        }
    }

    /// Stops accepting events and wakes every waiter.
    ///
    /// Returns false if the queue was already closed.
    pub(crate) fn close(&self) -> bool {
        let mut state = self.state.lock();
        let was_open = !state.closed;
        state.closed = true;
        drop(state);
        self.not_empty.notify_all();
        self.not_full.notify_all();
        self.drained.notify_all();
        was_open
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Waits until every queued event has been stored.
    ///
    /// A timeout too large to represent as an instant waits without limit.
    pub(crate) fn wait_drained(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.state.lock();
        while !state.is_drained() {
            match deadline {
                Some(at) => {
                    if self.drained.wait_until(&mut state, at).timed_out() && !state.is_drained()
                    {
                        return Err(LogError::Timeout(timeout));
                    }
                }
                None => self.drained.wait(&mut state),
            }
        }
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.state.lock().items.len()
    }
}
