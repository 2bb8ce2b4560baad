use relaymq_common::ServerFrame;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tracing::warn;

#[derive(Debug)]
struct QueueState {
    frames: VecDeque<ServerFrame>,
    closed: bool,
    dropped: u64,
}

#[derive(Debug)]
struct Inner {
    queue: Mutex<QueueState>,
    notify: Notify,
    capacity: usize,
}

/// Per-session bounded outbound queue with a single writer.
///
/// Publishers deliver by enqueuing; the connection's writer task is the one
/// consumer and serializes frames onto the socket in enqueue order. A full
/// queue drops its oldest frame so a stalled reader can never block the
/// broker or grow memory without bound.
///
/// Handles are cheap clones over a shared queue.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

impl Dispatcher {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                queue: Mutex::new(QueueState {
                    frames: VecDeque::with_capacity(capacity.min(64)),
                    closed: false,
                    dropped: 0,
                }),
                notify: Notify::new(),
                capacity,
            }),
        }
    }

    /// Non-blocking enqueue. Returns false once the dispatcher is closed.
    pub fn enqueue(&self, frame: ServerFrame) -> bool {
        {
            let mut state = self.inner.queue.lock().expect("dispatch queue poisoned");
            if state.closed {
                return false;
            }
            if state.frames.len() == self.inner.capacity {
                state.frames.pop_front();
                state.dropped += 1;
                warn!(dropped = state.dropped, "session queue full, dropping oldest frame");
            }
            state.frames.push_back(frame);
        }
        self.inner.notify.notify_one();
        true
    }

    /// Waits for frames and drains them all into `buf` in FIFO order.
    ///
    /// Returns false when the dispatcher has been closed and the queue is
    /// empty. Intended for exactly one consumer per dispatcher.
    pub async fn next_batch(&self, buf: &mut Vec<ServerFrame>) -> bool {
        loop {
            {
                let mut state = self.inner.queue.lock().expect("dispatch queue poisoned");
                if !state.frames.is_empty() {
                    buf.extend(state.frames.drain(..));
                    return true;
                }
                if state.closed {
                    return false;
                }
            }
            self.inner.notify.notified().await;
        }
    }

    /// Marks the queue closed and wakes the writer so it can terminate.
    pub fn close(&self) {
        {
            let mut state = self.inner.queue.lock().expect("dispatch queue poisoned");
            state.closed = true;
        }
        self.inner.notify.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.queue.lock().expect("dispatch queue poisoned").closed
    }

    /// Frames discarded by the drop-oldest policy so far.
    pub fn dropped(&self) -> u64 {
        self.inner.queue.lock().expect("dispatch queue poisoned").dropped
    }

    /// True when both handles point at the same underlying queue.
    pub fn same_queue(&self, other: &Dispatcher) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
