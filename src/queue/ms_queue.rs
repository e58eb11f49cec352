//! Michael-Scott Queue
//!
//! An unbounded FIFO over a singly linked list that always holds a sentinel
//! node. `head` points at the sentinel; the first real value lives in
//! `head.next`. `tail` points at the last node or, briefly, at its
//! predecessor.
//!
//! ## Protocol
//!
//! ```text
//! enqueue                               dequeue
//! -------                               -------
//! read tail, tail.next                  read head, head.next, tail
//! next != null -> help: CAS tail        head.next == null -> empty
//! CAS tail.next: null -> node           tail == head -> help: CAS tail
//! CAS tail: old -> node (best effort)   CAS head: sentinel -> head.next
//! ```
//!
//! The CAS on `tail.next` linearizes an enqueue; the CAS on `head` linearizes a
//! dequeue. The dequeued node becomes the new sentinel and the old sentinel is
//! retired through `crossbeam-epoch`.
//!
//! `tail` never trails `head`: dequeue only moves `head` forward once it has
//! seen `tail != head`, and helps `tail` forward otherwise. That is what makes
//! it safe to retire the old sentinel.

use crate::metrics::{AtomicMetrics, ContentionMetrics, MetricsCollector};
use core::fmt;
use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicIsize, Ordering};
use crossbeam_epoch::{self as epoch, Atomic, Owned, Shared};
use crossbeam_utils::{Backoff, CachePadded};

struct Node<T> {
    // Uninitialized in the sentinel, and again once a dequeue has moved it out.
    value: MaybeUninit<T>,
    next: Atomic<Node<T>>,
}

/// A lock-free unbounded MPMC queue
///
/// # Ordering
///
/// Values come out in the order their enqueue CASes succeeded. With a single
/// producer and a single consumer that is exactly submission order; with many
/// producers each value is dequeued exactly once.
///
/// # Examples
///
/// ```rust
/// use atomkit::queue::MsQueue;
///
/// let queue = MsQueue::new();
/// assert_eq!(queue.dequeue(), None);
///
/// queue.enqueue(5);
/// queue.enqueue(6);
/// assert_eq!(queue.dequeue(), Some(5));
/// assert_eq!(queue.dequeue(), Some(6));
/// assert_eq!(queue.dequeue(), None);
/// ```
pub struct MsQueue<T> {
    head: CachePadded<Atomic<Node<T>>>,
    tail: CachePadded<Atomic<Node<T>>>,
    // Signed: a pop can land before the matching push has counted itself.
    len: AtomicIsize,
    metrics: AtomicMetrics,
}

unsafe impl<T: Send> Send for MsQueue<T> {}
unsafe impl<T: Send> Sync for MsQueue<T> {}

impl<T> MsQueue<T> {
    /// Create an empty queue holding only its sentinel
    pub fn new() -> Self {
        let sentinel = Owned::new(Node {
            value: MaybeUninit::uninit(),
            next: Atomic::null(),
        });
        // Safety: the queue is not shared yet.
        let sentinel = sentinel.into_shared(unsafe { epoch::unprotected() });

        Self {
            head: CachePadded::new(Atomic::from(sentinel)),
            tail: CachePadded::new(Atomic::from(sentinel)),
            len: AtomicIsize::new(0),
            metrics: AtomicMetrics::default(),
        }
    }

    /// Append a value at the tail
    ///
    /// # Examples
    ///
    /// ```rust
    /// use atomkit::queue::MsQueue;
    ///
    /// let queue = MsQueue::new();
    /// queue.enqueue("job");
    /// assert_eq!(queue.len(), 1);
    /// ```
    pub fn enqueue(&self, value: T) {
        let timer = self.metrics.start();
        let backoff = Backoff::new();
        let guard = &epoch::pin();

        let mut node = Owned::new(Node {
            value: MaybeUninit::new(value),
            next: Atomic::null(),
        });

        loop {
            let tail = self.tail.load(Ordering::Acquire, guard);
            // Safety: `tail` is never null and the guard keeps it alive.
            let tail_ref = unsafe { tail.deref() };
            let next = tail_ref.next.load(Ordering::Acquire, guard);

            if !next.is_null() {
                // Another enqueue linked a node but has not swung `tail` yet.
                self.advance_tail(tail, next, guard);
                continue;
            }

            match tail_ref.next.compare_exchange(
                Shared::null(),
                node,
                Ordering::Release,
                Ordering::Relaxed,
                guard,
            ) {
                Ok(linked) => {
                    // Best effort; a failure means someone already helped.
                    let _ = self.tail.compare_exchange(
                        tail,
                        linked,
                        Ordering::Release,
                        Ordering::Relaxed,
                        guard,
                    );
                    self.len.fetch_add(1, Ordering::Relaxed);
                    self.metrics.record_success(timer);
                    return;
                }
                Err(err) => {
                    node = err.new;
                    self.metrics.record_retry();
                    backoff.spin();
                }
            }
        }
    }

    /// Remove the value at the head
    ///
    /// Returns `None` without blocking when the queue is observed empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use atomkit::queue::MsQueue;
    ///
    /// let queue = MsQueue::new();
    /// queue.enqueue(1);
    /// assert_eq!(queue.dequeue(), Some(1));
    /// assert_eq!(queue.dequeue(), None);
    /// ```
    pub fn dequeue(&self) -> Option<T> {
        let timer = self.metrics.start();
        let backoff = Backoff::new();
        let guard = &epoch::pin();

        loop {
            let head = self.head.load(Ordering::Acquire, guard);
            // Safety: `head` is the sentinel, never null, kept alive by the guard.
            let next = unsafe { head.deref() }.next.load(Ordering::Acquire, guard);
            let tail = self.tail.load(Ordering::Acquire, guard);

            // Safety: as above for any node reachable from `head`.
            let Some(next_ref) = (unsafe { next.as_ref() }) else {
                self.metrics.record_empty(timer);
                return None;
            };

            if tail == head {
                self.advance_tail(tail, next, guard);
                continue;
            }

            if self
                .head
                .compare_exchange(head, next, Ordering::Release, Ordering::Relaxed, guard)
                .is_ok()
            {
                self.len.fetch_sub(1, Ordering::Relaxed);

                // Safety: the winning CAS grants exclusive rights to `next`'s
                // value, which is read exactly once. `next` is now the
                // sentinel, so nobody reads it again. The old sentinel is no
                // longer reachable from `head` or `tail`.
                let value = unsafe {
                    let value = next_ref.value.assume_init_read();
                    guard.defer_destroy(head);
                    value
                };

                self.metrics.record_success(timer);
                return Some(value);
            }

            self.metrics.record_retry();
            backoff.spin();
        }
    }

    fn advance_tail<'g>(
        &self,
        tail: Shared<'g, Node<T>>,
        next: Shared<'g, Node<T>>,
        guard: &'g epoch::Guard,
    ) {
        if self
            .tail
            .compare_exchange(tail, next, Ordering::Release, Ordering::Relaxed, guard)
            .is_ok()
        {
            self.metrics.record_help();
        }
    }

    /// Whether the queue was empty at the moment of the check
    pub fn is_empty(&self) -> bool {
        let guard = &epoch::pin();
        let head = self.head.load(Ordering::Acquire, guard);
        // Safety: the sentinel is never null.
        unsafe { head.deref() }
            .next
            .load(Ordering::Acquire, guard)
            .is_null()
    }

    /// Number of queued values
    ///
    /// Exact when quiescent, approximate under concurrent use.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed).max(0) as usize
    }
}

impl<T> Default for MsQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for MsQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MsQueue")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl<T> Drop for MsQueue<T> {
    fn drop(&mut self) {
        // Safety: `&mut self` means no other thread can reach the nodes. The
        // sentinel's value is uninitialized; every later node still owns one.
        unsafe {
            let guard = epoch::unprotected();
            let sentinel = self.head.load(Ordering::Relaxed, guard);
            let mut current = sentinel.deref().next.load(Ordering::Relaxed, guard);
            drop(sentinel.into_owned());

            while !current.is_null() {
                let mut node = current.into_owned();
                current = node.next.load(Ordering::Relaxed, guard);
                node.value.assume_init_drop();
            }
        }
    }
}

impl<T> MetricsCollector for MsQueue<T> {
    fn metrics(&self) -> ContentionMetrics {
        self.metrics.snapshot()
    }

    fn reset_metrics(&self) {
        self.metrics.reset();
    }

    fn set_metrics_enabled(&self, enabled: bool) {
        self.metrics.set_enabled(enabled);
    }

    fn is_metrics_enabled(&self) -> bool {
        self.metrics.is_enabled()
    }
}
