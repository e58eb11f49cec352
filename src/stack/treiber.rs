//! Treiber Stack
//!
//! A lock-free LIFO built on a single atomic `top` pointer. Push links a new
//! node above the observed top and CASes `top` to it; pop CASes `top` from the
//! observed node to its successor. Each successful CAS is the operation's
//! linearization point.
//!
//! Popped nodes are retired through `crossbeam-epoch`: a thread that loaded
//! `top` before the unlink may still read the node's `next` field, so the node
//! is only freed once every such thread has unpinned.

use crate::metrics::{AtomicMetrics, ContentionMetrics, MetricsCollector};
use core::fmt;
use core::mem::ManuallyDrop;
use core::ptr;
use core::sync::atomic::{AtomicIsize, Ordering};
use crossbeam_epoch::{self as epoch, Atomic, Owned};
use crossbeam_utils::{Backoff, CachePadded};

struct Node<T> {
    // Moved out by the popping thread before the node is retired.
    value: ManuallyDrop<T>,
    next: Atomic<Node<T>>,
}

/// A lock-free stack using Treiber's algorithm
///
/// Both operations are lock-free: a CAS only fails because another thread's
/// CAS succeeded, so some thread always makes progress. `pop` on an empty
/// stack returns `None` immediately and never waits.
///
/// # Examples
///
/// ```rust
/// use atomkit::stack::TreiberStack;
///
/// let stack = TreiberStack::new();
///
/// stack.push(1);
/// stack.push(2);
/// stack.push(3);
///
/// assert_eq!(stack.pop(), Some(3));
/// assert_eq!(stack.pop(), Some(2));
/// assert_eq!(stack.pop(), Some(1));
/// assert_eq!(stack.pop(), None);
/// ```
pub struct TreiberStack<T> {
    top: CachePadded<Atomic<Node<T>>>,
    // Signed: a pop can land before the matching push has counted itself.
    len: AtomicIsize,
    metrics: AtomicMetrics,
}

// Values are only ever touched by the thread that pushed or popped them.
unsafe impl<T: Send> Send for TreiberStack<T> {}
unsafe impl<T: Send> Sync for TreiberStack<T> {}

impl<T> TreiberStack<T> {
    /// Create an empty stack
    ///
    /// # Examples
    ///
    /// ```rust
    /// use atomkit::stack::TreiberStack;
    ///
    /// let stack: TreiberStack<i32> = TreiberStack::new();
    /// assert!(stack.is_empty());
    /// ```
    pub fn new() -> Self {
        Self {
            top: CachePadded::new(Atomic::null()),
            len: AtomicIsize::new(0),
            metrics: AtomicMetrics::default(),
        }
    }

    /// Push a value onto the stack
    ///
    /// Retries until its CAS on `top` succeeds, backing off between attempts.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use atomkit::stack::TreiberStack;
    ///
    /// let stack = TreiberStack::new();
    /// stack.push(42);
    /// assert_eq!(stack.len(), 1);
    /// ```
    pub fn push(&self, value: T) {
        let timer = self.metrics.start();
        let backoff = Backoff::new();
        let guard = &epoch::pin();

        let mut node = Owned::new(Node {
            value: ManuallyDrop::new(value),
            next: Atomic::null(),
        });

        loop {
            let top = self.top.load(Ordering::Acquire, guard);
            node.next.store(top, Ordering::Relaxed);

            match self
                .top
                .compare_exchange(top, node, Ordering::Release, Ordering::Relaxed, guard)
            {
                Ok(_) => {
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

    /// Pop the most recently pushed value
    ///
    /// Returns `None` without blocking when the stack is observed empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use atomkit::stack::TreiberStack;
    ///
    /// let stack = TreiberStack::new();
    /// stack.push(42);
    ///
    /// assert_eq!(stack.pop(), Some(42));
    /// assert_eq!(stack.pop(), None);
    /// ```
    pub fn pop(&self) -> Option<T> {
        let timer = self.metrics.start();
        let backoff = Backoff::new();
        let guard = &epoch::pin();

        loop {
            let top = self.top.load(Ordering::Acquire, guard);

            // Safety: the guard keeps `top` alive even if another thread pops it.
            let Some(node) = (unsafe { top.as_ref() }) else {
                self.metrics.record_empty(timer);
                return None;
            };
            let next = node.next.load(Ordering::Relaxed, guard);

            if self
                .top
                .compare_exchange(top, next, Ordering::Acquire, Ordering::Relaxed, guard)
                .is_ok()
            {
                self.len.fetch_sub(1, Ordering::Relaxed);

                // Safety: winning the CAS makes this thread the node's only owner;
                // the value is moved out exactly once and the node is freed
                // without dropping it again.
                let value = unsafe {
                    let value = ManuallyDrop::into_inner(ptr::read(&node.value));
                    guard.defer_destroy(top);
                    value
                };

                self.metrics.record_success(timer);
                return Some(value);
            }

            self.metrics.record_retry();
            backoff.spin();
        }
    }

    /// Whether the stack was empty at the moment of the check
    ///
    /// # Examples
    ///
    /// ```rust
    /// use atomkit::stack::TreiberStack;
    ///
    /// let stack = TreiberStack::new();
    /// assert!(stack.is_empty());
    ///
    /// stack.push(42);
    /// assert!(!stack.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        let guard = &epoch::pin();
        self.top.load(Ordering::Acquire, guard).is_null()
    }

    /// Number of values on the stack
    ///
    /// Maintained by a counter that trails each successful CAS, so it is exact
    /// when the stack is quiescent and approximate under concurrent use.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed).max(0) as usize
    }

    /// Pop up to `max_count` values, most recent first
    ///
    /// Stops early if the stack runs empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use atomkit::stack::TreiberStack;
    ///
    /// let stack = TreiberStack::new();
    /// stack.push_batch([1, 2, 3]);
    ///
    /// assert_eq!(stack.pop_batch(2), vec![3, 2]);
    /// assert_eq!(stack.pop_batch(5), vec![1]);
    /// ```
    pub fn pop_batch(&self, max_count: usize) -> Vec<T> {
        let mut result = Vec::new();

        for _ in 0..max_count {
            match self.pop() {
                Some(value) => result.push(value),
                None => break,
            }
        }

        result
    }

    /// Push every value of `values` in iteration order
    ///
    /// The last value ends up on top. Each push is linearized on its own, so
    /// concurrent pushes may interleave with the batch.
    pub fn push_batch<I>(&self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        for value in values {
            self.push(value);
        }
    }
}

impl<T> Default for TreiberStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TreiberStack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreiberStack")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl<T> Drop for TreiberStack<T> {
    fn drop(&mut self) {
        // Safety: `&mut self` means no other thread can reach the nodes.
        unsafe {
            let guard = epoch::unprotected();
            let mut current = self.top.load(Ordering::Relaxed, guard);

            while !current.is_null() {
                let mut node = current.into_owned();
                current = node.next.load(Ordering::Relaxed, guard);
                ManuallyDrop::drop(&mut node.value);
            }
        }
    }
}

impl<T> MetricsCollector for TreiberStack<T> {
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
