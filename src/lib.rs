//! # atomkit
//!
//! Lock-free shared-memory containers built on compare-and-swap retry loops.
//!
//! ## Containers
//!
//! - **Stack**: [`TreiberStack`], a LIFO with a single atomic top pointer
//! - **Queue**: [`MsQueue`], a Michael-Scott FIFO with a sentinel node
//! - **Map**: [`ConcurrentHashMap`], linear-probing slots with tombstones and a
//!   coordinated grow
//!
//! Every container follows the same discipline: atomically load, compute,
//! CAS, retry on conflict. Unlinked nodes and replaced values are reclaimed
//! through `crossbeam-epoch`, so no thread can observe freed memory.
//!
//! ## Quick Start
//!
//! ```rust
//! use atomkit::{ConcurrentHashMap, MsQueue, TreiberStack};
//!
//! let stack = TreiberStack::new();
//! stack.push(1);
//! assert_eq!(stack.pop(), Some(1));
//!
//! let queue = MsQueue::new();
//! queue.enqueue("job");
//! assert_eq!(queue.dequeue(), Some("job"));
//!
//! let map = ConcurrentHashMap::with_capacity(4);
//! map.set(1, "a").unwrap();
//! assert_eq!(map.get(&1), Some("a"));
//! ```
//!
//! ## Blocking
//!
//! None of the containers block. `pop`, `dequeue` and `get` return `None`
//! instead of waiting; producer/consumer blocking belongs to the caller.

#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

pub mod map;
pub mod metrics;
pub mod queue;
pub mod stack;

pub use crate::map::{ConcurrentHashMap, MapConfig};
pub use crate::metrics::{ContentionMetrics, MetricsCollector};
pub use crate::queue::MsQueue;
pub use crate::stack::TreiberStack;

/// Errors reported by atomkit containers
///
/// Contention never surfaces as an error; failed CAS attempts are retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A map was configured with zero slots
    #[error("capacity must be greater than zero")]
    ZeroCapacity,
    /// Load factor outside `(0, 1]`
    #[error("load factor {0} is outside (0, 1]")]
    InvalidLoadFactor(f64),
    /// Doubling the slot table would overflow `usize`
    #[error("cannot grow beyond capacity {current}")]
    CapacityOverflow {
        /// Capacity at the time of the failed grow
        current: usize,
    },
    /// The allocator refused a new slot table
    #[error("failed to allocate a table of {requested} slots")]
    AllocationFailed {
        /// Number of slots requested
        requested: usize,
    },
}

/// Result type for atomkit operations
pub type Result<T> = core::result::Result<T, Error>;
