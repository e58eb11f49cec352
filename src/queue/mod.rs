//! Queue implementations
//!
//! ## Available Queues
//!
//! - [`MsQueue`]: unbounded multi-producer, multi-consumer FIFO (Michael-Scott)
//!
//! ## Design
//!
//! - **Lock-free**: enqueue and dequeue only use atomic loads and CAS
//! - **Helping**: a lagging `tail` is advanced by whichever thread notices it
//! - **Reclamation**: retired sentinels go through `crossbeam-epoch`
//! - **Non-blocking**: `dequeue` on an empty queue returns `None`
//!
//! ## Examples
//!
//! ```rust
//! use atomkit::queue::MsQueue;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let queue = Arc::new(MsQueue::new());
//!
//! let producer = thread::spawn({
//!     let queue = Arc::clone(&queue);
//!     move || {
//!         for i in 0..100 {
//!             queue.enqueue(i);
//!         }
//!     }
//! });
//! producer.join().unwrap();
//!
//! let drained: Vec<i32> = std::iter::from_fn(|| queue.dequeue()).collect();
//! assert_eq!(drained, (0..100).collect::<Vec<_>>());
//! ```

pub mod ms_queue;

pub use ms_queue::MsQueue;

#[cfg(test)]
mod tests;

#[cfg(test)]
mod proptests;
