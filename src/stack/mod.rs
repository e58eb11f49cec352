//! Stack Module
//!
//! Lock-free LIFO containers.

pub mod treiber;

pub use treiber::TreiberStack;

#[cfg(test)]
mod proptests;
