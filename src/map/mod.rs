//! Map implementations
//!
//! ## Available Maps
//!
//! - [`ConcurrentHashMap`]: open-addressing map with lock-free get/set/delete
//!   and a coordinated, exclusive grow
//!
//! ## Choosing a Configuration
//!
//! - Size the map up front with [`MapConfig::with_initial_capacity`]; growth
//!   rehashes every live entry under an exclusive lock
//! - Deleted keys keep their slot until the next grow, so delete-heavy
//!   workloads with churning keys grow more often than the live count suggests
//! - Plug in any [`BuildHasher`](core::hash::BuildHasher); the default is
//!   `fxhash`

pub mod concurrent;
pub mod config;

pub use self::concurrent::ConcurrentHashMap;
pub use self::config::MapConfig;


#[cfg(test)]
mod proptests;
