//! Map configuration

use crate::{Error, Result};

/// Slots allocated by [`MapConfig::default`]
pub const DEFAULT_CAPACITY: usize = 32;

/// Fraction of occupied slots that triggers a grow
pub const DEFAULT_LOAD_FACTOR: f64 = 0.5;

/// Sizing parameters for a [`ConcurrentHashMap`](super::ConcurrentHashMap)
///
/// # Examples
///
/// ```rust
/// use atomkit::map::{ConcurrentHashMap, MapConfig};
///
/// let config = MapConfig::new()
///     .with_initial_capacity(64)
///     .with_load_factor(0.75);
/// let map: ConcurrentHashMap<u32, String> = ConcurrentHashMap::with_config(config)?;
/// assert_eq!(map.capacity(), 64);
/// # Ok::<(), atomkit::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapConfig {
    /// Number of slots in the first table
    pub initial_capacity: usize,
    /// Grow once `size > capacity * load_factor`
    pub load_factor: f64,
}

impl MapConfig {
    /// Defaults: 32 slots, grow past 50% occupancy
    pub const fn new() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }

    /// Set the initial slot count
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Set the occupancy fraction that triggers growth
    pub fn with_load_factor(mut self, load_factor: f64) -> Self {
        self.load_factor = load_factor;
        self
    }

    /// Reject configurations no map can be built from
    pub fn validate(&self) -> Result<()> {
        if self.initial_capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        if !self.load_factor.is_finite() || self.load_factor <= 0.0 || self.load_factor > 1.0 {
            return Err(Error::InvalidLoadFactor(self.load_factor));
        }
        Ok(())
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = MapConfig::default();
        assert_eq!(config.initial_capacity, 32);
        assert_eq!(config.load_factor, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = MapConfig::new().with_initial_capacity(0);
        assert_eq!(config.validate(), Err(Error::ZeroCapacity));
    }

    #[test]
    fn test_load_factor_bounds() {
        for bad in [0.0, -0.5, 1.01, f64::INFINITY] {
            let config = MapConfig::new().with_load_factor(bad);
            assert_eq!(config.validate(), Err(Error::InvalidLoadFactor(bad)));
        }
        assert!(MapConfig::new().with_load_factor(f64::NAN).validate().is_err());
        assert!(MapConfig::new().with_load_factor(1.0).validate().is_ok());
    }
}
