//! Configuration options for the caskdir index.

use crate::error::{Error, Result};

/// Configuration options for a hash index.
#[derive(Debug, Clone)]
pub struct Options {
    /// Capacity of the first bucket array allocation, rounded up to a
    /// power of two.
    /// Default: 4
    pub initial_capacity: usize,

    /// Load-factor ratio above which an expansion begins. The trigger
    /// fires when `entries / capacity` (integer division) exceeds this
    /// value, so the default allows an average chain length of five
    /// before the table grows.
    /// Default: 5
    pub resize_ratio: usize,

    /// Number of buckets migrated per piggybacked rehash step. Every
    /// lookup and mutation pays for this much migration while a rehash
    /// is in progress.
    /// Default: 1
    pub rehash_batch: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            initial_capacity: 4,
            resize_ratio: 5,
            rehash_batch: 1,
        }
    }
}

impl Options {
    /// Creates a new Options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial bucket array capacity.
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Sets the load-factor ratio that triggers expansion.
    pub fn resize_ratio(mut self, ratio: usize) -> Self {
        self.resize_ratio = ratio;
        self
    }

    /// Sets the number of buckets migrated per rehash step.
    pub fn rehash_batch(mut self, batch: usize) -> Self {
        self.rehash_batch = batch;
        self
    }

    /// Validates the options and returns an error if any are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.initial_capacity == 0 {
            return Err(Error::config("initial_capacity must be > 0"));
        }
        if self.resize_ratio == 0 {
            return Err(Error::config("resize_ratio must be > 0"));
        }
        if self.rehash_batch == 0 {
            return Err(Error::config("rehash_batch must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = Options::default();
        assert_eq!(opts.initial_capacity, 4);
        assert_eq!(opts.resize_ratio, 5);
        assert_eq!(opts.rehash_batch, 1);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_options_builder() {
        let opts = Options::new().initial_capacity(16).resize_ratio(2).rehash_batch(8);

        assert_eq!(opts.initial_capacity, 16);
        assert_eq!(opts.resize_ratio, 2);
        assert_eq!(opts.rehash_batch, 8);
    }

    #[test]
    fn test_options_validation() {
        let mut opts = Options::default();
        assert!(opts.validate().is_ok());

        opts.initial_capacity = 0;
        assert!(opts.validate().is_err());

        opts.initial_capacity = 4;
        opts.resize_ratio = 0;
        assert!(opts.validate().is_err());

        opts.resize_ratio = 5;
        opts.rehash_batch = 0;
        assert!(opts.validate().is_err());
    }
}
