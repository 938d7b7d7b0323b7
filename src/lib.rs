//! # caskdir - In-Memory Key Directory for Log-Structured Stores
//!
//! caskdir is the in-memory key index of a bitcask-style key-value
//! store: it maps binary-safe keys to [`ValueLocator`] records that say
//! where the current value lives in an external append-only log
//! (segment id, value length, offset, timestamp). The index never reads
//! or writes the log itself; the embedding store appends a value first,
//! then records the locator it obtained here, and resolves lookups
//! through its own log reader.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │                    KeyDir                      │
//! │            (Mutex-guarded handle)              │
//! └───────────────────────┬────────────────────────┘
//!                         │
//! ┌───────────────────────▼────────────────────────┐
//! │                   HashIndex                    │
//! │   primary table ──── rehash cursor ──── incoming│
//! │    (chained buckets)   (amortized)    (larger)  │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! The core is a two-table hash map with incremental rehashing: growing
//! under load never pauses to rehash the whole table at once. Instead,
//! every operation migrates a bounded number of buckets from the old
//! table to the new one, so migration cost is amortized across normal
//! traffic.
//!
//! ## Example Usage
//!
//! ```rust
//! use caskdir::{KeyDir, ValueLocator};
//!
//! # fn main() -> Result<(), caskdir::Error> {
//! let keydir = KeyDir::new();
//!
//! // The caller appended "hello" to segment 0 at offset 42 already.
//! keydir.put(b"greeting", ValueLocator::new(0, 5, 42, 1_700_000_000))?;
//!
//! if let Some(locator) = keydir.get(b"greeting") {
//!     println!("value lives in segment {} at {}", locator.segment_id, locator.offset);
//! }
//!
//! keydir.remove(b"greeting")?;
//! keydir.close();
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Module declarations
pub mod config;
pub mod error;
pub mod index;
pub mod key;
pub mod locator;

// Re-exports
pub use config::Options;
pub use error::{Error, Result};
pub use index::HashIndex;
pub use key::BinaryKey;
pub use locator::ValueLocator;

use log::{debug, trace};
use parking_lot::Mutex;

/// The lock-guarded key directory handle.
///
/// Wraps a [`HashIndex`] in a single mutex so the whole index is held
/// for the duration of each public call. The index's operations are not
/// individually reentrant-safe and even lookups drive bucket migration,
/// which is why a plain mutex guards reads too.
///
/// # Thread Safety
///
/// `KeyDir` can be shared across threads with `Arc<KeyDir>`.
/// Single-threaded embedders that want to drive migration explicitly can
/// use [`HashIndex`] directly instead.
pub struct KeyDir {
    inner: Mutex<HashIndex>,
}

impl KeyDir {
    /// Creates an empty key directory with default options.
    pub fn new() -> Self {
        Self { inner: Mutex::new(HashIndex::new()) }
    }

    /// Creates an empty key directory with the given options.
    ///
    /// # Errors
    ///
    /// Returns an error if the options fail validation.
    pub fn with_options(options: Options) -> Result<Self> {
        Ok(Self { inner: Mutex::new(HashIndex::with_options(options)?) })
    }

    /// Records that the value for `key` now lives at `locator`,
    /// overwriting any previous locator for the key.
    ///
    /// # Errors
    ///
    /// Returns an error if the index needs to grow and the new bucket
    /// array cannot be allocated.
    pub fn put(&self, key: &[u8], locator: ValueLocator) -> Result<()> {
        trace!(
            "put {:?} -> segment {} offset {}",
            String::from_utf8_lossy(key),
            locator.segment_id,
            locator.offset
        );
        self.inner.lock().put(key, locator)
    }

    /// Looks up the locator stored for `key`.
    pub fn get(&self, key: &[u8]) -> Option<ValueLocator> {
        trace!("get {:?}", String::from_utf8_lossy(key));
        self.inner.lock().get(key)
    }

    /// Removes the entry for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyIndex`] if nothing was ever inserted, or
    /// [`Error::KeyNotFound`] if the key is absent.
    pub fn remove(&self, key: &[u8]) -> Result<()> {
        trace!("remove {:?}", String::from_utf8_lossy(key));
        self.inner.lock().remove(key)
    }

    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if the directory holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Closes the directory, releasing every entry and both tables.
    ///
    /// Dropping the handle has the same effect; `close` only makes the
    /// release point explicit.
    pub fn close(self) {
        let entries = self.inner.lock().len();
        debug!("key directory closed, {} entries released", entries);
    }
}

impl Default for KeyDir {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn locator(seed: u32) -> ValueLocator {
        ValueLocator::new(seed, seed * 2, u64::from(seed) * 7, i64::from(seed))
    }

    #[test]
    fn test_keydir_put_and_get() {
        let keydir = KeyDir::new();

        keydir.put(b"key1", locator(1)).unwrap();
        assert_eq!(keydir.get(b"key1"), Some(locator(1)));
        assert_eq!(keydir.get(b"key2"), None);
        assert_eq!(keydir.len(), 1);
        assert!(!keydir.is_empty());
    }

    #[test]
    fn test_keydir_overwrite() {
        let keydir = KeyDir::new();

        keydir.put(b"key", locator(1)).unwrap();
        keydir.put(b"key", locator(2)).unwrap();

        assert_eq!(keydir.get(b"key"), Some(locator(2)));
        assert_eq!(keydir.len(), 1);
    }

    #[test]
    fn test_keydir_remove() {
        let keydir = KeyDir::new();

        keydir.put(b"key", locator(1)).unwrap();
        keydir.remove(b"key").unwrap();
        assert_eq!(keydir.get(b"key"), None);
        assert!(keydir.is_empty());

        assert!(matches!(keydir.remove(b"key"), Err(Error::KeyNotFound)));
    }

    #[test]
    fn test_keydir_remove_before_any_insert() {
        let keydir = KeyDir::new();
        assert!(matches!(keydir.remove(b"key"), Err(Error::EmptyIndex)));
    }

    #[test]
    fn test_keydir_close_empty() {
        let keydir = KeyDir::new();
        keydir.close();
    }

    #[test]
    fn test_keydir_close_mid_growth() {
        // A resize ratio of 1 keeps the directory rehashing under load,
        // so close exercises the two-table release path.
        let options = Options::new().resize_ratio(1);
        let keydir = KeyDir::with_options(options).unwrap();

        for i in 0..500u32 {
            keydir.put(format!("key{i}").as_bytes(), locator(i)).unwrap();
        }
        assert_eq!(keydir.len(), 500);
        keydir.close();
    }

    #[test]
    fn test_keydir_with_invalid_options() {
        assert!(KeyDir::with_options(Options::new().rehash_batch(0)).is_err());
    }

    #[test]
    fn test_keydir_concurrent_access() {
        let keydir = Arc::new(KeyDir::new());
        let mut handles = vec![];

        for thread_id in 0..8u32 {
            let keydir = Arc::clone(&keydir);
            let handle = thread::spawn(move || {
                for i in 0..100u32 {
                    let key = format!("thread{}_key{}", thread_id, i);
                    keydir.put(key.as_bytes(), locator(thread_id * 1000 + i)).unwrap();
                }
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(keydir.len(), 800);
        for thread_id in 0..8u32 {
            for i in 0..100u32 {
                let key = format!("thread{}_key{}", thread_id, i);
                assert_eq!(keydir.get(key.as_bytes()), Some(locator(thread_id * 1000 + i)));
            }
        }
    }
}
