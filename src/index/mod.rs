//! The incremental-rehashing hash index.
//!
//! ## Design
//!
//! The index keeps two bucket tables. All traffic normally goes to the
//! `primary` table; when the load factor crosses the configured ratio a
//! larger `incoming` table is allocated and a cursor starts walking the
//! primary buckets. Every subsequent lookup or mutation first migrates a
//! bounded number of buckets from `primary` to `incoming`, so the cost
//! of growing is spread across normal traffic instead of a single pause.
//! Once the last entry has moved, `incoming` becomes the new `primary`
//! and the cursor is cleared.
//!
//! While a rehash is in progress every key must be looked up in both
//! tables, and new entries are inserted into `incoming` only, so the
//! migration never revisits a key.
//!
//! ## Thread Safety
//!
//! The index is single-threaded by design: "incremental" means the
//! migration is amortized across calls on one logical thread of control,
//! not moved to a background thread. Lookups drive migration too, which
//! is why even [`HashIndex::get`] takes `&mut self`. Concurrent callers
//! should use the [`KeyDir`](crate::KeyDir) wrapper, which guards the
//! whole index with one lock per public call.

mod hash;
mod table;

use crate::config::Options;
use crate::error::{Error, Result};
use crate::key::BinaryKey;
use crate::locator::ValueLocator;
use hash::fnv1a;
use log::debug;
use table::{Node, Table};

/// Largest bucket-array capacity the index will ever request; capacity
/// computations saturate here instead of overflowing.
const MAX_CAPACITY: usize = 1 << (usize::BITS - 1);

/// Smallest power of two that is >= `min_capacity` and >= `n`,
/// saturating at [`MAX_CAPACITY`].
fn next_capacity(min_capacity: usize, n: usize) -> usize {
    let floor = min_capacity.next_power_of_two();
    n.max(floor).checked_next_power_of_two().unwrap_or(MAX_CAPACITY)
}

/// A hash table from binary keys to [`ValueLocator`]s with incremental
/// rehashing.
///
/// The index starts with no bucket array at all; the first insert
/// allocates at the configured initial capacity. Lookup, insert and
/// delete are O(1) expected, and no operation ever pauses to rehash the
/// whole table at once.
///
/// # Example
///
/// ```rust
/// use caskdir::{HashIndex, ValueLocator};
///
/// let mut index = HashIndex::new();
/// index.put(b"key", ValueLocator::new(0, 5, 120, 1_700_000_000))?;
/// let locator = index.get(b"key").expect("just inserted");
/// assert_eq!(locator.offset, 120);
/// # Ok::<(), caskdir::Error>(())
/// ```
#[derive(Debug)]
pub struct HashIndex {
    /// The table all traffic targets while no rehash is active.
    primary: Table,

    /// The larger table being filled during a rehash; unallocated
    /// otherwise.
    incoming: Table,

    /// Next `primary` bucket to migrate; `None` while no rehash is
    /// active.
    rehash_cursor: Option<usize>,

    options: Options,
}

impl HashIndex {
    /// Creates an empty index with default options.
    pub fn new() -> Self {
        Self {
            primary: Table::default(),
            incoming: Table::default(),
            rehash_cursor: None,
            options: Options::default(),
        }
    }

    /// Creates an empty index with the given options.
    ///
    /// # Errors
    ///
    /// Returns an error if the options fail validation.
    pub fn with_options(options: Options) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            primary: Table::default(),
            incoming: Table::default(),
            rehash_cursor: None,
            options,
        })
    }

    /// Returns `true` while a rehash is in progress.
    pub fn is_rehashing(&self) -> bool {
        self.rehash_cursor.is_some()
    }

    /// Returns the number of live entries across both tables.
    pub fn len(&self) -> usize {
        self.primary.used + self.incoming.used
    }

    /// Returns `true` if the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the primary table's bucket count (zero before the first
    /// insert).
    pub fn capacity(&self) -> usize {
        self.primary.capacity()
    }

    /// Begins an expansion to at least `size` buckets, or performs the
    /// very first table allocation.
    ///
    /// The requested size is rounded up to a power of two no smaller
    /// than the configured initial capacity. When `primary` is already
    /// allocated this installs the larger `incoming` table and sets the
    /// migration cursor to bucket zero; the actual entry movement is
    /// paid for incrementally by later operations.
    ///
    /// # Errors
    ///
    /// - [`Error::RehashInProgress`] if a migration is already active;
    ///   expansions never overlap.
    /// - [`Error::Allocation`] if the bucket array cannot be reserved.
    pub fn expand(&mut self, size: usize) -> Result<()> {
        if self.is_rehashing() {
            return Err(Error::RehashInProgress);
        }

        let capacity = next_capacity(self.options.initial_capacity, size);
        let table = Table::with_capacity(capacity)?;

        // First allocation: install the table directly, no migration.
        if !self.primary.is_allocated() {
            self.primary = table;
            return Ok(());
        }

        debug!(
            "expansion begins: {} entries, {} -> {} buckets",
            self.primary.used,
            self.primary.capacity(),
            capacity
        );
        self.incoming = table;
        self.rehash_cursor = Some(0);
        Ok(())
    }

    /// Evaluates the expansion trigger. Called before every insert of a
    /// new key.
    fn maybe_expand(&mut self) -> Result<()> {
        if self.is_rehashing() {
            return Ok(());
        }
        if !self.primary.is_allocated() {
            return self.expand(self.options.initial_capacity);
        }
        // Integer division: the trigger fires once the average chain
        // grows past `resize_ratio` entries.
        if self.primary.used / self.primary.capacity() > self.options.resize_ratio {
            return self.expand(self.primary.used.saturating_mul(2));
        }
        Ok(())
    }

    /// Performs up to `max_buckets` steps of incremental migration.
    ///
    /// A no-op when no rehash is active. Each step either moves one
    /// whole primary bucket chain into `incoming`, or, once every entry
    /// has migrated, promotes `incoming` to `primary` and stops early
    /// regardless of remaining budget. Every public operation calls this
    /// with the configured batch while a rehash is active, so migration
    /// progress is proportional to traffic and the worst-case pause per
    /// operation is one bucket chain.
    pub fn rehash_tick(&mut self, max_buckets: usize) {
        for _ in 0..max_buckets {
            let Some(cursor) = self.rehash_cursor else {
                return;
            };

            // All entries migrated: retire the drained primary table and
            // promote the incoming one.
            if self.primary.used == 0 {
                self.primary = std::mem::take(&mut self.incoming);
                self.rehash_cursor = None;
                debug!(
                    "rehash complete: {} entries in {} buckets",
                    self.primary.used,
                    self.primary.capacity()
                );
                return;
            }

            // used > 0 guarantees a non-empty bucket ahead of the cursor.
            let mut cursor = cursor;
            while self.primary.buckets[cursor].is_none() {
                cursor += 1;
            }

            // Move the whole chain, head-inserting into the incoming
            // buckets. Chain order may reverse; it carries no meaning.
            let mut chain = self.primary.buckets[cursor].take();
            while let Some(mut node) = chain {
                chain = node.next.take();
                let index = self.incoming.bucket_index(fnv1a(node.key.as_slice()));
                node.next = self.incoming.buckets[index].take();
                self.incoming.buckets[index] = Some(node);
                self.primary.used -= 1;
                self.incoming.used += 1;
            }
            self.rehash_cursor = Some(cursor + 1);
        }
    }

    /// Ticks the configured migration batch if a rehash is active.
    fn tick(&mut self) {
        if self.is_rehashing() {
            self.rehash_tick(self.options.rehash_batch);
        }
    }

    fn find_node(&self, hash: u32, key: &[u8]) -> Option<&Node> {
        if !self.primary.is_allocated() {
            return None;
        }
        let index = self.primary.bucket_index(hash);
        if let Some(node) = table::find(&self.primary.buckets[index], key) {
            return Some(node);
        }
        if self.is_rehashing() {
            let index = self.incoming.bucket_index(hash);
            return table::find(&self.incoming.buckets[index], key);
        }
        None
    }

    fn find_node_mut(&mut self, hash: u32, key: &[u8]) -> Option<&mut Node> {
        if !self.primary.is_allocated() {
            return None;
        }
        let index = self.primary.bucket_index(hash);
        if table::find(&self.primary.buckets[index], key).is_some() {
            return table::find_mut(&mut self.primary.buckets[index], key);
        }
        if self.is_rehashing() {
            let index = self.incoming.bucket_index(hash);
            return table::find_mut(&mut self.incoming.buckets[index], key);
        }
        None
    }

    /// Looks up the locator stored for `key`.
    ///
    /// Takes `&mut self` because lookups also drive migration while a
    /// rehash is in progress; both tables are searched in that case.
    pub fn get(&mut self, key: &[u8]) -> Option<ValueLocator> {
        if !self.primary.is_allocated() {
            return None;
        }
        self.tick();
        let hash = fnv1a(key);
        self.find_node(hash, key).map(|node| node.locator)
    }

    /// Inserts `key` with `locator`, overwriting the locator in place if
    /// the key is already present (upsert).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Allocation`] if a table the insert requires
    /// cannot be allocated; the index is unchanged in that case.
    pub fn put(&mut self, key: &[u8], locator: ValueLocator) -> Result<()> {
        self.tick();

        let hash = fnv1a(key);
        if let Some(node) = self.find_node_mut(hash, key) {
            node.locator = locator;
            return Ok(());
        }

        self.maybe_expand()?;

        // New entries go to the table being written to: the incoming
        // one while rehashing, so migration never revisits them.
        let target = if self.is_rehashing() { &mut self.incoming } else { &mut self.primary };
        let index = target.bucket_index(hash);
        let node = Box::new(Node { key: BinaryKey::copy_from(key), locator, next: None });
        target.push_front(index, node);
        Ok(())
    }

    /// Overwrites the locator of an existing entry, leaving its key and
    /// chain position untouched.
    ///
    /// Unlike [`put`](Self::put) this never inserts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if no entry with this key exists;
    /// the index is unchanged in that case.
    pub fn replace(&mut self, key: &[u8], locator: ValueLocator) -> Result<()> {
        self.tick();
        let hash = fnv1a(key);
        match self.find_node_mut(hash, key) {
            Some(node) => {
                node.locator = locator;
                Ok(())
            }
            None => Err(Error::KeyNotFound),
        }
    }

    /// Removes the entry for `key`, releasing its node and key storage.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyIndex`] if no entry was ever inserted.
    /// - [`Error::KeyNotFound`] if neither table holds the key.
    ///
    /// A failed remove leaves the index exactly as before the call.
    pub fn remove(&mut self, key: &[u8]) -> Result<()> {
        if !self.primary.is_allocated() {
            return Err(Error::EmptyIndex);
        }
        self.tick();

        let hash = fnv1a(key);
        let index = self.primary.bucket_index(hash);
        if table::unlink(&mut self.primary.buckets[index], key).is_some() {
            self.primary.used -= 1;
            return Ok(());
        }
        if self.is_rehashing() {
            let index = self.incoming.bucket_index(hash);
            if table::unlink(&mut self.incoming.buckets[index], key).is_some() {
                self.incoming.used -= 1;
                return Ok(());
            }
        }
        Err(Error::KeyNotFound)
    }
}

impl Default for HashIndex {
    fn default() -> Self {
        Self::new()
    }
}
