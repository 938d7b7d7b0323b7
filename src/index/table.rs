//! Bucket tables and chain nodes.
//!
//! Each bucket head is the sole entry point into a singly linked chain
//! of boxed nodes. A node exclusively owns its key, its locator and its
//! successor; nodes are never shared between chains, so every node is
//! released exactly once when its chain (or table) is dropped.

use crate::error::Result;
use crate::key::BinaryKey;
use crate::locator::ValueLocator;

/// A bucket head: either empty or the head of a chain.
pub(crate) type Link = Option<Box<Node>>;

/// One entry in a bucket chain.
#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) key: BinaryKey,
    pub(crate) locator: ValueLocator,
    pub(crate) next: Link,
}

/// One hash table: an array of bucket heads plus a live-entry count.
///
/// Capacity is the bucket array length and is always a power of two once
/// allocated; a default table has capacity zero and stands for the
/// "unallocated" state.
#[derive(Debug, Default)]
pub(crate) struct Table {
    pub(crate) buckets: Vec<Link>,
    pub(crate) used: usize,
}

impl Table {
    /// Allocates a table with `capacity` empty buckets.
    ///
    /// The bucket array reservation is fallible and surfaces
    /// out-of-memory as an error instead of aborting the process.
    pub(crate) fn with_capacity(capacity: usize) -> Result<Self> {
        debug_assert!(capacity.is_power_of_two());
        let mut buckets = Vec::new();
        buckets.try_reserve_exact(capacity)?;
        buckets.resize_with(capacity, || None);
        Ok(Self { buckets, used: 0 })
    }

    /// Returns the bucket array length.
    pub(crate) fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns `true` once the bucket array has been allocated.
    pub(crate) fn is_allocated(&self) -> bool {
        !self.buckets.is_empty()
    }

    /// Maps a key hash to a bucket index. Valid because capacity is a
    /// power of two.
    pub(crate) fn bucket_index(&self, hash: u32) -> usize {
        hash as usize & (self.capacity() - 1)
    }

    /// Pushes a node onto the head of the bucket at `index` and counts
    /// it as live.
    pub(crate) fn push_front(&mut self, index: usize, mut node: Box<Node>) {
        node.next = self.buckets[index].take();
        self.buckets[index] = Some(node);
        self.used += 1;
    }
}

impl Drop for Table {
    fn drop(&mut self) {
        // Chains are torn down iteratively; the default recursive Box
        // drop would overflow the stack on a pathologically long chain.
        for bucket in &mut self.buckets {
            let mut chain = bucket.take();
            while let Some(mut node) = chain {
                chain = node.next.take();
            }
        }
    }
}

/// Walks a chain looking for `key`.
pub(crate) fn find<'a>(mut link: &'a Link, key: &[u8]) -> Option<&'a Node> {
    while let Some(node) = link.as_deref() {
        if node.key.as_slice() == key {
            return Some(node);
        }
        link = &node.next;
    }
    None
}

/// Walks a chain looking for `key`, yielding a mutable node.
pub(crate) fn find_mut<'a>(mut link: &'a mut Link, key: &[u8]) -> Option<&'a mut Node> {
    while let Some(node) = link {
        if node.key.as_slice() == key {
            return Some(&mut **node);
        }
        link = &mut node.next;
    }
    None
}

/// Unlinks the first node in the chain whose key matches `key` and
/// returns it, splicing its successor into its place. The chain is left
/// untouched when the key is absent.
pub(crate) fn unlink(mut link: &mut Link, key: &[u8]) -> Option<Box<Node>> {
    // Take/put-back walk: each node is lifted out of its link, either
    // spliced over on a match or restored before stepping to its
    // successor. A miss restores every node, so the chain is intact.
    while let Some(mut node) = link.take() {
        if node.key.as_slice() == key {
            *link = node.next.take();
            return Some(node);
        }
        *link = Some(node);
        link = &mut link.as_mut()?.next;
    }
    None
}
