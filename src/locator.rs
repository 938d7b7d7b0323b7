//! Value locators: where a value lives in the external log.

use serde::{Deserialize, Serialize};

/// Describes where a value lives in the external append-only log.
///
/// The index stores locators by value and never dereferences them. The
/// caller appends a value to a segment first, inserts the locator it
/// obtained, and reads the value back through its own log reader after a
/// successful lookup. A locator returned by a lookup is a snapshot: a
/// later overwrite or delete of the key invalidates it without notice.
///
/// Locators carry serde derives so an embedding store can snapshot an
/// index to disk and rebuild it without replaying the whole log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueLocator {
    /// Identifier of the log segment holding the value.
    pub segment_id: u32,
    /// Length of the stored value in bytes.
    pub length: u32,
    /// Byte offset of the value within its segment.
    pub offset: u64,
    /// Write timestamp recorded when the value was appended.
    pub timestamp: i64,
}

impl ValueLocator {
    /// Creates a locator.
    pub fn new(segment_id: u32, length: u32, offset: u64, timestamp: i64) -> Self {
        Self { segment_id, length, offset, timestamp }
    }
}
