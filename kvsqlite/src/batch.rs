//! Ordered set of pending writes applied atomically by [`Db::write`].
//!
//! [`Db::write`]: crate::Db::write

use std::slice;

/// One queued operation.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOp<K, V> {
    /// Insert or replace `key` with `value`.
    Put {
        /// Key to write.
        key: K,
        /// Value to store.
        value: V,
    },
    /// Remove `key` if present.
    Delete {
        /// Key to remove.
        key: K,
    },
}

/// A sequence of puts and deletes submitted as one transaction.
///
/// Operations are replayed in insertion order, so the last operation on a
/// key decides its final state. [`Db::write`](crate::Db::write) only reads
/// the batch; call [`clear`](Self::clear) to reuse it.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteBatch<K, V> {
    ops: Vec<BatchOp<K, V>>,
}

impl<K, V> WriteBatch<K, V> {
    /// Creates an empty batch.
    #[must_use]
    pub const fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Queues a put of `value` under `key`.
    pub fn put(&mut self, key: impl Into<K>, value: impl Into<V>) {
        self.ops.push(BatchOp::Put {
            key: key.into(),
            value: value.into(),
        });
    }

    /// Queues a delete of `key`.
    pub fn del(&mut self, key: impl Into<K>) {
        self.ops.push(BatchOp::Delete { key: key.into() });
    }

    /// Drops all queued operations.
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Number of queued operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns `true` if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Iterates over the queued operations in replay order.
    pub fn iter(&self) -> slice::Iter<'_, BatchOp<K, V>> {
        self.ops.iter()
    }
}

impl<K, V> Default for WriteBatch<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, K, V> IntoIterator for &'a WriteBatch<K, V> {
    type Item = &'a BatchOp<K, V>;
    type IntoIter = slice::Iter<'a, BatchOp<K, V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order() {
        let mut batch = WriteBatch::<String, String>::new();
        batch.put("key1", "val1");
        batch.del("key3");
        batch.put("key2", "val2");

        let ops: Vec<_> = batch.iter().cloned().collect();
        assert_eq!(
            ops,
            vec![
                BatchOp::Put {
                    key: "key1".to_string(),
                    value: "val1".to_string()
                },
                BatchOp::Delete {
                    key: "key3".to_string()
                },
                BatchOp::Put {
                    key: "key2".to_string(),
                    value: "val2".to_string()
                },
            ]
        );
    }

    #[test]
    fn clear_empties_the_batch() {
        let mut batch = WriteBatch::<i32, i32>::default();
        assert!(batch.is_empty());
        batch.put(1, 2);
        batch.del(1);
        assert_eq!(batch.len(), 2);
        batch.clear();
        assert!(batch.is_empty());
        assert_eq!((&batch).into_iter().count(), 0);
    }

    #[test]
    fn byte_keys_accept_slices() {
        let mut batch = WriteBatch::<Vec<u8>, Vec<u8>>::new();
        batch.put(&b"\x00k"[..], vec![1, 2, 3]);
        batch.del(&b"\x00k"[..]);
        assert_eq!(batch.len(), 2);
    }
}
