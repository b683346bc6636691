//! Generation-checked memo tables.
//!
//! Every table remembers the store generation its entries were computed in.
//! A read or write under a different generation clears the table first, so an
//! entry computed before a mutation can never be returned after it.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::model::Node;

struct MemoState<K, V> {
    generation: u64,
    entries: HashMap<K, V>,
}

/// One memoized function: argument key to result, valid for one generation.
pub struct MemoTable<K, V> {
    state: RwLock<MemoState<K, V>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K: Eq + Hash, V: Clone> MemoTable<K, V> {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoState {
                generation: 0,
                entries: HashMap::new(),
            }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Cached value for `key`, computing and storing it on a miss. The lock is
    /// not held while `compute` runs, so `compute` may consult other tables.
    pub fn get_or_compute(&self, generation: u64, key: K, compute: impl FnOnce() -> V) -> V {
        {
            let state = self.state.read();
            if state.generation == generation {
                if let Some(value) = state.entries.get(&key) {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return value.clone();
                }
            }
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = compute();
        let mut state = self.state.write();
        if state.generation != generation {
            state.entries.clear();
            state.generation = generation;
        }
        state.entries.insert(key, value.clone());
        value
    }

    pub fn clear(&self) {
        self.state.write().entries.clear();
    }

    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn stats(&self) -> TableStats {
        TableStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl<K: Eq + Hash, V: Clone> Default for MemoTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Reverse `rdfs:subClassOf` edges: class id to its direct subclasses.
pub type SubClassIndex = HashMap<String, Vec<String>>;

/// The memo tables owned by a store.
#[derive(Default)]
pub struct QueryMemo {
    pub(crate) all_nodes: MemoTable<(), Arc<[Node]>>,
    pub(crate) sub_class_index: MemoTable<(), Arc<SubClassIndex>>,
    pub(crate) super_classes: MemoTable<String, Arc<[String]>>,
    pub(crate) sub_classes: MemoTable<String, Arc<[String]>>,
}

impl QueryMemo {
    pub fn clear(&self) {
        self.all_nodes.clear();
        self.sub_class_index.clear();
        self.super_classes.clear();
        self.sub_classes.clear();
    }

    pub fn stats(&self, generation: u64) -> CacheStats {
        CacheStats {
            generation,
            all_nodes: self.all_nodes.stats(),
            sub_class_index: self.sub_class_index.stats(),
            super_classes: self.super_classes.stats(),
            sub_classes: self.sub_classes.stats(),
        }
    }
}

/// Counters for one memo table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Snapshot of the memo tables of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub generation: u64,
    pub all_nodes: TableStats,
    pub sub_class_index: TableStats,
    pub super_classes: TableStats,
    pub sub_classes: TableStats,
}
