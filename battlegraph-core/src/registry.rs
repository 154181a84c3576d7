/// Item registry: the append-only universe of comparable items.
///
/// Callers hand in their own item values (file paths, names, handles).
/// The registry assigns each one a stable `0..N` index that the graph uses
/// internally. Items are never removed.
use std::collections::HashMap;
use std::hash::Hash;

use crate::error::RegistryError;

#[derive(Debug, Clone)]
pub struct ItemRegistry<T> {
    items: Vec<T>,
    item_to_idx: HashMap<T, usize>,
}

impl<T: Eq + Hash + Clone> ItemRegistry<T> {
    pub fn new() -> Self {
        ItemRegistry {
            items: Vec::new(),
            item_to_idx: HashMap::new(),
        }
    }

    /// Build a registry from a list of items. Indices follow input order.
    pub fn from_items(items: impl IntoIterator<Item = T>) -> Result<Self, RegistryError> {
        let mut registry = ItemRegistry::new();
        for (index, item) in items.into_iter().enumerate() {
            if registry.item_to_idx.contains_key(&item) {
                return Err(RegistryError::DuplicateItem { index });
            }
            registry.register(item);
        }
        Ok(registry)
    }

    /// Register an item and return its index. Registering a known item
    /// returns the existing index.
    pub fn register(&mut self, item: T) -> usize {
        if let Some(&idx) = self.item_to_idx.get(&item) {
            return idx;
        }
        let idx = self.items.len();
        self.item_to_idx.insert(item.clone(), idx);
        self.items.push(item);
        idx
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.item_to_idx.get(item).copied()
    }

    pub fn get(&self, idx: usize) -> Option<&T> {
        self.items.get(idx)
    }

    pub fn contains(&self, item: &T) -> bool {
        self.item_to_idx.contains_key(item)
    }
}

impl<T: Eq + Hash + Clone> Default for ItemRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
