use alloc::vec::Vec;

use crate::key::{KeyedMap, PoolKey};
use crate::TemplateId;

/// Bounded LIFO stacks of detached content, keyed by (template, recycle key).
///
/// Reuse follows stack order: `try_acquire` always pops the most recently
/// returned entry. A return to a full stack rejects the incoming entry (the
/// caller drops it); overflow is silent, not an error.
pub(crate) struct ContentPool<C, K> {
    stacks: KeyedMap<TemplateId, KeyedMap<K, Vec<C>>>,
    total: usize,
}

impl<C, K: PoolKey> ContentPool<C, K> {
    pub(crate) fn new() -> Self {
        Self {
            stacks: KeyedMap::new(),
            total: 0,
        }
    }

    pub(crate) fn try_return(
        &mut self,
        template: TemplateId,
        key: K,
        content: C,
        cap: usize,
    ) -> bool {
        if cap == 0 {
            return false;
        }
        let stack = self
            .stacks
            .entry(template)
            .or_insert_with(KeyedMap::new)
            .entry(key)
            .or_insert_with(Vec::new);
        if stack.len() >= cap {
            return false;
        }
        stack.push(content);
        self.total += 1;
        true
    }

    pub(crate) fn try_acquire(&mut self, template: TemplateId, key: &K) -> Option<C> {
        let stack = self.stacks.get_mut(&template)?.get_mut(key)?;
        let content = stack.pop()?;
        self.total -= 1;
        Some(content)
    }

    pub(crate) fn pooled(&self, template: TemplateId, key: &K) -> usize {
        self.stacks
            .get(&template)
            .and_then(|by_key| by_key.get(key))
            .map_or(0, Vec::len)
    }

    pub(crate) fn total(&self) -> usize {
        self.total
    }

    pub(crate) fn for_each_count(&self, mut f: impl FnMut(TemplateId, &K, usize)) {
        for (template, by_key) in self.stacks.iter() {
            for (key, stack) in by_key.iter() {
                if !stack.is_empty() {
                    f(*template, key, stack.len());
                }
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.stacks.clear();
        self.total = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_is_lifo() {
        let mut pool: ContentPool<u32, u64> = ContentPool::new();
        assert!(pool.try_return(0, 7, 1, 5));
        assert!(pool.try_return(0, 7, 2, 5));
        assert_eq!(pool.try_acquire(0, &7), Some(2));
        assert_eq!(pool.try_acquire(0, &7), Some(1));
        assert_eq!(pool.try_acquire(0, &7), None);
    }

    #[test]
    fn full_stack_rejects_the_incoming_entry() {
        let mut pool: ContentPool<u32, u64> = ContentPool::new();
        for v in 0..5 {
            assert!(pool.try_return(0, 0, v, 5));
        }
        assert!(!pool.try_return(0, 0, 99, 5));
        assert_eq!(pool.pooled(0, &0), 5);
        // LIFO: the survivor on top is the last accepted entry, not 99.
        assert_eq!(pool.try_acquire(0, &0), Some(4));
    }

    #[test]
    fn templates_do_not_share_stacks() {
        let mut pool: ContentPool<u32, u64> = ContentPool::new();
        assert!(pool.try_return(1, 0, 10, 5));
        assert_eq!(pool.try_acquire(2, &0), None);
        assert_eq!(pool.try_acquire(1, &0), Some(10));
    }

    #[test]
    fn zero_capacity_pools_nothing() {
        let mut pool: ContentPool<u32, u64> = ContentPool::new();
        assert!(!pool.try_return(0, 0, 1, 0));
        assert_eq!(pool.total(), 0);
    }
}
