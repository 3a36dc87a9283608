use core::mem;

use crate::key::PoolKey;
use crate::recycler::Recycler;
use crate::ContainerEvent;

/// A collection mutation notification, applied synchronously via
/// [`Recycler::apply_change`].
///
/// `Insert`/`Remove` adjust the tracked item count themselves; `Reset`
/// carries the authoritative new count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CollectionChange {
    Insert { index: usize, count: usize },
    Remove { index: usize, count: usize },
    Replace { index: usize },
    Move { from: usize, to: usize },
    Reset { count: usize },
}

impl<C, K: PoolKey> Recycler<C, K> {
    /// Incrementally updates the index <-> container mapping for one mutation.
    ///
    /// Containers that are merely shifted keep their realization and get an
    /// `IndexChanged` event; only containers whose item disappeared are
    /// cleared. Holes left inside the extended range are filled by the next
    /// [`Recycler::reconcile`]. A notification inconsistent with the tracked
    /// count falls back to the `Reset` path instead of corrupting the map.
    pub fn apply_change(&mut self, change: CollectionChange) {
        match change {
            CollectionChange::Insert { index, count } => self.apply_insert(index, count),
            CollectionChange::Remove { index, count } => self.apply_remove(index, count),
            CollectionChange::Replace { index } => self.apply_replace(index),
            CollectionChange::Move { from, to } => self.apply_move(from, to),
            CollectionChange::Reset { count } => self.apply_reset(count),
        }
    }

    fn apply_insert(&mut self, index: usize, count: usize) {
        if count == 0 {
            return;
        }
        if index > self.options.count {
            self.defensive_reset("insert index out of bounds");
            return;
        }
        rtrace!(index, count, "apply_insert");

        // Inserting before the first visible item grows the extent above the
        // viewport; bump the offset so the anchored item stays put.
        let first_visible = self.tracked().visible.start;
        if index < first_visible {
            let added = (count as u64).saturating_mul(self.average_extent() as u64);
            self.scroll_offset = self.scroll_offset.saturating_add(added);
        }

        self.shift_mapped(index, usize::MAX, count as isize);
        self.options.count += count;
    }

    fn apply_remove(&mut self, index: usize, count: usize) {
        if count == 0 {
            return;
        }
        let end = match index.checked_add(count) {
            Some(end) if end <= self.options.count => end,
            _ => {
                self.defensive_reset("remove range out of bounds");
                return;
            }
        };
        rtrace!(index, count, "apply_remove");

        // Only the removed extent strictly before the first visible item
        // shifts the offset; measured extents are preferred over the average.
        let first_visible = self.tracked().visible.start;
        let average = self.average_extent();
        let mut removed_before = 0u64;
        for i in index..end.min(first_visible) {
            let extent = self
                .index_map
                .get(&i)
                .and_then(|&id| self.arena.get(id))
                .and_then(|data| data.measured)
                .unwrap_or(average);
            removed_before = removed_before.saturating_add(extent as u64);
        }
        self.scroll_offset = self.scroll_offset.saturating_sub(removed_before);

        let mut out = mem::take(&mut self.scratch);
        out.clear();
        for (&i, &id) in self.index_map.iter() {
            if i >= index && i < end {
                out.push((i, id));
            }
        }
        out.sort_unstable_by_key(|&(i, _)| i);
        for &(_, id) in out.iter() {
            self.release_container(id, true);
        }
        out.clear();
        self.scratch = out;

        self.shift_mapped(end, usize::MAX, -(count as isize));
        self.options.count -= count;
    }

    fn apply_replace(&mut self, index: usize) {
        if index >= self.options.count {
            self.defensive_reset("replace index out of bounds");
            return;
        }
        rtrace!(index, "apply_replace");
        // The new item may need a different template; always rebuild. The
        // hole is re-realized on the next pass.
        if let Some(&id) = self.index_map.get(&index) {
            self.release_container(id, true);
        }
    }

    fn apply_move(&mut self, from: usize, to: usize) {
        let count = self.options.count;
        if from >= count || to >= count {
            self.defensive_reset("move endpoint out of bounds");
            return;
        }
        if from == to {
            return;
        }
        rtrace!(from, to, "apply_move");

        let moved = self.index_map.remove(&from);
        if from < to {
            self.shift_mapped(from + 1, to + 1, -1);
        } else {
            self.shift_mapped(to, from, 1);
        }
        if let Some(id) = moved {
            if let Some(data) = self.arena.get_mut(id) {
                data.index = to;
            }
            self.index_map.insert(to, id);
            self.emit(ContainerEvent::IndexChanged {
                container: id,
                old_index: from,
                new_index: to,
            });
        }
    }

    fn apply_reset(&mut self, count: usize) {
        rdebug!(count, realized = self.index_map.len(), "apply_reset");
        self.release_all(true);
        self.options.count = count;
        self.pending_scroll = None;
    }

    fn defensive_reset(&mut self, _reason: &'static str) {
        rwarn!(
            reason = _reason,
            count = self.options.count,
            "inconsistent collection change; resetting realized set"
        );
        let count = self.options.count;
        self.apply_reset(count);
    }

    /// Relocates every mapped index in `[lo, hi)` by `delta`, emitting
    /// `IndexChanged` per shifted container. Processing order (descending for
    /// upward shifts, ascending for downward) keeps intermediate keys from
    /// colliding.
    fn shift_mapped(&mut self, lo: usize, hi: usize, delta: isize) {
        let mut out = mem::take(&mut self.scratch);
        out.clear();
        for (&i, &id) in self.index_map.iter() {
            if i >= lo && i < hi {
                out.push((i, id));
            }
        }
        if delta > 0 {
            out.sort_unstable_by(|a, b| b.0.cmp(&a.0));
        } else {
            out.sort_unstable_by_key(|&(i, _)| i);
        }
        for &(i, id) in out.iter() {
            self.index_map.remove(&i);
            let new_index = i.wrapping_add_signed(delta);
            if let Some(data) = self.arena.get_mut(id) {
                data.index = new_index;
            }
            self.index_map.insert(new_index, id);
            self.emit(ContainerEvent::IndexChanged {
                container: id,
                old_index: i,
                new_index,
            });
        }
        out.clear();
        self.scratch = out;
    }
}
