use alloc::vec::Vec;

use crate::key::KeyedMap;
use crate::{ContainerId, TemplateId};

/// Live state of a realized container.
pub(crate) struct SlotData<C, K> {
    pub index: usize,
    pub template: TemplateId,
    /// Pooling key captured at build time, so the content can be returned to
    /// the pool even after the item itself is gone (remove/replace).
    pub pool_key: Option<K>,
    pub content: C,
    pub measured: Option<u32>,
}

enum SlotState<C, K> {
    /// Truly free; the slot's previous ids were invalidated by a generation bump.
    Vacant,
    /// A detached container shell waiting on a per-template free list. Its
    /// `ContainerId` stays valid and is re-announced on the next `Prepared`.
    Parked,
    Live(SlotData<C, K>),
}

struct Slot<C, K> {
    generation: u32,
    state: SlotState<C, K>,
}

/// Arena of container slots addressed by stable, generation-tagged ids.
///
/// Realized containers live here; cleared containers are parked on a
/// per-template shell free list rather than destroyed, so the host-side UI
/// element tied to the `ContainerId` can be rebound instead of rebuilt.
/// The sparse `index -> ContainerId` lookup is owned by the surface.
pub(crate) struct ContainerArena<C, K> {
    slots: Vec<Slot<C, K>>,
    vacant: Vec<u32>,
    parked: KeyedMap<TemplateId, Vec<u32>>,
    parked_total: usize,
}

impl<C, K> ContainerArena<C, K> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            vacant: Vec::new(),
            parked: KeyedMap::new(),
            parked_total: 0,
        }
    }

    /// Realizes `data`, preferring a parked shell of the same template.
    ///
    /// Returns the container id and whether a shell was reused.
    pub(crate) fn adopt(&mut self, data: SlotData<C, K>) -> (ContainerId, bool) {
        if let Some(ids) = self.parked.get_mut(&data.template) {
            if let Some(slot) = ids.pop() {
                self.parked_total -= 1;
                let entry = &mut self.slots[slot as usize];
                entry.state = SlotState::Live(data);
                return (
                    ContainerId {
                        slot,
                        generation: entry.generation,
                    },
                    true,
                );
            }
        }

        if let Some(slot) = self.vacant.pop() {
            let entry = &mut self.slots[slot as usize];
            entry.state = SlotState::Live(data);
            return (
                ContainerId {
                    slot,
                    generation: entry.generation,
                },
                false,
            );
        }

        let slot = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            state: SlotState::Live(data),
        });
        (
            ContainerId {
                slot,
                generation: 0,
            },
            false,
        )
    }

    pub(crate) fn get(&self, id: ContainerId) -> Option<&SlotData<C, K>> {
        let entry = self.slots.get(id.slot as usize)?;
        if entry.generation != id.generation {
            return None;
        }
        match &entry.state {
            SlotState::Live(data) => Some(data),
            _ => None,
        }
    }

    pub(crate) fn get_mut(&mut self, id: ContainerId) -> Option<&mut SlotData<C, K>> {
        let entry = self.slots.get_mut(id.slot as usize)?;
        if entry.generation != id.generation {
            return None;
        }
        match &mut entry.state {
            SlotState::Live(data) => Some(data),
            _ => None,
        }
    }

    /// Detaches a live container, parking its shell for same-template reuse.
    pub(crate) fn park(&mut self, id: ContainerId) -> Option<SlotData<C, K>> {
        let entry = self.slots.get_mut(id.slot as usize)?;
        if entry.generation != id.generation {
            return None;
        }
        if !matches!(entry.state, SlotState::Live(_)) {
            return None;
        }
        let state = core::mem::replace(&mut entry.state, SlotState::Parked);
        let SlotState::Live(data) = state else {
            return None;
        };
        self.parked
            .entry(data.template)
            .or_insert_with(Vec::new)
            .push(id.slot);
        self.parked_total += 1;
        Some(data)
    }

    pub(crate) fn parked_count(&self) -> usize {
        self.parked_total
    }

    /// Destroys every container and shell, invalidating all outstanding ids.
    pub(crate) fn clear(&mut self) {
        self.vacant.clear();
        self.parked.clear();
        self.parked_total = 0;
        for (slot, entry) in self.slots.iter_mut().enumerate() {
            entry.state = SlotState::Vacant;
            entry.generation = entry.generation.wrapping_add(1);
            self.vacant.push(slot as u32);
        }
    }
}
