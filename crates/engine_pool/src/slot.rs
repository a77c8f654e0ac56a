//! Generation-checked slot storage.
//!
//! [`SlotPool`] stores values in reusable slots and hands out
//! [`SlotHandle`]s carrying the slot index and its generation. Releasing a
//! slot bumps its generation, so every handle to the old value goes stale:
//! lookups through it return `None` and releasing it again is rejected.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::PoolError;

/// Handle to a value stored in a [`SlotPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotHandle {
    /// Slot index.
    pub index: u32,
    /// Generation of the slot when the handle was issued.
    pub generation: NonZeroU32,
}

impl std::fmt::Display for SlotHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: NonZeroU32,
    value: Option<T>,
}

/// Slot-based storage with stale-handle detection.
#[derive(Debug, Clone)]
pub struct SlotPool<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> SlotPool<T> {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Store `value`, reusing a released slot when one is free.
    pub fn insert(&mut self, value: T) -> SlotHandle {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return SlotHandle {
                index,
                generation: slot.generation,
            };
        }

        let index = u32::try_from(self.slots.len()).expect("slot pool index overflow");
        self.slots.push(Slot {
            generation: NonZeroU32::MIN,
            value: Some(value),
        });
        SlotHandle {
            index,
            generation: NonZeroU32::MIN,
        }
    }

    /// Take the value out of its slot and free the slot for reuse. A slot
    /// that has used up every generation is retired instead.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::StaleHandle`] if the handle was already released
    /// or never belonged to this pool.
    pub fn remove(&mut self, handle: SlotHandle) -> Result<T, PoolError> {
        let Some(slot) = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
        else {
            return Err(stale(handle));
        };
        let Some(value) = slot.value.take() else {
            return Err(stale(handle));
        };
        // A slot whose generation is exhausted is never reused, so no handle
        // can come back to life.
        match slot.generation.checked_add(1) {
            Some(next) => {
                slot.generation = next;
                self.free.push(handle.index);
            }
            None => warn!(%handle, "slot generation exhausted, retiring slot"),
        }
        self.len -= 1;
        Ok(value)
    }

    /// Returns `true` if `handle` names a live value.
    #[must_use]
    pub fn contains(&self, handle: SlotHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Borrow the value behind `handle`.
    #[must_use]
    pub fn get(&self, handle: SlotHandle) -> Option<&T> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    /// Mutably borrow the value behind `handle`.
    #[must_use]
    pub fn get_mut(&mut self, handle: SlotHandle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    /// Number of live values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no values are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over live values with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (SlotHandle, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value.as_ref().map(|value| {
                (
                    SlotHandle {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    value,
                )
            })
        })
    }
}

impl<T> Default for SlotPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn stale(handle: SlotHandle) -> PoolError {
    warn!(%handle, "rejected release of a stale slot handle");
    PoolError::StaleHandle {
        index: handle.index,
        generation: handle.generation.get(),
    }
}
