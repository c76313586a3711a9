//! `PVORMStash`: an ordered overflow buffer of at most `sigma` slots
//! (spec §3).

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolidusError};
use crate::pvorm::slot::PvormSlot;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PvormStash {
    slots: Vec<PvormSlot>,
    capacity: usize,
}

impl PvormStash {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[PvormSlot] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut Vec<PvormSlot> {
        &mut self.slots
    }

    /// Inserts a slot, failing `StashOverflow` if capacity would be
    /// exceeded.
    pub fn push(&mut self, slot: PvormSlot) -> Result<()> {
        if self.slots.len() >= self.capacity {
            return Err(SolidusError::StashOverflow);
        }
        self.slots.push(slot);
        Ok(())
    }

    /// Removes and returns every slot, leaving the stash empty.
    pub fn drain_all(&mut self) -> Vec<PvormSlot> {
        std::mem::take(&mut self.slots)
    }

    pub fn remove(&mut self, index: usize) -> PvormSlot {
        self.slots.remove(index)
    }
}
