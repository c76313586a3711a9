//! `PVORMBucket`: a fixed-capacity ordered list of slots (spec §3).

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::curve::Point;
use crate::pvorm::slot::PvormSlot;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PvormBucket {
    slots: Vec<PvormSlot>,
    capacity: usize,
}

impl PvormBucket {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// A bucket packed to capacity with fresh identity-placeholder slots —
    /// the tree never has "empty" buckets, so every bucket always looks
    /// like `Z` live slots to an outside observer.
    pub fn filled_with_identity(capacity: usize, bank_pk: Point, rng: &mut impl RngCore) -> Self {
        let slots = (0..capacity).map(|_| PvormSlot::identity(bank_pk, rng)).collect();
        Self { slots, capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.capacity
    }

    pub fn slots(&self) -> &[PvormSlot] {
        &self.slots
    }

    /// Removes and returns every slot in the bucket, leaving it empty.
    pub fn drain_all(&mut self) -> Vec<PvormSlot> {
        std::mem::take(&mut self.slots)
    }

    /// Inserts a slot, failing if the bucket is already full.
    pub fn try_push(&mut self, slot: PvormSlot) -> bool {
        if self.is_full() {
            return false;
        }
        self.slots.push(slot);
        true
    }

    pub fn set_slot(&mut self, index: usize, slot: PvormSlot) {
        self.slots[index] = slot;
    }
}
