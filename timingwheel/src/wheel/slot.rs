//! The per-slot storage and the mutable state guarded by a level's lock.

use crate::timer::Timer;

use hashbrown::HashMap;

/// One slot: an id-keyed map of timers. Order within a slot is irrelevant.
pub type SlotMap = HashMap<u32, Timer>;

pub(crate) fn new_slot(cap_hint: usize) -> SlotMap {
    HashMap::with_capacity(cap_hint)
}

/// The mutable state of one wheel level, guarded as a unit by the level's
/// lock so that `cursor` and `slots` never observe a tick half-applied.
pub(crate) struct WheelState {
    pub(crate) cursor: usize,
    pub(crate) slots: Vec<SlotMap>,
}

impl WheelState {
    pub(crate) fn new(scales: usize, cap_hint: usize) -> Self {
        let mut slots = Vec::with_capacity(scales);
        for _ in 0..scales {
            slots.push(new_slot(cap_hint));
        }
        Self { cursor: 0, slots }
    }
}
