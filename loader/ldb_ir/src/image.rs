//! In-memory image of an instance being assembled.

use smallvec::SmallVec;

use crate::value::TypedValue;

/// Attribute slots of one instance plus the bound flags of its fixed-width
/// slots.
///
/// A fixed-width slot is only written to storage when its bound flag is set;
/// variable-width slots carry their own presence.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct ObjectImage {
    values: Vec<Option<TypedValue>>,
    bound: SmallVec<[u64; 2]>,
}

impl ObjectImage {
    pub fn with_slots(slots: usize) -> Self {
        ObjectImage {
            values: vec![None; slots],
            bound: SmallVec::from_elem(0, slots.div_ceil(64)),
        }
    }

    fn grow(&mut self, slot: usize) {
        if slot >= self.values.len() {
            self.values.resize(slot + 1, None);
        }
        let words = (slot / 64) + 1;
        if self.bound.len() < words {
            self.bound.resize(words, 0);
        }
    }

    /// Store `value` in `slot`. Fixed-width slots have their bound flag set.
    pub fn set(&mut self, slot: usize, value: TypedValue, fixed_width: bool) {
        self.grow(slot);
        let mask = 1u64 << (slot % 64);
        if fixed_width {
            self.bound[slot / 64] |= mask;
        } else {
            self.bound[slot / 64] &= !mask;
        }
        self.values[slot] = Some(value);
    }

    pub fn get(&self, slot: usize) -> Option<&TypedValue> {
        self.values.get(slot).and_then(Option::as_ref)
    }

    pub fn is_bound(&self, slot: usize) -> bool {
        self.bound
            .get(slot / 64)
            .is_some_and(|word| word & (1u64 << (slot % 64)) != 0)
    }

    /// Forget every value, keeping the slot count.
    pub fn clear(&mut self) {
        self.values.iter_mut().for_each(|v| *v = None);
        self.bound.iter_mut().for_each(|w| *w = 0);
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    /// Assigned slots in order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &TypedValue)> {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(slot, v)| v.as_ref().map(|v| (slot, v)))
    }
}
