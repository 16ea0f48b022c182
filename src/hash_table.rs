use core::iter::FusedIterator;
use core::iter::Zip;
use core::mem::MaybeUninit;
use core::slice;

use crate::scopeguard::guard;

/// Number of buckets in [`DebugStats::displacement_histogram`].
#[cfg(feature = "stats")]
pub const DISPLACEMENT_BUCKETS: usize = 8;

/// Outcome of walking the probe sequence of a hash.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Probe {
    /// The slot holding the matching key.
    Found(usize),
    /// The first empty slot on the probe sequence.
    Vacant(usize),
    /// Every slot was visited without a match. Only reachable when the table
    /// is full.
    Full,
}

/// Size and valid-range bookkeeping for one slot buffer.
///
/// An empty table holds the sentinel bounds `(capacity, 0)`. Otherwise every
/// occupied index lies within `first_valid..=last_valid` and both bounds sit
/// on occupied slots, except transiently while a [`RawTable::take`] sequence
/// is emptying the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TableState {
    len: usize,
    mask: usize,
    first_valid: usize,
    last_valid: usize,
}

impl TableState {
    pub(crate) const fn new(capacity: usize) -> Self {
        assert!(capacity.is_power_of_two(), "Max size is not power of two");
        TableState {
            len: 0,
            mask: capacity - 1,
            first_valid: capacity,
            last_valid: 0,
        }
    }

    #[inline(always)]
    pub(crate) fn capacity(&self) -> usize {
        self.mask + 1
    }

    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub(crate) fn first_valid(&self) -> usize {
        self.first_valid
    }

    #[inline(always)]
    pub(crate) fn last_valid(&self) -> usize {
        self.last_valid
    }

    fn reset(&mut self) {
        self.len = 0;
        self.first_valid = self.capacity();
        self.last_valid = 0;
    }

    fn widen(&mut self, index: usize) {
        self.first_valid = self.first_valid.min(index);
        self.last_valid = self.last_valid.max(index);
    }
}

/// Shared view over a slot buffer, its occupancy flags and bookkeeping.
///
/// All read-only probing and stepping logic lives here. The view is generic
/// over the stored types only, so the probing code is shared by every
/// capacity.
pub(crate) struct RawTableRef<'a, K, V> {
    slots: &'a [MaybeUninit<(K, V)>],
    occupied: &'a [bool],
    state: &'a TableState,
}

impl<K, V> Clone for RawTableRef<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for RawTableRef<'_, K, V> {}

impl<'a, K, V> RawTableRef<'a, K, V> {
    #[inline]
    pub(crate) fn new(
        slots: &'a [MaybeUninit<(K, V)>],
        occupied: &'a [bool],
        state: &'a TableState,
    ) -> Self {
        debug_assert_eq!(slots.len(), state.capacity());
        debug_assert_eq!(occupied.len(), state.capacity());
        RawTableRef {
            slots,
            occupied,
            state,
        }
    }

    #[inline(always)]
    pub(crate) fn state(&self) -> &'a TableState {
        self.state
    }

    #[inline(always)]
    pub(crate) fn end(&self) -> usize {
        self.state.capacity()
    }

    #[inline(always)]
    pub(crate) fn begin(&self) -> usize {
        self.state.first_valid
    }

    #[inline(always)]
    pub(crate) fn is_occupied(&self, index: usize) -> bool {
        self.occupied.get(index).copied().unwrap_or(false)
    }

    /// Returns the pair stored at `index`, or `None` when the slot is empty or
    /// `index` is the end position.
    #[inline]
    pub(crate) fn get(&self, index: usize) -> Option<&'a (K, V)> {
        if !self.is_occupied(index) {
            return None;
        }

        let slots = self.slots;
        // SAFETY: `is_occupied` checked bounds and the occupancy flag, and a set
        // flag means the slot holds an initialized pair.
        Some(unsafe { slots.get_unchecked(index).assume_init_ref() })
    }

    /// Walks the linear probe sequence starting at the home slot of `hash`.
    ///
    /// Stops at the first slot whose key satisfies `eq` or at the first empty
    /// slot. Visiting every slot without resolution is reported as
    /// [`Probe::Full`]; that is only legal when the table is full.
    #[inline]
    pub(crate) fn probe(&self, hash: u64, eq: impl Fn(&K) -> bool) -> Probe {
        let mask = self.state.mask;
        let mut index = hash as usize & mask;

        for _ in 0..=mask {
            if !self.occupied[index] {
                return Probe::Vacant(index);
            }

            // SAFETY: The occupancy flag at `index` is set, so the slot is
            // initialized. `index` is masked and therefore in bounds.
            let (key, _) = unsafe { self.slots.get_unchecked(index).assume_init_ref() };
            if eq(key) {
                return Probe::Found(index);
            }

            index = (index + 1) & mask;
        }

        assert_eq!(
            self.state.len,
            self.state.capacity(),
            "Probe visited every slot of a table that is not full"
        );
        Probe::Full
    }

    #[inline]
    pub(crate) fn find(&self, hash: u64, eq: impl Fn(&K) -> bool) -> Option<usize> {
        if self.state.len == 0 {
            return None;
        }

        match self.probe(hash, eq) {
            Probe::Found(index) => Some(index),
            Probe::Vacant(_) | Probe::Full => None,
        }
    }

    /// Index of the next occupied slot after `index`, or the end position.
    #[inline]
    pub(crate) fn next_index(&self, index: usize) -> usize {
        let last = self.state.last_valid;
        let mut index = index.saturating_add(1);

        while index <= last && !self.occupied[index] {
            index += 1;
        }

        if index > last { self.end() } else { index }
    }

    /// Index of the previous occupied slot before `index`. `None` when no
    /// occupied slot precedes it. The end position steps back onto the last
    /// occupied slot.
    #[inline]
    pub(crate) fn prev_index(&self, index: usize) -> Option<usize> {
        let first = self.state.first_valid;
        let mut index = index.min(self.end());

        while index > first {
            index -= 1;
            if self.occupied[index] {
                return Some(index);
            }
        }

        None
    }

    /// Slot-by-slot comparison: same size, same bounds, same occupancy and
    /// equal pairs at every occupied index.
    pub(crate) fn structural_eq(&self, other: &RawTableRef<'_, K, V>) -> bool
    where
        K: PartialEq,
        V: PartialEq,
    {
        if self.state.len != other.state.len
            || self.state.first_valid != other.state.first_valid
            || self.state.last_valid != other.state.last_valid
        {
            return false;
        }

        if self.state.len == 0 {
            return true;
        }

        (self.state.first_valid..=self.state.last_valid).all(|index| {
            self.occupied[index] == other.occupied[index] && self.get(index) == other.get(index)
        })
    }

    pub(crate) fn iter(&self) -> RawIter<'a, K, V> {
        RawIter {
            table: *self,
            front: self.begin(),
            back: self.end(),
            remaining: self.state.len,
        }
    }

    #[cfg(feature = "stats")]
    pub(crate) fn debug_stats(&self, hash: impl Fn(&K) -> u64) -> DebugStats {
        let capacity = self.state.capacity();
        let mask = self.state.mask;

        let mut total_displacement = 0;
        let mut max_displacement = 0;
        let mut displacement_histogram = [0; DISPLACEMENT_BUCKETS];

        let mut index = self.begin();
        while index != self.end() {
            if let Some((key, _)) = self.get(index) {
                let home = hash(key) as usize & mask;
                let displacement = index.wrapping_sub(home) & mask;
                total_displacement += displacement;
                max_displacement = max_displacement.max(displacement);
                displacement_histogram[displacement.min(DISPLACEMENT_BUCKETS - 1)] += 1;
            }
            index = self.next_index(index);
        }

        let longest_run = if self.state.len == capacity {
            capacity
        } else {
            // Start right after an empty slot so runs wrapping past the last
            // index are counted once.
            let start = self.occupied.iter().position(|&o| !o).unwrap_or(0);
            let mut longest = 0;
            let mut current = 0;
            for offset in 1..=capacity {
                if self.occupied[(start + offset) & mask] {
                    current += 1;
                    longest = longest.max(current);
                } else {
                    current = 0;
                }
            }
            longest
        };

        DebugStats {
            populated: self.state.len,
            capacity,
            first_valid_index: self.state.first_valid,
            last_valid_index: self.state.last_valid,
            load_factor: self.state.len as f64 / capacity as f64,
            total_displacement,
            max_displacement,
            displacement_histogram,
            longest_run,
            total_bytes: capacity
                * (core::mem::size_of::<MaybeUninit<(K, V)>>() + core::mem::size_of::<bool>()),
        }
    }
}

/// Mutable view over a slot buffer. Every mutating algorithm of the map
/// lives here.
pub(crate) struct RawTable<'a, K, V> {
    slots: &'a mut [MaybeUninit<(K, V)>],
    occupied: &'a mut [bool],
    state: &'a mut TableState,
}

impl<'a, K, V> RawTable<'a, K, V> {
    #[inline]
    pub(crate) fn new(
        slots: &'a mut [MaybeUninit<(K, V)>],
        occupied: &'a mut [bool],
        state: &'a mut TableState,
    ) -> Self {
        debug_assert_eq!(slots.len(), state.capacity());
        debug_assert_eq!(occupied.len(), state.capacity());
        RawTable {
            slots,
            occupied,
            state,
        }
    }

    #[inline(always)]
    pub(crate) fn as_ref(&self) -> RawTableRef<'_, K, V> {
        RawTableRef {
            slots: &*self.slots,
            occupied: &*self.occupied,
            state: &*self.state,
        }
    }

    #[inline(always)]
    pub(crate) fn reborrow(&mut self) -> RawTable<'_, K, V> {
        RawTable {
            slots: &mut *self.slots,
            occupied: &mut *self.occupied,
            state: &mut *self.state,
        }
    }

    /// Mutable access to the pair at `index`, or `None` when the slot is
    /// empty.
    #[inline]
    pub(crate) fn pair_mut(&mut self, index: usize) -> Option<&mut (K, V)> {
        if !self.as_ref().is_occupied(index) {
            return None;
        }

        // SAFETY: Bounds and occupancy were checked above.
        Some(unsafe { self.slots.get_unchecked_mut(index).assume_init_mut() })
    }

    /// Converts the view into the pair at `index`.
    ///
    /// # Panics
    ///
    /// Panics if the slot is empty.
    #[inline]
    pub(crate) fn into_occupied(self, index: usize) -> &'a mut (K, V) {
        assert!(
            self.as_ref().is_occupied(index),
            "Index is not allocated: {index}"
        );

        let slots = self.slots;
        // SAFETY: Bounds and occupancy were asserted above.
        unsafe { slots.get_unchecked_mut(index).assume_init_mut() }
    }

    /// Writes `pair` into the empty slot at `index` and widens the bounds.
    pub(crate) fn occupy_into(self, index: usize, pair: (K, V)) -> &'a mut (K, V) {
        assert!(!self.occupied[index], "Index is already allocated: {index}");

        self.occupied[index] = true;
        self.state.len += 1;
        self.state.widen(index);

        let slots = self.slots;
        slots[index].write(pair)
    }

    #[inline]
    pub(crate) fn occupy(&mut self, index: usize, pair: (K, V)) -> &mut (K, V) {
        self.reborrow().occupy_into(index, pair)
    }

    /// Moves the pair out of `index` and clears its flag. Neither repairs
    /// probe chains nor touches the bounds.
    fn take_raw(&mut self, index: usize) -> (K, V) {
        assert!(self.occupied[index], "Index is not allocated: {index}");

        self.occupied[index] = false;
        self.state.len -= 1;

        // SAFETY: The flag was set, so the slot held an initialized pair.
        // Clearing the flag first transfers ownership of it to the caller.
        unsafe { self.slots[index].assume_init_read() }
    }

    /// Removes the pair at `index` without repairing probe chains.
    ///
    /// Only for callers that own the table and go on to empty it, such as
    /// owning iteration. The bounds are reset once the last entry is gone.
    pub(crate) fn take(&mut self, index: usize) -> (K, V) {
        let pair = self.take_raw(index);
        if self.state.len == 0 {
            self.state.reset();
        }
        pair
    }

    /// Takes the next occupied pair at or after `*cursor`, advancing the
    /// cursor past it.
    pub(crate) fn take_next(&mut self, cursor: &mut usize) -> Option<(K, V)> {
        if self.state.len == 0 {
            return None;
        }

        let last = self.state.last_valid;
        while *cursor <= last {
            let index = *cursor;
            *cursor += 1;
            if self.occupied[index] {
                return Some(self.take(index));
            }
        }

        None
    }

    /// Removes the pair in the highest occupied slot.
    ///
    /// The slot after the last one is empty unless the cluster wraps, so this
    /// rarely shifts anything. The table stays consistent between calls.
    pub(crate) fn erase_last(&mut self, hash: impl Fn(&K) -> u64) -> Option<(K, V)> {
        if self.state.len == 0 {
            return None;
        }

        let (pair, _) = self.erase(self.state.last_valid, hash);
        Some(pair)
    }

    /// Removes the pair at `index` with backward-shift deletion.
    ///
    /// Returns the removed pair and the first occupied index at or after
    /// `index` once relocation is done, or the end position.
    pub(crate) fn erase(&mut self, index: usize, hash: impl Fn(&K) -> u64) -> ((K, V), usize) {
        let pair = self.take_raw(index);

        if self.state.len == 0 {
            self.state.reset();
            return (pair, self.state.capacity());
        }

        self.close_gap(index, hash, |_, _| {});
        self.tighten();

        let next = if self.occupied[index] {
            index
        } else {
            self.as_ref().next_index(index)
        };

        (pair, next)
    }

    /// Refills the hole at `hole` from the cluster that follows it.
    ///
    /// An entry may move into the hole only when the hole lies on its probe
    /// path, cyclically between its home slot and its current slot. Each move
    /// opens a new hole at the entry's old slot. The walk ends at the first
    /// empty slot. `on_move(from, to)` observes every relocation.
    fn close_gap(
        &mut self,
        hole: usize,
        hash: impl Fn(&K) -> u64,
        mut on_move: impl FnMut(usize, usize),
    ) {
        let mask = self.state.mask;
        let mut hole = hole;
        let mut index = (hole + 1) & mask;

        while self.occupied[index] {
            // SAFETY: The occupancy flag at `index` is set.
            let (key, _) = unsafe { self.slots[index].assume_init_ref() };
            let home = hash(key) as usize & mask;

            if index.wrapping_sub(home) & mask >= index.wrapping_sub(hole) & mask {
                self.relocate(index, hole);
                on_move(index, hole);
                hole = index;
            }

            index = (index + 1) & mask;
        }
    }

    fn relocate(&mut self, from: usize, to: usize) {
        debug_assert!(self.occupied[from]);
        debug_assert!(!self.occupied[to]);

        // SAFETY: `from` is occupied and `to` is empty. The pair is moved
        // bitwise and the source is forgotten by clearing its flag below.
        let pair = unsafe { self.slots[from].assume_init_read() };
        self.slots[to].write(pair);
        self.occupied[to] = true;
        self.occupied[from] = false;
    }

    /// Narrows the bounds inward onto occupied slots.
    fn tighten(&mut self) {
        if self.state.len == 0 {
            self.state.reset();
            return;
        }

        let mut first = self.state.first_valid;
        while !self.occupied[first] {
            first += 1;
        }

        let mut last = self.state.last_valid;
        while !self.occupied[last] {
            last -= 1;
        }

        self.state.first_valid = first;
        self.state.last_valid = last;
    }

    /// Removes every pair for which `pred` returns `true`, in one pass over
    /// the valid range. Returns the number of removed pairs.
    ///
    /// A backward shift that wraps past the last slot carries entries that
    /// were already offered to `pred` into the tail of the range. Shifts keep
    /// the cyclic order of a cluster, so those entries always sit behind the
    /// unvisited ones and the walk stops at the first of them.
    ///
    /// The bounds are tightened even if `pred` or `hash` panics.
    pub(crate) fn erase_if(
        &mut self,
        hash: impl Fn(&K) -> u64,
        mut pred: impl FnMut(&K, &mut V) -> bool,
    ) -> usize {
        if self.state.len == 0 {
            return 0;
        }

        let mut table = guard(self, |table| table.tighten());

        let last = table.state.last_valid;
        let mut stop = table.state.capacity();
        let mut removed = 0;
        let mut index = table.state.first_valid;
        while index <= last && index < stop {
            if !table.occupied[index] {
                index += 1;
                continue;
            }

            // SAFETY: The occupancy flag at `index` is set.
            let pair = unsafe { table.slots[index].assume_init_mut() };
            if pred(&pair.0, &mut pair.1) {
                drop(table.take_raw(index));
                removed += 1;
                // A displaced entry may land on `index`; it is examined on the
                // next iteration.
                let current = index;
                table.close_gap(index, &hash, |from, to| {
                    if (from < current || from >= stop) && to >= current {
                        stop = stop.min(to);
                    }
                });
            } else {
                index += 1;
            }
        }

        removed
    }

    /// Drops every pair and resets the bookkeeping.
    pub(crate) fn clear(&mut self) {
        if self.state.len == 0 {
            self.state.reset();
            return;
        }

        let first = self.state.first_valid;
        let last = self.state.last_valid;
        self.state.reset();

        if core::mem::needs_drop::<(K, V)>() {
            for index in first..=last {
                if self.occupied[index] {
                    self.occupied[index] = false;
                    // SAFETY: The flag was set, so the slot is initialized. It
                    // was cleared first so the pair is dropped exactly once.
                    unsafe { self.slots[index].assume_init_drop() };
                }
            }
        } else {
            self.occupied[first..=last].fill(false);
        }
    }

    /// Clones every pair of `source` into the same slot of this empty table.
    ///
    /// Only valid when both tables place keys identically, i.e. same capacity
    /// and equivalent hash builders.
    pub(crate) fn clone_from_ref(&mut self, source: RawTableRef<'_, K, V>)
    where
        K: Clone,
        V: Clone,
    {
        assert_eq!(
            self.state.capacity(),
            source.state.capacity(),
            "Invalid max size"
        );
        debug_assert_eq!(self.state.len, 0);

        if source.state.len == 0 {
            return;
        }

        // Bounds first, so a panicking clone leaves a superset of the
        // occupied range behind.
        self.state.first_valid = source.state.first_valid;
        self.state.last_valid = source.state.last_valid;

        for index in source.state.first_valid..=source.state.last_valid {
            if let Some(pair) = source.get(index) {
                self.slots[index].write(pair.clone());
                self.occupied[index] = true;
                self.state.len += 1;
            }
        }
    }

    /// Exchanges the contents of two equally sized tables index by index.
    pub(crate) fn swap_with(&mut self, other: &mut RawTable<'_, K, V>) {
        assert_eq!(
            self.state.capacity(),
            other.state.capacity(),
            "Invalid max size"
        );

        let first = self.state.first_valid.min(other.state.first_valid);
        let last = self.state.last_valid.max(other.state.last_valid);

        if first <= last {
            self.slots[first..=last].swap_with_slice(&mut other.slots[first..=last]);
            self.occupied[first..=last].swap_with_slice(&mut other.occupied[first..=last]);
        }

        core::mem::swap(self.state, other.state);
    }

    /// Moves every pair of `other` into this table, overwriting values of
    /// keys present in both. `other` ends empty, also when this panics.
    ///
    /// # Panics
    ///
    /// Panics when the merged key count exceeds this table's capacity.
    pub(crate) fn merge_from(&mut self, other: &mut RawTable<'_, K, V>, hash: impl Fn(&K) -> u64)
    where
        K: Eq,
    {
        if other.state.len == 0 {
            return;
        }

        // Pairs still in `other` when a panic unwinds are dropped.
        let mut source = guard(other, |source| source.clear());

        let first = source.state.first_valid;
        let last = source.state.last_valid;

        for index in first..=last {
            if !source.occupied[index] {
                continue;
            }

            let (key, value) = source.take_raw(index);
            match self.as_ref().probe(hash(&key), |k| *k == key) {
                Probe::Found(slot) => {
                    if let Some(pair) = self.pair_mut(slot) {
                        pair.1 = value;
                    }
                }
                Probe::Vacant(slot) => {
                    self.occupy(slot, (key, value));
                }
                Probe::Full => panic!("Not enough space in map: {}", self.state.capacity()),
            }
        }
    }

    pub(crate) fn into_iter_mut(self) -> RawIterMut<'a, K, V> {
        let len = self.state.len;
        let range = if len == 0 {
            0..0
        } else {
            self.state.first_valid..self.state.last_valid + 1
        };

        let slots = self.slots;
        let occupied: &'a [bool] = self.occupied;
        RawIterMut {
            inner: slots[range.clone()].iter_mut().zip(occupied[range].iter()),
            remaining: len,
        }
    }
}

/// Double-ended iterator over the occupied pairs of a table, in index order.
pub(crate) struct RawIter<'a, K, V> {
    table: RawTableRef<'a, K, V>,
    front: usize,
    back: usize,
    remaining: usize,
}

impl<K, V> Clone for RawIter<'_, K, V> {
    fn clone(&self) -> Self {
        RawIter {
            table: self.table,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for RawIter<'a, K, V> {
    type Item = &'a (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let mut index = self.front;
        if !self.table.is_occupied(index) {
            index = self.table.next_index(index);
        }

        let pair = self.table.get(index)?;
        self.front = self.table.next_index(index);
        self.remaining -= 1;
        Some(pair)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for RawIter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let index = self.table.prev_index(self.back)?;
        self.back = index;
        self.remaining -= 1;
        self.table.get(index)
    }
}

impl<K, V> ExactSizeIterator for RawIter<'_, K, V> {}

impl<K, V> FusedIterator for RawIter<'_, K, V> {}

/// Mutable iterator over the occupied pairs of a table, in index order.
pub(crate) struct RawIterMut<'a, K, V> {
    inner: Zip<slice::IterMut<'a, MaybeUninit<(K, V)>>, slice::Iter<'a, bool>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for RawIterMut<'a, K, V> {
    type Item = &'a mut (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        for (slot, &occupied) in self.inner.by_ref() {
            if occupied {
                self.remaining -= 1;
                // SAFETY: The slot's occupancy flag is set.
                return Some(unsafe { slot.assume_init_mut() });
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for RawIterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        while let Some((slot, &occupied)) = self.inner.next_back() {
            if occupied {
                self.remaining -= 1;
                // SAFETY: The slot's occupancy flag is set.
                return Some(unsafe { slot.assume_init_mut() });
            }
        }
        None
    }
}

impl<K, V> ExactSizeIterator for RawIterMut<'_, K, V> {}

impl<K, V> FusedIterator for RawIterMut<'_, K, V> {}

/// Slot-usage statistics for a map.
///
/// Requires the `stats` feature.
#[cfg(feature = "stats")]
#[derive(Debug, Clone, PartialEq)]
pub struct DebugStats {
    /// Number of elements currently in the map
    pub populated: usize,
    /// Number of slots in the map
    pub capacity: usize,
    /// Lowest occupied slot, or `capacity` when empty
    pub first_valid_index: usize,
    /// Highest occupied slot, or `0` when empty
    pub last_valid_index: usize,
    /// Load factor (populated / capacity)
    pub load_factor: f64,
    /// Sum over all entries of the distance from their home slot
    pub total_displacement: usize,
    /// Largest distance of any entry from its home slot
    pub max_displacement: usize,
    /// Entry counts by distance from the home slot. The last bucket also
    /// counts every larger distance.
    pub displacement_histogram: [usize; DISPLACEMENT_BUCKETS],
    /// Longest run of consecutive occupied slots, wrapping around the end
    pub longest_run: usize,
    /// Bytes of inline storage held by slots and occupancy flags
    pub total_bytes: usize,
}

#[cfg(feature = "stats")]
impl DebugStats {
    /// Mean distance of an entry from its home slot.
    pub fn mean_displacement(&self) -> f64 {
        if self.populated == 0 {
            0.0
        } else {
            self.total_displacement as f64 / self.populated as f64
        }
    }

    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Map Debug Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor)",
            self.populated,
            self.capacity,
            self.load_factor * 100.0
        );
        if self.populated == 0 {
            println!("Valid range: empty");
        } else {
            println!(
                "Valid range: {}..={}",
                self.first_valid_index, self.last_valid_index
            );
        }
        println!(
            "Displacement: {} total, {} max, {:.2} mean",
            self.total_displacement,
            self.max_displacement,
            self.mean_displacement()
        );
        println!("Longest run: {} slots", self.longest_run);
        println!("Inline storage: {} bytes", self.total_bytes);

        let max = self.displacement_histogram.iter().copied().max().unwrap_or(0);
        if max == 0 {
            return;
        }

        let max_bar = 60usize;
        println!("displacement histogram:");
        for (distance, &count) in self.displacement_histogram.iter().enumerate() {
            let width = (count * max_bar).div_ceil(max);
            let label = if distance + 1 == DISPLACEMENT_BUCKETS {
                format!("{distance:>2}+")
            } else {
                format!("{distance:>3}")
            };
            println!("{} | {} ({})", label, "█".repeat(width), count);
        }
    }
}
