use std::any::type_name;
use std::num::NonZero;
use std::{mem, thread};

use tracing::{debug, trace};

use crate::{DropPolicy, Error, HandleTableBuilder, Result, Slot};

/// Number of slots a table grows by when no builder override is given.
pub const DEFAULT_CHUNK_SIZE: NonZero<usize> = NonZero::new(16).unwrap();

/// A table that hands out small integer handles, each naming one slot of caller data.
///
/// Allocating a handle always picks the lowest-indexed vacant slot, growing the table by one
/// chunk only when every slot is in use. This keeps the range of live handles compact, so callers
/// can visit every live handle by scanning `0..high_water_mark()`.
///
/// The table is created lazily: no memory is held until the first handle is allocated, and all
/// storage is released again as soon as the last handle is freed. A table in that state is
/// called absent ([`is_allocated()`][1] returns `false`).
///
/// # Handle lifecycle
///
/// * [`allocate()`][2] reserves a handle without storing anything in its slot.
/// * [`set()`][3] stores a value in the slot of a live handle; [`insert()`][4] does both steps.
/// * [`take()`][5] moves the value back out, leaving the handle reserved.
/// * [`free()`][6] releases the handle, dropping any value still in its slot, and reports the new
///   high-water mark.
///
/// Freed handles are reused. Using a handle after freeing it may refer to a different item.
///
/// # Thread safety
///
/// The table performs no internal synchronization. It is [`Send`] and [`Sync`] whenever `T` is;
/// sharing it between threads for mutation requires an external lock held across each call.
///
/// [1]: Self::is_allocated
/// [2]: Self::allocate
/// [3]: Self::set
/// [4]: Self::insert
/// [5]: Self::take
/// [6]: Self::free
#[derive(Debug)]
pub struct HandleTable<T> {
    /// `None` while the table is absent. Never `Some` with zero live handles once an operation
    /// has returned.
    storage: Option<Storage<T>>,

    chunk_size: NonZero<usize>,
    drop_policy: DropPolicy,
}

#[derive(Debug)]
struct Storage<T> {
    /// The length of this is the capacity of the table and is always a multiple of the
    /// chunk size.
    slots: Vec<Slot<T>>,

    /// Number of live (reserved or occupied) slots.
    used: usize,

    /// One past the greatest live handle. Maintained incrementally; the reverse scan in
    /// `scan_high_water_mark()` is the ground truth it must always agree with.
    high_water_mark: usize,
}

impl<T> Storage<T> {
    fn try_new(chunk_size: NonZero<usize>) -> Result<Self> {
        let mut slots = Vec::new();

        slots
            .try_reserve_exact(chunk_size.get())
            .map_err(|source| Error::AllocationFailed {
                what: "slot storage",
                source,
            })?;

        slots.resize_with(chunk_size.get(), || Slot::Vacant);

        Ok(Self {
            slots,
            used: 0,
            high_water_mark: 0,
        })
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Reserves the lowest vacant slot, if there is one.
    fn reserve_lowest_vacant(&mut self) -> Option<usize> {
        if self.used >= self.capacity() {
            return None;
        }

        let (index, slot) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| slot.is_vacant())?;

        *slot = Slot::Reserved;
        self.mark_reserved(index);

        Some(index)
    }

    /// Adds one chunk of vacant slots and reserves the first of them.
    ///
    /// On failure the storage is unchanged.
    fn grow_and_reserve(&mut self, chunk_size: NonZero<usize>) -> Result<usize> {
        let old_capacity = self.capacity();

        self.slots
            .try_reserve_exact(chunk_size.get())
            .map_err(|source| Error::AllocationFailed {
                what: "slot storage",
                source,
            })?;

        let new_capacity = old_capacity
            .checked_add(chunk_size.get())
            .expect("the reservation succeeded, so the new capacity fits in memory");

        self.slots.resize_with(new_capacity, || Slot::Vacant);

        debug!(old_capacity, new_capacity, "handle table grown");

        let slot = self
            .slots
            .get_mut(old_capacity)
            .expect("we just added a chunk of slots starting at this index");
        *slot = Slot::Reserved;
        self.mark_reserved(old_capacity);

        Ok(old_capacity)
    }

    fn mark_reserved(&mut self, index: usize) {
        self.used = self
            .used
            .checked_add(1)
            .expect("used cannot exceed capacity, which fits in memory");

        let end = index
            .checked_add(1)
            .expect("index is below capacity, which fits in memory");
        self.high_water_mark = self.high_water_mark.max(end);
    }

    fn scan_high_water_mark(&self, below: usize) -> usize {
        self.slots
            .get(..below)
            .expect("bound is never beyond capacity")
            .iter()
            .rposition(Slot::is_live)
            .map_or(0, |index| {
                index
                    .checked_add(1)
                    .expect("index is below capacity, which fits in memory")
            })
    }
}

impl<T> HandleTable<T> {
    #[must_use]
    pub(crate) fn new_inner(chunk_size: NonZero<usize>, drop_policy: DropPolicy) -> Self {
        Self {
            storage: None,
            chunk_size,
            drop_policy,
        }
    }

    /// Creates a new [`HandleTable`] with the default configuration.
    ///
    /// The table starts absent and allocates storage on the first call to
    /// [`allocate()`][Self::allocate] or [`insert()`][Self::insert].
    ///
    /// # Example
    ///
    /// ```rust
    /// use handle_table::HandleTable;
    ///
    /// let mut table = HandleTable::<String>::new();
    /// assert!(!table.is_allocated());
    ///
    /// let handle = table.insert("socket".to_string()).unwrap();
    /// assert_eq!(handle, 0);
    /// assert_eq!(table.get(handle).map(String::as_str), Some("socket"));
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a new [`HandleTable`].
    ///
    /// Use this when you want to customize the table configuration beyond the defaults.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::num::NonZero;
    ///
    /// use handle_table::HandleTable;
    ///
    /// let table = HandleTable::<u32>::builder()
    ///     .chunk_size(NonZero::new(4).unwrap())
    ///     .build();
    ///
    /// assert_eq!(table.capacity(), 0);
    /// ```
    pub fn builder() -> HandleTableBuilder<T> {
        HandleTableBuilder::new()
    }

    /// The number of live handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.storage.as_ref().map_or(0, |storage| storage.used)
    }

    /// Whether no handles are live. This is equivalent to the table being absent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of slots currently backed by storage, or zero if the table is absent.
    ///
    /// # Example
    ///
    /// ```rust
    /// use handle_table::{DEFAULT_CHUNK_SIZE, HandleTable};
    ///
    /// let mut table = HandleTable::<u8>::new();
    /// assert_eq!(table.capacity(), 0);
    ///
    /// let handle = table.allocate().unwrap();
    /// assert_eq!(table.capacity(), DEFAULT_CHUNK_SIZE.get());
    ///
    /// table.free(handle);
    /// assert_eq!(table.capacity(), 0);
    /// ```
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.as_ref().map_or(0, Storage::capacity)
    }

    /// Whether the table currently holds backing storage.
    #[must_use]
    pub fn is_allocated(&self) -> bool {
        self.storage.is_some()
    }

    /// One past the greatest live handle, or zero if there are none.
    ///
    /// Every live handle is below this value, so it bounds a scan over all live handles.
    #[must_use]
    pub fn high_water_mark(&self) -> usize {
        self.storage
            .as_ref()
            .map_or(0, |storage| storage.high_water_mark)
    }

    /// The number of slots added each time the table grows.
    #[must_use]
    pub fn chunk_size(&self) -> NonZero<usize> {
        self.chunk_size
    }

    /// The [drop policy][DropPolicy] the table was built with.
    #[must_use]
    pub fn drop_policy(&self) -> DropPolicy {
        self.drop_policy
    }

    /// The slots of the table, indexed by handle. Empty if the table is absent.
    ///
    /// The view borrows the table, so it must be fetched again after any mutation.
    #[must_use]
    pub fn slots(&self) -> &[Slot<T>] {
        self.storage
            .as_ref()
            .map_or(&[], |storage| storage.slots.as_slice())
    }

    /// Whether `handle` is currently allocated.
    #[must_use]
    pub fn is_valid(&self, handle: usize) -> bool {
        self.slots().get(handle).is_some_and(Slot::is_live)
    }

    /// The value stored at `handle`, if the handle is live and a value has been stored.
    #[must_use]
    pub fn get(&self, handle: usize) -> Option<&T> {
        self.slots().get(handle).and_then(Slot::value)
    }

    /// The value stored at `handle`, if the handle is live and a value has been stored.
    #[must_use]
    pub fn get_mut(&mut self, handle: usize) -> Option<&mut T> {
        self.storage
            .as_mut()
            .and_then(|storage| storage.slots.get_mut(handle))
            .and_then(Slot::value_mut)
    }

    /// Iterates over the live handles in ascending order, including reserved ones.
    pub fn handles(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots()
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_live())
            .map(|(handle, _)| handle)
    }

    /// Iterates over the handles that hold a value, in ascending order, with their values.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.slots()
            .iter()
            .enumerate()
            .filter_map(|(handle, slot)| slot.value().map(|value| (handle, value)))
    }

    /// Allocates a handle and returns it, leaving its slot reserved but without a value.
    ///
    /// The lowest vacant handle is always chosen. If there is none, the table grows by one chunk
    /// and the first handle of the new chunk is returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if storage could not be created or grown. The table is
    /// left as it was.
    ///
    /// # Example
    ///
    /// ```rust
    /// use handle_table::HandleTable;
    ///
    /// let mut table = HandleTable::<u32>::new();
    ///
    /// let a = table.allocate().unwrap();
    /// let b = table.allocate().unwrap();
    /// assert_eq!((a, b), (0, 1));
    ///
    /// table.free(a);
    /// assert_eq!(table.allocate().unwrap(), 0);
    /// # table.free(0);
    /// # table.free(b);
    /// ```
    pub fn allocate(&mut self) -> Result<usize> {
        if self.storage.is_none() {
            self.storage = Some(Storage::try_new(self.chunk_size)?);

            debug!(
                chunk_size = self.chunk_size.get(),
                "handle table storage created"
            );
        }

        let storage = self
            .storage
            .as_mut()
            .expect("storage was created above if it was absent");

        // A freshly created table always has a vacant slot, so a failed growth can only happen
        // to a table that already has live handles and it stays valid as it was.
        let handle = match storage.reserve_lowest_vacant() {
            Some(handle) => handle,
            None => storage.grow_and_reserve(self.chunk_size)?,
        };

        trace!(handle, "handle allocated");

        #[cfg(debug_assertions)]
        self.integrity_check();

        Ok(handle)
    }

    /// Allocates a handle and stores `value` in its slot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if storage could not be created or grown. The table is
    /// left as it was and `value` is dropped.
    pub fn insert(&mut self, value: T) -> Result<usize> {
        let handle = self.allocate()?;

        let previous = self.set(handle, value);
        debug_assert!(previous.is_none(), "a fresh handle cannot already hold a value");

        Ok(handle)
    }

    /// Stores `value` in the slot of a live handle, returning the value it replaced, if any.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is not allocated.
    pub fn set(&mut self, handle: usize, value: T) -> Option<T> {
        let slot = self.live_slot_mut(handle, "set");

        mem::replace(slot, Slot::Occupied(value)).into_value()
    }

    /// Moves the value out of the slot of a live handle, leaving the handle reserved.
    ///
    /// Returns `None` if no value was stored.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is not allocated.
    pub fn take(&mut self, handle: usize) -> Option<T> {
        let slot = self.live_slot_mut(handle, "take");

        mem::replace(slot, Slot::Reserved).into_value()
    }

    fn live_slot_mut(&mut self, handle: usize, operation: &str) -> &mut Slot<T> {
        if let Err(problem) = self.validate(handle) {
            panic!(
                "{operation}({handle}) {problem} in handle table of {}",
                type_name::<T>()
            );
        }

        self.storage
            .as_mut()
            .and_then(|storage| storage.slots.get_mut(handle))
            .expect("handle was validated above")
    }

    /// Frees a handle, dropping any value in its slot, and returns the new high-water mark.
    ///
    /// The returned value is one past the greatest handle that is still live, or zero if this
    /// was the last live handle. In the latter case the table releases all its storage and
    /// becomes absent.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is not allocated. Use [`try_free()`][Self::try_free] if the caller
    /// cannot vouch for the handle.
    ///
    /// # Example
    ///
    /// ```rust
    /// use handle_table::HandleTable;
    ///
    /// let mut table = HandleTable::<u32>::new();
    ///
    /// let a = table.allocate().unwrap();
    /// let b = table.allocate().unwrap();
    /// let c = table.allocate().unwrap();
    ///
    /// // Freeing an interior handle does not move the mark.
    /// assert_eq!(table.free(b), 3);
    /// // Freeing the greatest handle does.
    /// assert_eq!(table.free(c), 1);
    /// // Freeing the last one tears the table down.
    /// assert_eq!(table.free(a), 0);
    /// assert!(!table.is_allocated());
    /// ```
    pub fn free(&mut self, handle: usize) -> usize {
        if let Err(problem) = self.validate(handle) {
            panic!(
                "free({handle}) {problem} in handle table of {}",
                type_name::<T>()
            );
        }

        self.free_validated(handle)
    }

    /// Frees a handle like [`free()`][Self::free] but reports an invalid handle as an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHandle`] if `handle` is not allocated. The table is not modified.
    pub fn try_free(&mut self, handle: usize) -> Result<usize> {
        self.validate(handle)
            .map_err(|problem| Error::InvalidHandle { handle, problem })?;

        Ok(self.free_validated(handle))
    }

    fn validate(&self, handle: usize) -> std::result::Result<(), &'static str> {
        let Some(storage) = &self.storage else {
            return Err("table is not allocated");
        };

        match storage.slots.get(handle) {
            None => Err("handle is beyond table capacity"),
            Some(Slot::Vacant) => Err("slot is vacant"),
            Some(_) => Ok(()),
        }
    }

    fn free_validated(&mut self, handle: usize) -> usize {
        let storage = self
            .storage
            .as_mut()
            .expect("caller validated that the table is allocated");

        let slot = storage
            .slots
            .get_mut(handle)
            .expect("caller validated that the handle is in bounds");

        // Dropped at the end of the function, once the table is consistent again.
        let _previous = mem::replace(slot, Slot::Vacant);

        storage.used = storage
            .used
            .checked_sub(1)
            .expect("the slot was live so used must be non-zero");

        if storage.used == 0 {
            self.storage = None;

            trace!(handle, high_water_mark = 0, "handle freed");
            debug!("handle table storage released");

            return 0;
        }

        let end = handle
            .checked_add(1)
            .expect("handle is below capacity, which fits in memory");

        // Only freeing the greatest live handle can lower the mark.
        if end == storage.high_water_mark {
            storage.high_water_mark = storage.scan_high_water_mark(handle);
        }

        let high_water_mark = storage.high_water_mark;

        trace!(handle, high_water_mark, "handle freed");

        #[cfg(debug_assertions)]
        self.integrity_check();

        high_water_mark
    }

    #[cfg_attr(test, mutants::skip)] // This is essentially test logic, mutation is meaningless.
    #[cfg(debug_assertions)]
    pub(crate) fn integrity_check(&self) {
        let Some(storage) = &self.storage else {
            return;
        };

        let observed_used = storage.slots.iter().filter(|slot| slot.is_live()).count();

        assert!(
            storage.used == observed_used,
            "used {} does not match the observed live slot count {} in handle table of {}",
            storage.used,
            observed_used,
            type_name::<T>()
        );

        assert!(
            storage.used > 0,
            "allocated handle table of {} has no live handles",
            type_name::<T>()
        );

        assert!(
            storage.capacity().checked_rem(self.chunk_size.get()) == Some(0),
            "capacity {} is not a multiple of chunk size {} in handle table of {}",
            storage.capacity(),
            self.chunk_size,
            type_name::<T>()
        );

        let scanned = storage.scan_high_water_mark(storage.capacity());

        assert!(
            storage.high_water_mark == scanned,
            "cached high-water mark {} does not match scanned {} in handle table of {}",
            storage.high_water_mark,
            scanned,
            type_name::<T>()
        );
    }
}

impl<T> Default for HandleTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for HandleTable<T> {
    fn drop(&mut self) {
        let live_handles = self.len();

        // Release the slots first so their values are dropped even if we panic below.
        self.storage = None;

        // If we are already panicking, we do not want to panic again because that will
        // simply obscure whatever the original panic was, leading to debug difficulties.
        if self.drop_policy == DropPolicy::MustNotDropItems && !thread::panicking() {
            assert!(
                live_handles == 0,
                "dropped a handle table of {} with {live_handles} live handles under a policy that says it must be empty when dropped",
                type_name::<T>()
            );
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    #![allow(
        clippy::indexing_slicing,
        reason = "we do not need to worry about these things when writing test code"
    )]

    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::{Arc, Mutex};
    use std::thread;

    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;

    assert_impl_all!(HandleTable<u32>: Send, Sync, std::fmt::Debug);
    assert_not_impl_any!(HandleTable<Rc<u32>>: Send, Sync);

    fn table_with_chunk(chunk_size: usize) -> HandleTable<u32> {
        HandleTable::builder()
            .chunk_size(NonZero::new(chunk_size).unwrap())
            .build()
    }

    #[test]
    fn smoke_test() {
        let mut table = HandleTable::<u32>::new();

        assert!(table.is_empty());
        assert!(!table.is_allocated());

        let a = table.insert(42).unwrap();
        let b = table.insert(43).unwrap();
        let c = table.insert(44).unwrap();

        assert_eq!((a, b, c), (0, 1, 2));
        assert_eq!(table.len(), 3);
        assert_eq!(table.capacity(), DEFAULT_CHUNK_SIZE.get());

        assert_eq!(table.get(a), Some(&42));
        assert_eq!(table.get(b), Some(&43));
        assert_eq!(table.get(c), Some(&44));

        assert_eq!(table.free(b), 3);

        let d = table.insert(45).unwrap();
        assert_eq!(d, b);
        assert_eq!(table.get(d), Some(&45));
    }

    #[test]
    fn first_allocation_creates_one_chunk() {
        let mut table = table_with_chunk(4);

        assert_eq!(table.allocate().unwrap(), 0);

        let storage = table.storage.as_ref().unwrap();
        assert_eq!(storage.slots.len(), 4);
        assert_eq!(storage.used, 1);
        assert_eq!(storage.high_water_mark, 1);
    }

    #[test]
    fn allocated_slot_is_reserved() {
        let mut table = table_with_chunk(4);

        let handle = table.allocate().unwrap();

        assert!(table.is_valid(handle));
        assert_eq!(table.slots()[handle], Slot::Reserved);
        assert_eq!(table.get(handle), None);
    }

    #[test]
    fn fills_chunk_before_growing() {
        let mut table = table_with_chunk(4);

        for expected in 0..4 {
            assert_eq!(table.allocate().unwrap(), expected);
        }

        assert_eq!(table.capacity(), 4);

        assert_eq!(table.allocate().unwrap(), 4);
        assert_eq!(table.capacity(), 8);
        assert!(table.slots()[5..].iter().all(Slot::is_vacant));
    }

    #[test]
    fn fill_lowest_hole_first() {
        let mut table = table_with_chunk(4);

        for _ in 0..8 {
            _ = table.allocate().unwrap();
        }

        table.free(6);
        table.free(1);
        table.free(3);

        assert_eq!(table.allocate().unwrap(), 1);
        assert_eq!(table.allocate().unwrap(), 3);
        assert_eq!(table.allocate().unwrap(), 6);
        assert_eq!(table.allocate().unwrap(), 8);
        assert_eq!(table.capacity(), 12);
    }

    #[test]
    fn free_interior_keeps_mark() {
        let mut table = table_with_chunk(4);

        for _ in 0..3 {
            _ = table.allocate().unwrap();
        }

        assert_eq!(table.free(0), 3);
        assert_eq!(table.high_water_mark(), 3);
    }

    #[test]
    fn free_greatest_skips_holes() {
        let mut table = table_with_chunk(4);

        for _ in 0..6 {
            _ = table.allocate().unwrap();
        }

        table.free(2);
        table.free(3);
        table.free(4);

        // Handles 0, 1 and 5 are live; freeing 5 must skip the hole at 2..5.
        assert_eq!(table.free(5), 2);
        assert_eq!(table.high_water_mark(), 2);
    }

    #[test]
    fn free_last_tears_down() {
        let mut table = table_with_chunk(4);

        for _ in 0..5 {
            _ = table.allocate().unwrap();
        }

        for handle in (1..5).rev() {
            assert_ne!(table.free(handle), 0);
        }

        assert_eq!(table.free(0), 0);
        assert!(!table.is_allocated());
        assert_eq!(table.capacity(), 0);
        assert_eq!(table.high_water_mark(), 0);
        assert!(table.slots().is_empty());
    }

    #[test]
    fn growth_preserves_values() {
        let mut table = table_with_chunk(2);

        let handles: Vec<_> = (0..7_u32).map(|v| table.insert(v * 10).unwrap()).collect();

        for (value, handle) in (0..7_u32).zip(handles) {
            assert_eq!(table.get(handle), Some(&(value * 10)));
        }

        assert_eq!(table.capacity(), 8);
    }

    #[test]
    fn failed_first_allocation_leaves_table_absent() {
        let mut table = HandleTable::<u64>::builder()
            .chunk_size(NonZero::new(usize::MAX).unwrap())
            .build();

        let result = table.allocate();

        assert!(matches!(result, Err(Error::AllocationFailed { .. })));
        assert!(!table.is_allocated());
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn set_take_and_replace() {
        let mut table = HandleTable::<String>::new();

        let handle = table.allocate().unwrap();

        assert_eq!(table.set(handle, "a".to_string()), None);
        assert_eq!(table.set(handle, "b".to_string()), Some("a".to_string()));
        assert_eq!(table.take(handle), Some("b".to_string()));

        // The handle stays live after its value has been taken.
        assert!(table.is_valid(handle));
        assert_eq!(table.take(handle), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn get_mut_modifies_in_place() {
        let mut table = HandleTable::<String>::new();

        let handle = table.insert("Hello".to_string()).unwrap();
        table.get_mut(handle).unwrap().push_str(", World!");

        assert_eq!(table.get(handle).map(String::as_str), Some("Hello, World!"));
        assert_eq!(table.get_mut(99), None);
    }

    #[test]
    fn handles_and_iter_skip_vacant() {
        let mut table = HandleTable::<u32>::new();

        let a = table.insert(1).unwrap();
        let b = table.allocate().unwrap();
        let c = table.insert(3).unwrap();
        let d = table.insert(4).unwrap();
        table.free(c);

        assert_eq!(table.handles().collect::<Vec<_>>(), vec![a, b, d]);
        assert_eq!(table.iter().collect::<Vec<_>>(), vec![(a, &1), (d, &4)]);
    }

    #[test]
    fn free_drops_value() {
        struct Droppable {
            dropped: Rc<Cell<bool>>,
        }

        impl Drop for Droppable {
            fn drop(&mut self) {
                self.dropped.set(true);
            }
        }

        let dropped = Rc::new(Cell::new(false));
        let mut table = HandleTable::<Droppable>::new();

        let handle = table
            .insert(Droppable {
                dropped: Rc::clone(&dropped),
            })
            .unwrap();

        table.free(handle);

        assert!(dropped.get());
    }

    #[test]
    #[should_panic]
    fn free_on_absent_panics() {
        let mut table = HandleTable::<u32>::new();

        table.free(0);
    }

    #[test]
    #[should_panic]
    fn free_vacant_panics() {
        let mut table = HandleTable::<u32>::new();

        _ = table.allocate().unwrap();

        table.free(1);
    }

    #[test]
    #[should_panic]
    fn free_oob_panics() {
        let mut table = HandleTable::<u32>::new();

        _ = table.allocate().unwrap();

        table.free(9_999_999);
    }

    #[test]
    #[should_panic]
    fn double_free_panics() {
        let mut table = HandleTable::<u32>::new();

        let a = table.allocate().unwrap();
        _ = table.allocate().unwrap();

        table.free(a);
        table.free(a);
    }

    #[test]
    #[should_panic]
    fn set_vacant_panics() {
        let mut table = HandleTable::<u32>::new();

        _ = table.allocate().unwrap();

        _ = table.set(3, 5);
    }

    #[test]
    #[should_panic]
    fn take_on_absent_panics() {
        let mut table = HandleTable::<u32>::new();

        _ = table.take(0);
    }

    #[test]
    fn try_free_reports_problem_without_mutation() {
        let mut table = table_with_chunk(4);

        assert!(matches!(
            table.try_free(0),
            Err(Error::InvalidHandle {
                handle: 0,
                problem: "table is not allocated"
            })
        ));

        let handle = table.allocate().unwrap();

        assert!(matches!(
            table.try_free(4),
            Err(Error::InvalidHandle {
                problem: "handle is beyond table capacity",
                ..
            })
        ));
        assert!(matches!(
            table.try_free(1),
            Err(Error::InvalidHandle {
                problem: "slot is vacant",
                ..
            })
        ));

        assert_eq!(table.len(), 1);
        assert_eq!(table.try_free(handle).unwrap(), 0);
    }

    #[test]
    fn multithreaded_via_mutex() {
        let table = Arc::new(Mutex::new(HandleTable::<u32>::new()));

        let a;
        let b;

        {
            let mut table = table.lock().unwrap();
            a = table.insert(42).unwrap();
            b = table.insert(43).unwrap();
        }

        let table_clone = Arc::clone(&table);
        thread::spawn(move || {
            let mut table = table_clone.lock().unwrap();

            table.free(a);

            let c = table.insert(44).unwrap();
            assert_eq!(c, a);
        })
        .join()
        .unwrap();

        let table = table.lock().unwrap();
        assert_eq!(table.get(a), Some(&44));
        assert_eq!(table.get(b), Some(&43));
    }

    #[test]
    #[should_panic]
    fn drop_live_with_forbidden_to_drop_policy_panics() {
        let mut table = HandleTable::<u32>::builder()
            .drop_policy(DropPolicy::MustNotDropItems)
            .build();

        _ = table.insert(123).unwrap();
    }

    #[test]
    fn drop_empty_with_forbidden_to_drop_policy_ok() {
        let mut table = HandleTable::<u32>::builder()
            .drop_policy(DropPolicy::MustNotDropItems)
            .build();

        let handle = table.insert(123).unwrap();
        table.free(handle);

        drop(table);
    }

    #[test]
    fn default_works_fine() {
        let mut table = HandleTable::<u32>::default();

        assert_eq!(table.chunk_size(), DEFAULT_CHUNK_SIZE);
        assert_eq!(table.drop_policy(), DropPolicy::MayDropItems);
        assert_eq!(table.insert(1).unwrap(), 0);
    }
}
