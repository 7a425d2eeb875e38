//! The storage primitive behind [`Deque`](crate::Deque): an indirection table of
//! fixed-size buckets that can grow at both ends.
//!
//! `Buckets` owns raw memory only. It allocates and frees buckets and the table
//! that points at them, but it never reads, writes or drops an element; which
//! slots hold values is tracked by the deque on top of it.

use core::alloc::Layout;
use core::marker::PhantomData;
use core::mem::{self, size_of};
use core::ops::Range;
use core::panic::{RefUnwindSafe, UnwindSafe};
use core::ptr::{self, NonNull};

use allocator_api2::alloc::Allocator;

use crate::error::{Error, Result};
use crate::position::Position;
use crate::BUCKET_SIZE;

/// An indirection table of buckets holding [`BUCKET_SIZE`] slots each.
pub(crate) struct Buckets<T, A: Allocator> {
    /// Pointer to `count` bucket pointers, dangling while `count == 0`.
    table: NonNull<NonNull<T>>,

    /// The number of allocated buckets.
    count: usize,

    alloc: A,

    _marker: PhantomData<T>,
}

// Safety:
// - `T: Send` is required since the buckets hold `T`s that are dropped by the owner.
// - `A: Send` is required since the allocator frees the buckets on whichever thread drops us.
unsafe impl<T: Send, A: Allocator + Send> Send for Buckets<T, A> {}

// Safety: Shared access only hands out shared access to slots, hence `T: Sync`,
// and shared access to the allocator, hence `A: Sync`.
unsafe impl<T: Sync, A: Allocator + Sync> Sync for Buckets<T, A> {}

// Since we act like we own a `T`, we inherit its unwind-safety-ness.
impl<T: UnwindSafe, A: Allocator + UnwindSafe> UnwindSafe for Buckets<T, A> {}
impl<T: RefUnwindSafe, A: Allocator + RefUnwindSafe> RefUnwindSafe for Buckets<T, A> {}

impl<T, A: Allocator> Buckets<T, A> {
    /// An empty table that has not allocated anything.
    pub const fn new_in(alloc: A) -> Self {
        Buckets {
            table: NonNull::dangling(),
            count: 0,
            alloc,
            _marker: PhantomData,
        }
    }

    /// A table of `count` fresh buckets.
    pub fn with_count_in(count: usize, alloc: A) -> Result<Self> {
        let mut buckets = Buckets::new_in(alloc);
        buckets.grow(count)?;
        Ok(buckets)
    }

    /// The number of allocated buckets.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// The raw table, for iterators that outlive a borrow of `self`.
    #[inline]
    pub fn table(&self) -> NonNull<NonNull<T>> {
        self.table
    }

    /// A pointer to the slot at `position`.
    ///
    /// # Safety
    ///
    /// `position.bucket()` must be less than [`count`](Buckets::count).
    #[inline]
    pub unsafe fn slot(&self, position: Position) -> *mut T {
        debug_assert!(position.bucket() < self.count);

        // Safety: Guaranteed by the caller.
        unsafe { slot(self.table, position) }
    }

    /// Grows the table to `new_count` buckets.
    ///
    /// Fresh buckets are split between the front and the back of the existing
    /// ones, with the front receiving the smaller half. Returns the number of
    /// buckets placed in front, which is how far every existing bucket index
    /// moved. Does nothing and returns zero if the table is already large enough.
    ///
    /// On error, everything allocated during the call has been released and
    /// `self` is unchanged.
    pub fn grow(&mut self, new_count: usize) -> Result<usize> {
        if new_count <= self.count {
            return Ok(0);
        }

        let fresh = new_count - self.count;
        let before = fresh / 2;
        let after = before + self.count..new_count;

        let mut pending = PendingTable::allocate(&self.alloc, new_count)?;
        for index in (0..before).chain(after) {
            pending.fill(index)?;
        }
        let table = pending.commit();

        // Safety: The new table has room for the old bucket pointers between the two
        // runs of fresh buckets, and the two allocations are distinct.
        unsafe {
            ptr::copy_nonoverlapping(
                self.table.as_ptr(),
                table.as_ptr().add(before),
                self.count,
            );
        }

        log::debug!(
            "bucket table grew from {} to {} buckets ({} placed in front)",
            self.count,
            new_count,
            before
        );

        // The bucket pointers now live in the new table, only the old array is freed.
        let old = mem::replace(&mut self.table, table);
        // Safety: `old` was allocated by `self.alloc` with `table_layout(self.count)`.
        unsafe { deallocate_table(&self.alloc, old, self.count) };
        self.count = new_count;

        Ok(before)
    }
}

impl<T, A: Allocator> Drop for Buckets<T, A> {
    fn drop(&mut self) {
        for index in 0..self.count {
            // Safety: Every entry below `count` holds a bucket we allocated.
            unsafe {
                let bucket = *self.table.as_ptr().add(index);
                deallocate_bucket(&self.alloc, bucket);
            }
        }

        // Safety: The table was allocated with this layout (or is dangling while empty).
        unsafe { deallocate_table(&self.alloc, self.table, self.count) };
    }
}

/// A pointer to the slot at `position` of `table`.
///
/// # Safety
///
/// `position.bucket()` must index an allocated bucket of `table`.
#[inline]
pub(crate) unsafe fn slot<T>(table: NonNull<NonNull<T>>, position: Position) -> *mut T {
    // Safety: Guaranteed by the caller; offsets are always below `BUCKET_SIZE`.
    unsafe {
        let bucket = *table.as_ptr().add(position.bucket());
        bucket.as_ptr().add(position.offset())
    }
}

/// A table under construction.
///
/// Holds every bucket allocated so far and releases all of it, table included,
/// when dropped. [`commit`](PendingTable::commit) hands ownership to the caller.
struct PendingTable<'a, T, A: Allocator> {
    alloc: &'a A,
    table: NonNull<NonNull<T>>,
    len: usize,
    filled: [Range<usize>; 2],
}

impl<'a, T, A: Allocator> PendingTable<'a, T, A> {
    fn allocate(alloc: &'a A, len: usize) -> Result<Self> {
        let layout = table_layout::<T>(len)?;
        let table = match alloc.allocate(layout) {
            Ok(ptr) => ptr.cast::<NonNull<T>>(),
            Err(_) => return Err(allocation_failure(layout)),
        };

        Ok(PendingTable {
            alloc,
            table,
            len,
            filled: [0..0, 0..0],
        })
    }

    /// Allocates a bucket into entry `index`.
    ///
    /// Entries must be filled in ascending order, in at most two contiguous runs.
    fn fill(&mut self, index: usize) -> Result<()> {
        debug_assert!(index < self.len);

        let bucket = allocate_bucket::<T, A>(self.alloc)?;

        // Safety: `index` is in bounds of the table.
        unsafe { self.table.as_ptr().add(index).write(bucket) };

        let [first, second] = &mut self.filled;
        if first.is_empty() {
            *first = index..index + 1;
        } else if first.end == index {
            first.end += 1;
        } else if second.is_empty() {
            *second = index..index + 1;
        } else {
            debug_assert_eq!(second.end, index);
            second.end += 1;
        }

        Ok(())
    }

    fn commit(self) -> NonNull<NonNull<T>> {
        let table = self.table;
        mem::forget(self);
        table
    }
}

impl<T, A: Allocator> Drop for PendingTable<'_, T, A> {
    fn drop(&mut self) {
        for index in self.filled.clone().into_iter().flatten() {
            // Safety: Every entry in a filled run holds a bucket we allocated.
            unsafe {
                let bucket = *self.table.as_ptr().add(index);
                deallocate_bucket(self.alloc, bucket);
            }
        }

        // Safety: The table was allocated with this layout.
        unsafe { deallocate_table(self.alloc, self.table, self.len) };
    }
}

fn table_layout<T>(len: usize) -> Result<Layout> {
    Ok(Layout::array::<NonNull<T>>(len)?)
}

fn bucket_layout<T>() -> Result<Layout> {
    Ok(Layout::array::<T>(BUCKET_SIZE)?)
}

#[cold]
fn allocation_failure(layout: Layout) -> Error {
    log::warn!("allocation of {} bytes for deque storage failed", layout.size());
    Error::AllocationFailure { layout }
}

fn allocate_bucket<T, A: Allocator>(alloc: &A) -> Result<NonNull<T>> {
    if size_of::<T>() == 0 {
        return Ok(NonNull::dangling());
    }

    let layout = bucket_layout::<T>()?;
    match alloc.allocate(layout) {
        Ok(ptr) => Ok(ptr.cast::<T>()),
        Err(_) => Err(allocation_failure(layout)),
    }
}

/// # Safety
///
/// `bucket` must come from [`allocate_bucket`] with the same allocator.
unsafe fn deallocate_bucket<T, A: Allocator>(alloc: &A, bucket: NonNull<T>) {
    if size_of::<T>() == 0 {
        return;
    }

    // Safety: The layout was valid when the bucket was allocated.
    unsafe {
        let layout = Layout::array::<T>(BUCKET_SIZE).unwrap_unchecked();
        alloc.deallocate(bucket.cast::<u8>(), layout);
    }
}

/// # Safety
///
/// `table` must hold `len` bucket pointers allocated by `alloc`, or be dangling with `len == 0`.
unsafe fn deallocate_table<T, A: Allocator>(alloc: &A, table: NonNull<NonNull<T>>, len: usize) {
    if len == 0 {
        return;
    }

    // Safety: The layout was valid when the table was allocated.
    unsafe {
        let layout = Layout::array::<NonNull<T>>(len).unwrap_unchecked();
        alloc.deallocate(table.cast::<u8>(), layout);
    }
}

#[cfg(test)]
mod tests {
    use super::Buckets;
    use crate::position::Position;
    use crate::BUCKET_SIZE;

    use allocator_api2::alloc::{AllocError, Allocator, Global};
    use core::alloc::Layout;
    use core::cell::Cell;
    use core::ptr::NonNull;

    /// Counts live allocations and fails once the budget runs out.
    #[derive(Default)]
    struct Budget {
        remaining: Cell<Option<usize>>,
        live: Cell<usize>,
    }

    impl Budget {
        fn limited(allocations: usize) -> Self {
            Budget {
                remaining: Cell::new(Some(allocations)),
                live: Cell::new(0),
            }
        }
    }

    unsafe impl Allocator for Budget {
        fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
            if let Some(remaining) = self.remaining.get() {
                if remaining == 0 {
                    return Err(AllocError);
                }
                self.remaining.set(Some(remaining - 1));
            }

            let ptr = Global.allocate(layout)?;
            self.live.set(self.live.get() + 1);
            Ok(ptr)
        }

        unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
            self.live.set(self.live.get() - 1);
            unsafe { Global.deallocate(ptr, layout) }
        }
    }

    #[test]
    fn new_allocates_nothing() {
        let budget = Budget::limited(0);
        let buckets = Buckets::<u32, _>::new_in(&budget);
        assert_eq!(buckets.count(), 0);
        drop(buckets);
        assert_eq!(budget.live.get(), 0);
    }

    #[test]
    fn grow_splits_fresh_buckets() {
        let budget = Budget::default();
        let mut buckets = Buckets::<u32, _>::new_in(&budget);

        assert_eq!(buckets.grow(3).unwrap(), 1);
        assert_eq!(buckets.count(), 3);
        // One table plus three buckets.
        assert_eq!(budget.live.get(), 4);

        assert_eq!(buckets.grow(2).unwrap(), 0);
        assert_eq!(buckets.count(), 3);

        // 7 = 2 * 3 + 1: four fresh buckets, two on each side.
        assert_eq!(buckets.grow(7).unwrap(), 2);
        assert_eq!(buckets.count(), 7);
        assert_eq!(budget.live.get(), 8);

        drop(buckets);
        assert_eq!(budget.live.get(), 0);
    }

    #[test]
    fn grow_preserves_contents() {
        let mut buckets = Buckets::<usize, _>::with_count_in(3, Global).unwrap();
        for bucket in 0..3 {
            for offset in 0..BUCKET_SIZE {
                let position = Position::new(bucket, offset);
                unsafe { buckets.slot(position).write(bucket * BUCKET_SIZE + offset) };
            }
        }

        let shift = buckets.grow(7).unwrap();
        for bucket in 0..3 {
            for offset in 0..BUCKET_SIZE {
                let position = Position::new(bucket + shift, offset);
                assert_eq!(unsafe { *buckets.slot(position) }, bucket * BUCKET_SIZE + offset);
            }
        }
    }

    #[test]
    fn failed_grow_rolls_back() {
        // Room for the first table and its three buckets, then the new table and
        // two of the four fresh buckets.
        let budget = Budget::limited(4 + 3);
        let mut buckets = Buckets::<u64, _>::new_in(&budget);
        buckets.grow(3).unwrap();

        let err = buckets.grow(7).unwrap_err();
        assert!(matches!(err, crate::Error::AllocationFailure { .. }));
        assert_eq!(buckets.count(), 3);
        assert_eq!(budget.live.get(), 4);

        drop(buckets);
        assert_eq!(budget.live.get(), 0);
    }

    #[test]
    fn failed_table_allocation() {
        let budget = Budget::limited(0);
        let mut buckets = Buckets::<u64, _>::new_in(&budget);
        assert!(buckets.grow(3).is_err());
        assert_eq!(buckets.count(), 0);
        assert_eq!(budget.live.get(), 0);
    }

    #[test]
    fn zero_sized_buckets() {
        let budget = Budget::default();
        let buckets = Buckets::<(), _>::with_count_in(5, &budget).unwrap();
        // Only the table itself is allocated.
        assert_eq!(budget.live.get(), 1);
        drop(buckets);
        assert_eq!(budget.live.get(), 0);
    }
}
