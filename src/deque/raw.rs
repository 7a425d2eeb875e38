use core::mem;
use core::ptr;

use allocator_api2::alloc::Allocator;

use crate::buckets::Buckets;
use crate::error::{Error, Result};
use crate::position::Position;
use crate::{BUCKET_SIZE, INITIAL_BUCKETS};

use super::iter::RawIter;

/// A double-ended queue over a table of buckets.
pub struct Deque<T, A: Allocator> {
    buckets: Buckets<T, A>,

    /// The first occupied slot.
    ///
    /// Both markers are reset to the zero position whenever the deque becomes empty.
    head: Position,

    /// The last occupied slot, inclusive.
    tail: Position,

    /// The number of occupied slots between `head` and `tail`.
    len: usize,
}

impl<T, A: Allocator> Deque<T, A> {
    /// Create an empty deque that has not allocated.
    pub const fn new_in(alloc: A) -> Deque<T, A> {
        Deque {
            buckets: Buckets::new_in(alloc),
            head: Position::new(0, 0),
            tail: Position::new(0, 0),
            len: 0,
        }
    }

    /// Create a deque holding the values of `iter`, packed from the first slot
    /// of the first bucket with no spare buckets.
    ///
    /// `len` must be the exact number of values `iter` yields.
    pub fn from_exact_iter_in<I>(iter: I, len: usize, alloc: A) -> Result<Deque<T, A>>
    where
        I: IntoIterator<Item = T>,
    {
        let count = len.div_ceil(BUCKET_SIZE);
        let mut deque = Deque {
            buckets: Buckets::with_count_in(count, alloc)?,
            head: Position::new(0, 0),
            tail: Position::new(0, 0),
            len: 0,
        };

        // If the iterator panics, `deque` drops what was written so far.
        let mut values = iter.into_iter();
        for _ in 0..len {
            let Some(value) = values.next() else {
                break;
            };

            // Safety: `count` buckets hold at least `len` slots.
            unsafe { deque.write_back_unchecked(value) };
        }

        Ok(deque)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn allocator(&self) -> &A {
        self.buckets.allocator()
    }

    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.count()
    }

    /// The first occupied slot, or the zero position if the deque is empty.
    #[inline]
    pub fn begin(&self) -> Position {
        self.head
    }

    /// One past the last occupied slot, or the zero position if the deque is empty.
    #[inline]
    pub fn end(&self) -> Position {
        if self.len == 0 {
            self.head
        } else {
            self.tail.forward(1)
        }
    }

    /// The slot holding the element at logical `index`, counted from the front.
    ///
    /// The remainder of the head bucket is used up first; anything past it
    /// is spread over whole buckets.
    #[inline]
    pub fn locate(&self, index: usize) -> Position {
        self.head.forward(index)
    }

    /// Whether the slot at `position` holds a live element.
    #[inline]
    pub fn is_occupied(&self, position: Position) -> bool {
        self.len != 0 && self.head <= position && position <= self.tail
    }

    /// The logical index of an occupied slot.
    #[inline]
    pub fn index_of(&self, position: Position) -> Option<usize> {
        if self.is_occupied(position) {
            Some(position.distance(self.head).unsigned_abs())
        } else {
            None
        }
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index < self.len {
            // Safety: The index is in bounds.
            unsafe { Some(self.get_unchecked(index)) }
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index < self.len {
            // Safety: The index is in bounds.
            unsafe { Some(self.get_unchecked_mut(index)) }
        } else {
            None
        }
    }

    /// # Safety
    ///
    /// `index` must be less than `len`.
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len);

        // Safety: In-bounds indices locate occupied slots.
        unsafe { &*self.buckets.slot(self.locate(index)) }
    }

    /// # Safety
    ///
    /// `index` must be less than `len`.
    #[inline]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len);

        // Safety: In-bounds indices locate occupied slots.
        unsafe { &mut *self.buckets.slot(self.locate(index)) }
    }

    #[inline]
    pub fn get_at(&self, position: Position) -> Option<&T> {
        if self.is_occupied(position) {
            // Safety: Occupied slots lie inside allocated buckets and hold values.
            unsafe { Some(&*self.buckets.slot(position)) }
        } else {
            None
        }
    }

    #[inline]
    pub fn get_at_mut(&mut self, position: Position) -> Option<&mut T> {
        if self.is_occupied(position) {
            // Safety: Occupied slots lie inside allocated buckets and hold values.
            unsafe { Some(&mut *self.buckets.slot(position)) }
        } else {
            None
        }
    }

    /// Swaps the elements at two logical indices.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn swap(&mut self, a: usize, b: usize) {
        assert!(a < self.len, "swap index {a} out of bounds (len {})", self.len);
        assert!(b < self.len, "swap index {b} out of bounds (len {})", self.len);

        // Safety: Both indices locate occupied slots. `ptr::swap` allows `a == b`.
        unsafe {
            let a = self.buckets.slot(self.locate(a));
            let b = self.buckets.slot(self.locate(b));
            ptr::swap(a, b);
        }
    }

    /// Appends an element to the back of the deque.
    ///
    /// The bucket table is grown before anything else changes, so on error the
    /// deque is exactly as it was and `value` is dropped.
    pub fn push_back(&mut self, value: T) -> Result<()> {
        let slot = self.reserve_back()?;

        // Safety: `reserve_back` returns a free slot in an allocated bucket.
        unsafe { self.buckets.slot(slot).write(value) };

        if self.len == 0 {
            self.head = slot;
        }
        self.tail = slot;
        self.len += 1;

        Ok(())
    }

    /// Prepends an element to the front of the deque.
    ///
    /// See [`push_back`](Deque::push_back) for the failure behavior.
    pub fn push_front(&mut self, value: T) -> Result<()> {
        let slot = self.reserve_front()?;

        // Safety: `reserve_front` returns a free slot in an allocated bucket.
        unsafe { self.buckets.slot(slot).write(value) };

        if self.len == 0 {
            self.tail = slot;
        }
        self.head = slot;
        self.len += 1;

        Ok(())
    }

    /// Finds the slot the next back push writes to, growing the table if needed.
    fn reserve_back(&mut self) -> Result<Position> {
        if self.buckets.count() == 0 {
            self.buckets.grow(INITIAL_BUCKETS)?;
        }

        if self.len == 0 {
            return Ok(self.center(0));
        }

        // Room in the tail bucket, or a spare bucket after it.
        let next = self.tail.forward(1);
        if next.bucket() < self.buckets.count() {
            return Ok(next);
        }

        self.grow_table()?;
        Ok(self.tail.forward(1))
    }

    /// Finds the slot the next front push writes to, growing the table if needed.
    fn reserve_front(&mut self) -> Result<Position> {
        if self.buckets.count() == 0 {
            self.buckets.grow(INITIAL_BUCKETS)?;
        }

        if self.len == 0 {
            return Ok(self.center(BUCKET_SIZE - 1));
        }

        // Room in the head bucket, or a spare bucket before it.
        if let Some(previous) = self.head.checked_backward(1) {
            return Ok(previous);
        }

        self.grow_table()?;
        Ok(self.head.backward(1))
    }

    /// The slot at `offset` in the middle bucket, where an empty deque starts.
    fn center(&self, offset: usize) -> Position {
        let position = Position::new(self.buckets.count() / 2, offset);
        log::trace!("empty deque starts at {position:?}");
        position
    }

    /// Grows the table to `2 * count + 1` buckets and moves the markers along.
    fn grow_table(&mut self) -> Result<()> {
        let new_count = self
            .buckets
            .count()
            .checked_mul(2)
            .and_then(|count| count.checked_add(1))
            .ok_or(Error::CapacityOverflow)?;

        let shift = self.buckets.grow(new_count)?;
        self.head = self.head.shifted(shift);
        self.tail = self.tail.shifted(shift);
        Ok(())
    }

    /// Writes `value` into the slot after the tail without checking for room.
    ///
    /// # Safety
    ///
    /// If the deque is non-empty, the slot after the tail must lie inside an allocated
    /// bucket. If it is empty, the head must.
    unsafe fn write_back_unchecked(&mut self, value: T) {
        let slot = if self.len == 0 {
            self.head
        } else {
            self.tail.forward(1)
        };

        // Safety: Guaranteed by the caller.
        unsafe { self.buckets.slot(slot).write(value) };
        self.tail = slot;
        self.len += 1;
    }

    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }

        // Safety: The tail is occupied, and the slot is forgotten right after.
        let value = unsafe { self.buckets.slot(self.tail).read() };
        self.len -= 1;

        if self.len == 0 {
            self.reset_markers();
        } else {
            self.tail.decrement();
        }

        Some(value)
    }

    pub fn pop_front(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }

        // Safety: The head is occupied, and the slot is forgotten right after.
        let value = unsafe { self.buckets.slot(self.head).read() };
        self.len -= 1;

        if self.len == 0 {
            self.reset_markers();
        } else {
            self.head.increment();
        }

        Some(value)
    }

    fn reset_markers(&mut self) {
        self.head = Position::default();
        self.tail = Position::default();
    }

    /// Inserts `value` so that it ends up at logical `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        assert!(
            index <= self.len,
            "insertion index {index} out of bounds (len {})",
            self.len
        );

        if index == 0 {
            return self.push_front(value);
        }

        self.push_back(value)?;

        // Bubble the new element down to its place.
        for i in (index + 1..self.len).rev() {
            self.swap(i, i - 1);
        }

        Ok(())
    }

    /// Removes and returns the element at logical `index`.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }

        if index == self.len - 1 {
            return self.pop_back();
        }

        // Bubble the element up to the front.
        for i in (1..=index).rev() {
            self.swap(i, i - 1);
        }

        self.pop_front()
    }

    /// Drops every element, keeping all buckets as spare capacity.
    pub fn clear(&mut self) {
        let head = self.head;
        let len = mem::replace(&mut self.len, 0);
        self.reset_markers();

        // The length is already zero, so a panicking destructor leaks the rest
        // instead of dropping anything twice.
        for index in 0..len {
            // Safety: These slots were occupied and are no longer tracked.
            unsafe { ptr::drop_in_place(self.buckets.slot(head.forward(index))) };
        }
    }

    /// Clones the elements into a new deque with the same bucket geometry.
    ///
    /// If cloning an element panics, the elements cloned so far are dropped and all
    /// memory of the copy is released.
    pub fn try_clone_in(&self, alloc: A) -> Result<Deque<T, A>>
    where
        T: Clone,
    {
        let mut clone = Deque {
            buckets: Buckets::with_count_in(self.buckets.count(), alloc)?,
            head: self.head,
            tail: self.head,
            len: 0,
        };

        for value in self.iter() {
            // Safety: `value` points at an occupied slot of `self`. The copy has as many
            // buckets as `self`, so every slot occupied in `self` exists in the copy.
            unsafe { clone.write_back_unchecked((*value).clone()) };
        }

        debug_assert_eq!(clone.tail, self.tail);
        Ok(clone)
    }

    pub fn iter(&self) -> RawIter<T> {
        // Safety: `begin..end` covers exactly the occupied slots.
        unsafe { RawIter::new(self.buckets.table(), self.begin(), self.end()) }
    }

    /// Like [`iter`](Deque::iter), for callers that hand out unique references.
    pub fn iter_mut(&mut self) -> RawIter<T> {
        self.iter()
    }

    /// Iterates over the occupied slots in `start..end`.
    ///
    /// # Panics
    ///
    /// Panics if the range is decreasing or not within `begin..=end`.
    pub fn range(&self, start: Position, end: Position) -> RawIter<T> {
        assert!(
            self.begin() <= start && start <= end && end <= self.end(),
            "range {start:?}..{end:?} is not within {:?}..{:?}",
            self.begin(),
            self.end()
        );

        // Safety: Checked above.
        unsafe { RawIter::new(self.buckets.table(), start, end) }
    }
}

impl<T, A: Allocator> Drop for Deque<T, A> {
    fn drop(&mut self) {
        if mem::needs_drop::<T>() {
            self.clear();
        }

        // The buckets themselves are freed by `Buckets`.
    }
}
