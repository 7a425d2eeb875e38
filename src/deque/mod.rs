//! A double-ended queue over a table of fixed-size buckets.
//!
//! See [the crate documentation](crate) and [`Deque`] for details.

use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::{repeat, repeat_with};
use core::mem;
use core::ops::{Index, IndexMut};

use allocator_api2::alloc::{Allocator, Global};

use crate::error::{Error, Result};
use crate::policy::{AllocPolicy, Propagation};
use crate::position::Position;
use crate::BUCKET_SIZE;

mod iter;
mod raw;

pub use iter::{IntoIter, Iter, IterMut};

/// Creates a [`Deque`] containing the given elements.
///
/// `deque!` allows `Deque`s to be defined with the same syntax as array expressions.
/// There are two forms of this macro:
///
/// - Create a [`Deque`] containing a given list of elements:
///
/// ```
/// let deque = bucket_deque::deque![1, 2, 3];
/// assert_eq!(deque[0], 1);
/// assert_eq!(deque[1], 2);
/// assert_eq!(deque[2], 3);
/// ```
///
/// - Create a [`Deque`] from a given element and size:
///
/// ```
/// let deque = bucket_deque::deque![1; 3];
/// assert_eq!(deque, [1, 1, 1]);
/// ```
#[macro_export]
macro_rules! deque {
    () => {
        $crate::Deque::new()
    };
    ($elem:expr; $n:expr) => {
        $crate::Deque::from_elem($elem, $n)
    };
    ($($x:expr),+ $(,)?) => (
        <$crate::Deque<_> as ::core::convert::From<_>>::from([$($x),+])
    );
}

/// A double-ended queue stored in fixed-size buckets.
///
/// Elements live in buckets of [`BUCKET_SIZE`] slots reached through a table of
/// bucket pointers. Growing at either end reallocates only that table, never the
/// elements, and leaves spare buckets on both sides.
///
/// See [the crate documentation](crate) for details.
pub struct Deque<T, A: Allocator = Global> {
    raw: raw::Deque<T, A>,
}

impl<T> Deque<T> {
    /// Constructs a new, empty `Deque<T>`.
    ///
    /// No memory is allocated until the first element is pushed.
    ///
    /// # Examples
    ///
    /// ```
    /// let deque: bucket_deque::Deque<i32> = bucket_deque::Deque::new();
    /// assert_eq!(deque.bucket_count(), 0);
    /// ```
    #[inline]
    pub const fn new() -> Deque<T> {
        Deque::new_in(Global)
    }

    /// Constructs a deque of `len` default values.
    ///
    /// # Examples
    ///
    /// ```
    /// let deque: bucket_deque::Deque<u8> = bucket_deque::Deque::with_len(4);
    /// assert_eq!(deque, [0, 0, 0, 0]);
    /// ```
    pub fn with_len(len: usize) -> Deque<T>
    where
        T: Default,
    {
        Deque::with_len_in(len, Global)
    }

    /// Constructs a deque of `len` clones of `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// let deque = bucket_deque::Deque::from_elem("a", 3);
    /// assert_eq!(deque, ["a", "a", "a"]);
    /// ```
    pub fn from_elem(value: T, len: usize) -> Deque<T>
    where
        T: Clone,
    {
        Deque::from_elem_in(value, len, Global)
    }
}

impl<T, A: Allocator> Deque<T, A> {
    /// Constructs a new, empty deque that allocates from `alloc`.
    ///
    /// # Examples
    ///
    /// ```
    /// use allocator_api2::alloc::Global;
    ///
    /// let mut deque = bucket_deque::Deque::new_in(Global);
    /// deque.push_back(1);
    /// assert_eq!(deque, [1]);
    /// ```
    #[inline]
    pub const fn new_in(alloc: A) -> Deque<T, A> {
        Deque {
            raw: raw::Deque::new_in(alloc),
        }
    }

    /// Constructs a deque of `len` default values in `alloc`.
    pub fn with_len_in(len: usize, alloc: A) -> Deque<T, A>
    where
        T: Default,
    {
        Deque::try_with_len_in(len, alloc).unwrap_or_else(|err| err.escalate())
    }

    /// Constructs a deque of `len` default values in `alloc`, returning an error
    /// if the allocator fails.
    ///
    /// The elements are packed from the first slot of the first bucket, and no
    /// spare buckets are allocated.
    pub fn try_with_len_in(len: usize, alloc: A) -> Result<Deque<T, A>>
    where
        T: Default,
    {
        let values = repeat_with(T::default).take(len);
        Ok(Deque {
            raw: raw::Deque::from_exact_iter_in(values, len, alloc)?,
        })
    }

    /// Constructs a deque of `len` clones of `value` in `alloc`.
    pub fn from_elem_in(value: T, len: usize, alloc: A) -> Deque<T, A>
    where
        T: Clone,
    {
        Deque::try_from_elem_in(value, len, alloc).unwrap_or_else(|err| err.escalate())
    }

    /// Constructs a deque of `len` clones of `value` in `alloc`, returning an error
    /// if the allocator fails.
    pub fn try_from_elem_in(value: T, len: usize, alloc: A) -> Result<Deque<T, A>>
    where
        T: Clone,
    {
        let values = repeat(value).take(len);
        Ok(Deque {
            raw: raw::Deque::from_exact_iter_in(values, len, alloc)?,
        })
    }

    /// Constructs a deque holding the values of `array`, in order, in `alloc`.
    ///
    /// # Examples
    ///
    /// ```
    /// use allocator_api2::alloc::Global;
    ///
    /// let deque = bucket_deque::Deque::from_array_in([1, 2, 3, 4, 5, 6], Global);
    /// assert_eq!(deque.bucket_count(), 2);
    /// assert_eq!(deque, [1, 2, 3, 4, 5, 6]);
    /// ```
    pub fn from_array_in<const N: usize>(array: [T; N], alloc: A) -> Deque<T, A> {
        match raw::Deque::from_exact_iter_in(array, N, alloc) {
            Ok(raw) => Deque { raw },
            Err(err) => err.escalate(),
        }
    }

    /// Returns the number of elements in the deque.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut deque = bucket_deque::Deque::new();
    /// assert_eq!(deque.len(), 0);
    /// deque.push_back(1);
    /// deque.push_front(2);
    /// assert_eq!(deque.len(), 2);
    /// ```
    #[inline]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the deque contains no elements.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut deque = bucket_deque::Deque::new();
    /// assert!(deque.is_empty());
    /// deque.push_back(1);
    /// assert!(!deque.is_empty());
    /// ```
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of allocated buckets, occupied or spare.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut deque = bucket_deque::Deque::new();
    /// deque.push_back(1);
    /// assert_eq!(deque.bucket_count(), 3);
    /// ```
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.raw.bucket_count()
    }

    /// Returns the number of slots in all allocated buckets.
    ///
    /// Not all of them are reachable without growing: a push at one end cannot use
    /// spare slots at the other.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.bucket_count() * BUCKET_SIZE
    }

    /// Returns a reference to the allocator backing this deque.
    #[inline]
    pub fn allocator(&self) -> &A {
        self.raw.allocator()
    }

    /// Returns a reference to the element at the given index.
    ///
    /// # Examples
    ///
    /// ```
    /// let deque = bucket_deque::deque![10, 40, 30];
    /// assert_eq!(Some(&40), deque.get(1));
    /// assert_eq!(None, deque.get(3));
    /// ```
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.raw.get(index)
    }

    /// Returns a mutable reference to the element at the given index.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut deque = bucket_deque::deque![10, 40, 30];
    /// if let Some(x) = deque.get_mut(1) {
    ///     *x = 42;
    /// }
    /// assert_eq!(deque, [10, 42, 30]);
    /// ```
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.raw.get_mut(index)
    }

    /// Returns a reference to the element at the given index, or an error if
    /// the index is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use bucket_deque::Error;
    ///
    /// let deque = bucket_deque::deque![1, 2];
    /// assert_eq!(deque.at(1), Ok(&2));
    /// assert_eq!(deque.at(2), Err(Error::IndexOutOfRange { index: 2, len: 2 }));
    /// ```
    pub fn at(&self, index: usize) -> Result<&T> {
        let len = self.len();
        self.raw.get(index).ok_or(Error::IndexOutOfRange { index, len })
    }

    /// Returns a mutable reference to the element at the given index, or an error
    /// if the index is out of range.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.len();
        self.raw
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })
    }

    /// Returns a reference to the element at the given index, without doing
    /// bounds checking.
    ///
    /// For a safe alternative see [`get`](Deque::get).
    ///
    /// # Safety
    ///
    /// Calling this method with an out-of-bounds index is *[undefined behavior]*
    /// even if the resulting reference is not used.
    ///
    /// [undefined behavior]: https://doc.rust-lang.org/reference/behavior-considered-undefined.html
    ///
    /// # Examples
    ///
    /// ```
    /// let deque = bucket_deque::deque![1, 2, 4];
    ///
    /// unsafe {
    ///     assert_eq!(deque.get_unchecked(1), &2);
    /// }
    /// ```
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        // Safety: Guaranteed by the caller.
        unsafe { self.raw.get_unchecked(index) }
    }

    /// Returns a mutable reference to the element at the given index, without
    /// doing bounds checking.
    ///
    /// For a safe alternative see [`get_mut`](Deque::get_mut).
    ///
    /// # Safety
    ///
    /// Calling this method with an out-of-bounds index is *[undefined behavior]*
    /// even if the resulting reference is not used.
    ///
    /// [undefined behavior]: https://doc.rust-lang.org/reference/behavior-considered-undefined.html
    #[inline]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        // Safety: Guaranteed by the caller.
        unsafe { self.raw.get_unchecked_mut(index) }
    }

    /// Returns the first element, or `None` if the deque is empty.
    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    /// Returns the first element mutably, or `None` if the deque is empty.
    #[inline]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.get_mut(0)
    }

    /// Returns the last element, or `None` if the deque is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut deque = bucket_deque::Deque::new();
    /// assert_eq!(deque.back(), None);
    /// deque.push_back(1);
    /// deque.push_back(2);
    /// assert_eq!(deque.back(), Some(&2));
    /// ```
    #[inline]
    pub fn back(&self) -> Option<&T> {
        self.len().checked_sub(1).and_then(|index| self.get(index))
    }

    /// Returns the last element mutably, or `None` if the deque is empty.
    #[inline]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        let index = self.len().checked_sub(1)?;
        self.get_mut(index)
    }

    /// Returns the element at `position`, or `None` if the slot is not occupied.
    ///
    /// # Examples
    ///
    /// ```
    /// let deque = bucket_deque::deque![1, 2, 3];
    /// assert_eq!(deque.get_at(deque.begin() + 1), Some(&2));
    /// assert_eq!(deque.get_at(deque.end()), None);
    /// ```
    #[inline]
    pub fn get_at(&self, position: Position) -> Option<&T> {
        self.raw.get_at(position)
    }

    /// Returns the element at `position` mutably, or `None` if the slot is not occupied.
    #[inline]
    pub fn get_at_mut(&mut self, position: Position) -> Option<&mut T> {
        self.raw.get_at_mut(position)
    }

    /// Returns the position of the element at `index`, or `None` if the index is
    /// out of bounds.
    #[inline]
    pub fn position(&self, index: usize) -> Option<Position> {
        if index < self.len() {
            Some(self.raw.locate(index))
        } else {
            None
        }
    }

    /// Returns the index of the element at `position`, or `None` if the slot is
    /// not occupied.
    ///
    /// # Examples
    ///
    /// ```
    /// let deque = bucket_deque::deque![1, 2, 3, 4, 5, 6, 7];
    /// assert_eq!(deque.index_of(deque.begin() + 6), Some(6));
    /// assert_eq!(deque.index_of(deque.end()), None);
    /// ```
    #[inline]
    pub fn index_of(&self, position: Position) -> Option<usize> {
        self.raw.index_of(position)
    }

    /// Appends an element to the back of the deque.
    ///
    /// # Panics
    ///
    /// Panics if the number of buckets overflows `usize`. Allocation failure is
    /// reported through [`handle_alloc_error`](alloc::alloc::handle_alloc_error).
    ///
    /// # Examples
    ///
    /// ```
    /// let mut deque = bucket_deque::deque![1, 2];
    /// deque.push_back(3);
    /// assert_eq!(deque, [1, 2, 3]);
    /// ```
    #[inline]
    pub fn push_back(&mut self, value: T) {
        if let Err(err) = self.raw.push_back(value) {
            err.escalate()
        }
    }

    /// Appends an element to the back of the deque, returning an error if the
    /// bucket table cannot grow.
    ///
    /// On error the deque is left exactly as it was, and `value` is dropped.
    #[inline]
    pub fn try_push_back(&mut self, value: T) -> Result<()> {
        self.raw.push_back(value)
    }

    /// Prepends an element to the front of the deque.
    ///
    /// # Panics
    ///
    /// See [`push_back`](Deque::push_back).
    ///
    /// # Examples
    ///
    /// ```
    /// let mut deque = bucket_deque::deque![1, 2];
    /// deque.push_front(0);
    /// assert_eq!(deque, [0, 1, 2]);
    /// ```
    #[inline]
    pub fn push_front(&mut self, value: T) {
        if let Err(err) = self.raw.push_front(value) {
            err.escalate()
        }
    }

    /// Prepends an element to the front of the deque, returning an error if the
    /// bucket table cannot grow.
    ///
    /// On error the deque is left exactly as it was, and `value` is dropped.
    #[inline]
    pub fn try_push_front(&mut self, value: T) -> Result<()> {
        self.raw.push_front(value)
    }

    /// Appends the element returned from the closure `f` to the back of the deque.
    ///
    /// If `f` panics the deque is not modified.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut deque = bucket_deque::deque![0, 1];
    /// deque.emplace_back(|| 2);
    /// assert_eq!(deque, [0, 1, 2]);
    /// ```
    #[inline]
    pub fn emplace_back<F>(&mut self, f: F)
    where
        F: FnOnce() -> T,
    {
        self.push_back(f())
    }

    /// Prepends the element returned from the closure `f` to the front of the deque.
    ///
    /// If `f` panics the deque is not modified.
    #[inline]
    pub fn emplace_front<F>(&mut self, f: F)
    where
        F: FnOnce() -> T,
    {
        self.push_front(f())
    }

    /// Appends the element returned from `f`, returning an error if the bucket
    /// table cannot grow. See [`try_push_back`](Deque::try_push_back).
    #[inline]
    pub fn try_emplace_back<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce() -> T,
    {
        self.raw.push_back(f())
    }

    /// Prepends the element returned from `f`, returning an error if the bucket
    /// table cannot grow. See [`try_push_front`](Deque::try_push_front).
    #[inline]
    pub fn try_emplace_front<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce() -> T,
    {
        self.raw.push_front(f())
    }

    /// Removes the last element and returns it, or `None` if the deque is empty.
    ///
    /// Buckets are never freed by popping.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut deque = bucket_deque::deque![1, 2];
    /// assert_eq!(deque.pop_back(), Some(2));
    /// assert_eq!(deque.pop_back(), Some(1));
    /// assert_eq!(deque.pop_back(), None);
    /// ```
    #[inline]
    pub fn pop_back(&mut self) -> Option<T> {
        self.raw.pop_back()
    }

    /// Removes the first element and returns it, or `None` if the deque is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut deque = bucket_deque::deque![1, 2];
    /// assert_eq!(deque.pop_front(), Some(1));
    /// assert_eq!(deque.pop_front(), Some(2));
    /// assert_eq!(deque.pop_front(), None);
    /// ```
    #[inline]
    pub fn pop_front(&mut self) -> Option<T> {
        self.raw.pop_front()
    }

    /// Inserts `value` before the element at `position`, shifting it and every
    /// element after it one place toward the back.
    ///
    /// `position` may be [`end`](Deque::end) to append. Returns the position of the
    /// inserted element, which accounts for any growth of the bucket table.
    ///
    /// Takes time linear in the number of elements after `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position` is neither occupied nor the end of the deque.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut deque = bucket_deque::deque![1, 2, 4];
    /// let position = deque.insert(deque.begin() + 2, 3);
    /// assert_eq!(deque[position], 3);
    /// assert_eq!(deque, [1, 2, 3, 4]);
    /// ```
    pub fn insert(&mut self, position: Position, value: T) -> Position {
        self.try_insert(position, value)
            .unwrap_or_else(|err| err.escalate())
    }

    /// Inserts `value` before the element at `position`, returning an error if the
    /// bucket table cannot grow.
    ///
    /// On error the deque is left exactly as it was, and `value` is dropped.
    ///
    /// # Panics
    ///
    /// Panics if `position` is neither occupied nor the end of the deque.
    pub fn try_insert(&mut self, position: Position, value: T) -> Result<Position> {
        let index = self.insertion_index(position);
        self.raw.insert(index, value)?;
        Ok(self.raw.locate(index))
    }

    /// Inserts the element returned from the closure `f` before the element at
    /// `position`. See [`insert`](Deque::insert).
    pub fn emplace<F>(&mut self, position: Position, f: F) -> Position
    where
        F: FnOnce() -> T,
    {
        let index = self.insertion_index(position);
        if let Err(err) = self.raw.insert(index, f()) {
            err.escalate()
        }

        self.raw.locate(index)
    }

    /// Removes and returns the element at `position`, shifting every element before
    /// it one place toward the back.
    ///
    /// Takes time linear in the number of elements before `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position` is not occupied.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut deque = bucket_deque::deque![1, 2, 3];
    /// assert_eq!(deque.erase(deque.begin() + 1), 2);
    /// assert_eq!(deque, [1, 3]);
    /// ```
    pub fn erase(&mut self, position: Position) -> T {
        match self.raw.index_of(position).and_then(|index| self.raw.remove(index)) {
            Some(value) => value,
            None => unoccupied(position),
        }
    }

    /// Inserts an element at `index`, shifting every element after it toward the back.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut deque = bucket_deque::deque!['a', 'c'];
    /// deque.insert_at(1, 'b');
    /// assert_eq!(deque, ['a', 'b', 'c']);
    /// ```
    pub fn insert_at(&mut self, index: usize, value: T) {
        if let Err(err) = self.raw.insert(index, value) {
            err.escalate()
        }
    }

    /// Removes and returns the element at `index`, or `None` if it is out of bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut deque = bucket_deque::deque![1, 2, 3];
    /// assert_eq!(deque.remove(1), Some(2));
    /// assert_eq!(deque.remove(5), None);
    /// assert_eq!(deque, [1, 3]);
    /// ```
    pub fn remove(&mut self, index: usize) -> Option<T> {
        self.raw.remove(index)
    }

    /// Swaps the elements at indices `i` and `j`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut deque = bucket_deque::deque![3, 4, 5];
    /// deque.swap(0, 2);
    /// assert_eq!(deque, [5, 4, 3]);
    /// ```
    pub fn swap(&mut self, i: usize, j: usize) {
        self.raw.swap(i, j)
    }

    /// Clears the deque, removing all values.
    ///
    /// Every bucket stays allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut deque = bucket_deque::deque![1, 2, 3];
    /// let buckets = deque.bucket_count();
    /// deque.clear();
    /// assert!(deque.is_empty());
    /// assert_eq!(deque.bucket_count(), buckets);
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear()
    }

    /// The position of the first element.
    ///
    /// Equal to [`end`](Deque::end) if the deque is empty.
    #[inline]
    pub fn begin(&self) -> Position {
        self.raw.begin()
    }

    /// The position one past the last element.
    #[inline]
    pub fn end(&self) -> Position {
        self.raw.end()
    }

    /// Returns an iterator over the elements of the deque, front to back.
    ///
    /// # Examples
    ///
    /// ```
    /// let deque = bucket_deque::deque![1, 2, 4];
    /// let mut iterator = deque.iter();
    ///
    /// assert_eq!(iterator.next(), Some(&1));
    /// assert_eq!(iterator.next_back(), Some(&4));
    /// assert_eq!(iterator.next(), Some(&2));
    /// assert_eq!(iterator.next(), None);
    /// ```
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.raw.iter())
    }

    /// Returns an iterator that allows modifying each element.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut deque = bucket_deque::deque![1, 2, 4];
    /// for x in deque.iter_mut().rev() {
    ///     *x += 2;
    /// }
    /// assert_eq!(deque, [3, 4, 6]);
    /// ```
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self.raw.iter_mut())
    }

    /// Returns an iterator over the elements in `start..end`.
    ///
    /// # Panics
    ///
    /// Panics if `start > end`, or if either position lies outside `begin()..=end()`.
    ///
    /// # Examples
    ///
    /// ```
    /// let deque = bucket_deque::deque![1, 2, 3, 4, 5, 6, 7];
    /// let middle: Vec<_> = deque.range(deque.begin() + 2, deque.end() - 2).collect();
    /// assert_eq!(middle, [&3, &4, &5]);
    /// ```
    pub fn range(&self, start: Position, end: Position) -> Iter<'_, T> {
        Iter::new(self.raw.range(start, end))
    }

    /// Moves the contents out of the deque, leaving it empty and without storage.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut source = bucket_deque::deque![1, 2, 3];
    /// let taken = source.take();
    /// assert_eq!(taken, [1, 2, 3]);
    /// assert!(source.is_empty());
    /// assert_eq!(source.bucket_count(), 0);
    /// ```
    pub fn take(&mut self) -> Deque<T, A>
    where
        A: Clone,
    {
        let empty = Deque::new_in(self.allocator().clone());
        mem::replace(self, empty)
    }

    /// Replaces the contents of `self` with those of `source`, leaving `source` empty.
    ///
    /// If the allocator propagates on move assignment, `self` adopts the storage and
    /// allocator of `source` and the old contents of `self` are dropped. Otherwise
    /// `self` keeps its allocator and buckets, and the elements are moved over one
    /// by one.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut destination = bucket_deque::deque![9, 9];
    /// let mut source = bucket_deque::deque![1, 2, 3];
    /// destination.take_from(&mut source);
    /// assert_eq!(destination, [1, 2, 3]);
    /// assert!(source.is_empty());
    /// ```
    pub fn take_from(&mut self, source: &mut Deque<T, A>)
    where
        A: AllocPolicy,
    {
        match A::PROPAGATION.move_assignment {
            Propagation::Propagate => *self = source.take(),
            Propagation::Retain => {
                self.clear();
                while let Some(value) = source.pop_front() {
                    self.push_back(value);
                }
            }
        }
    }

    /// Clones the deque, returning an error if the allocator fails.
    ///
    /// The copy uses the allocator chosen by [`AllocPolicy::select_on_copy`] and has
    /// the same bucket layout as `self`.
    pub fn try_clone(&self) -> Result<Deque<T, A>>
    where
        T: Clone,
        A: AllocPolicy,
    {
        let alloc = self.allocator().select_on_copy();
        Ok(Deque {
            raw: self.raw.try_clone_in(alloc)?,
        })
    }

    /// Replaces the contents of `self` with a clone of `source`, returning an error
    /// if the allocator fails.
    ///
    /// The replacement is built completely before the current contents are dropped,
    /// so on error `self` is unchanged. Which allocator the replacement uses follows
    /// the copy assignment rule of [`AllocPolicy::PROPAGATION`].
    pub fn try_clone_from(&mut self, source: &Deque<T, A>) -> Result<()>
    where
        T: Clone,
        A: AllocPolicy,
    {
        let alloc = A::PROPAGATION
            .copy_assignment
            .resolve(self.allocator(), source.allocator());

        self.raw = source.raw.try_clone_in(alloc)?;
        Ok(())
    }

    /// The index an insertion before `position` places the new element at.
    fn insertion_index(&self, position: Position) -> usize {
        if position == self.end() {
            return self.len();
        }

        match self.raw.index_of(position) {
            Some(index) => index,
            None => unoccupied(position),
        }
    }
}

#[cold]
#[inline(never)]
#[track_caller]
fn unoccupied(position: Position) -> ! {
    panic!("position {position:?} does not hold an element")
}

#[cold]
#[inline(never)]
#[track_caller]
fn out_of_bounds(index: usize, len: usize) -> ! {
    panic!("index out of bounds: the len is {len} but the index is {index}")
}

impl<T, A: Allocator + Default> Default for Deque<T, A> {
    fn default() -> Deque<T, A> {
        Deque::new_in(A::default())
    }
}

impl<T, A: Allocator> Index<usize> for Deque<T, A> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(value) => value,
            None => out_of_bounds(index, self.len()),
        }
    }
}

impl<T, A: Allocator> IndexMut<usize> for Deque<T, A> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len();
        match self.get_mut(index) {
            Some(value) => value,
            None => out_of_bounds(index, len),
        }
    }
}

impl<T, A: Allocator> Index<Position> for Deque<T, A> {
    type Output = T;

    #[inline]
    fn index(&self, position: Position) -> &T {
        match self.get_at(position) {
            Some(value) => value,
            None => unoccupied(position),
        }
    }
}

impl<T, A: Allocator> IndexMut<Position> for Deque<T, A> {
    #[inline]
    fn index_mut(&mut self, position: Position) -> &mut T {
        match self.get_at_mut(position) {
            Some(value) => value,
            None => unoccupied(position),
        }
    }
}

impl<T, A: Allocator> IntoIterator for Deque<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.raw)
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a Deque<T, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a mut Deque<T, A> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T> FromIterator<T> for Deque<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut deque = Deque::new();
        deque.extend(iter);
        deque
    }
}

impl<T, A: Allocator> Extend<T> for Deque<T, A> {
    #[inline]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push_back(value);
        }
    }
}

impl<'a, T: Copy + 'a, A: Allocator> Extend<&'a T> for Deque<T, A> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied())
    }
}

impl<T, const N: usize> From<[T; N]> for Deque<T> {
    fn from(array: [T; N]) -> Self {
        Deque::from_array_in(array, Global)
    }
}

impl<T: Clone, A: AllocPolicy> Clone for Deque<T, A> {
    fn clone(&self) -> Deque<T, A> {
        self.try_clone().unwrap_or_else(|err| err.escalate())
    }

    fn clone_from(&mut self, source: &Self) {
        if let Err(err) = self.try_clone_from(source) {
            err.escalate()
        }
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for Deque<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, A: Allocator, B: Allocator> PartialEq<Deque<T, B>> for Deque<T, A> {
    fn eq(&self, other: &Deque<T, B>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<U, T, A> PartialEq<U> for Deque<T, A>
where
    U: AsRef<[T]>,
    T: PartialEq,
    A: Allocator,
{
    fn eq(&self, other: &U) -> bool {
        let other = other.as_ref();
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, A: Allocator> Eq for Deque<T, A> {}

impl<T: PartialOrd, A: Allocator> PartialOrd for Deque<T, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord, A: Allocator> Ord for Deque<T, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Hash, A: Allocator> Hash for Deque<T, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for value in self {
            value.hash(state);
        }
    }
}
