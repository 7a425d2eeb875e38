use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ptr::NonNull;

use allocator_api2::alloc::Allocator;

use crate::buckets;
use crate::position::Position;

use super::raw;

/// Traversal of the slots in `front..back`, shared by [`Iter`] and [`IterMut`].
///
/// Yields raw slot pointers; the wrappers decide what kind of reference they become.
pub(crate) struct RawIter<T> {
    table: NonNull<NonNull<T>>,
    front: Position,
    back: Position,
}

impl<T> RawIter<T> {
    /// # Safety
    ///
    /// Every slot in `front..back` must lie in an allocated bucket of `table` and
    /// hold an initialized value for as long as the iterator is used.
    #[inline]
    pub(crate) unsafe fn new(table: NonNull<NonNull<T>>, front: Position, back: Position) -> Self {
        debug_assert!(front <= back);
        RawIter { table, front, back }
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.back.distance(self.front).unsigned_abs()
    }
}

impl<T> Clone for RawIter<T> {
    fn clone(&self) -> Self {
        RawIter {
            table: self.table,
            front: self.front,
            back: self.back,
        }
    }
}

impl<T> Iterator for RawIter<T> {
    type Item = *mut T;

    #[inline]
    fn next(&mut self) -> Option<*mut T> {
        if self.front == self.back {
            return None;
        }

        // Safety: `front` is inside the range, guaranteed valid by the constructor.
        let slot = unsafe { buckets::slot(self.table, self.front) };
        self.front.increment();
        Some(slot)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }

    #[inline]
    fn nth(&mut self, n: usize) -> Option<*mut T> {
        if n >= self.remaining() {
            self.front = self.back;
            return None;
        }

        self.front = self.front.forward(n);
        self.next()
    }
}

impl<T> DoubleEndedIterator for RawIter<T> {
    #[inline]
    fn next_back(&mut self) -> Option<*mut T> {
        if self.front == self.back {
            return None;
        }

        self.back.decrement();
        // Safety: `back` is now inside the range, guaranteed valid by the constructor.
        Some(unsafe { buckets::slot(self.table, self.back) })
    }

    #[inline]
    fn nth_back(&mut self, n: usize) -> Option<*mut T> {
        if n >= self.remaining() {
            self.back = self.front;
            return None;
        }

        self.back = self.back.backward(n);
        self.next_back()
    }
}

impl<T> ExactSizeIterator for RawIter<T> {}

impl<T> FusedIterator for RawIter<T> {}

/// An iterator over the elements of a [`Deque`](crate::Deque).
///
/// This struct is created by [`Deque::iter`](crate::Deque::iter) and
/// [`Deque::range`](crate::Deque::range). Reverse traversal is `iter().rev()`.
pub struct Iter<'a, T> {
    raw: RawIter<T>,
    _marker: PhantomData<&'a T>,
}

// Safety: `Iter` behaves like `&'a T`.
unsafe impl<T: Sync> Send for Iter<'_, T> {}
unsafe impl<T: Sync> Sync for Iter<'_, T> {}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(raw: RawIter<T>) -> Self {
        Iter {
            raw,
            _marker: PhantomData,
        }
    }

    /// The position of the next element yielded from the front.
    ///
    /// Equals [`back_position`](Iter::back_position) once the iterator is exhausted.
    pub fn front_position(&self) -> Position {
        self.raw.front
    }

    /// One past the position of the next element yielded from the back.
    pub fn back_position(&self) -> Position {
        self.raw.back
    }
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            raw: self.raw.clone(),
            _marker: PhantomData,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        // Safety: The slot is occupied and borrowed for `'a`.
        self.raw.next().map(|slot| unsafe { &*slot })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.raw.size_hint()
    }

    #[inline]
    fn nth(&mut self, n: usize) -> Option<&'a T> {
        // Safety: See `next`.
        self.raw.nth(n).map(|slot| unsafe { &*slot })
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a T> {
        // Safety: See `next`.
        self.raw.next_back().map(|slot| unsafe { &*slot })
    }

    #[inline]
    fn nth_back(&mut self, n: usize) -> Option<&'a T> {
        // Safety: See `next`.
        self.raw.nth_back(n).map(|slot| unsafe { &*slot })
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

/// Formats the elements an iterator has left as a list.
struct Remaining<'a, T>(Iter<'a, T>);

impl<T: fmt::Debug> fmt::Debug for Remaining<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.clone()).finish()
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Iter").field(&Remaining(self.clone())).finish()
    }
}

/// A mutable iterator over the elements of a [`Deque`](crate::Deque).
///
/// This struct is created by [`Deque::iter_mut`](crate::Deque::iter_mut).
pub struct IterMut<'a, T> {
    raw: RawIter<T>,
    _marker: PhantomData<&'a mut T>,
}

// Safety: `IterMut` behaves like `&'a mut T`.
unsafe impl<T: Send> Send for IterMut<'_, T> {}
unsafe impl<T: Sync> Sync for IterMut<'_, T> {}

impl<'a, T> IterMut<'a, T> {
    pub(crate) fn new(raw: RawIter<T>) -> Self {
        IterMut {
            raw,
            _marker: PhantomData,
        }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    #[inline]
    fn next(&mut self) -> Option<&'a mut T> {
        // Safety: The slot is occupied, and every slot is yielded at most once.
        self.raw.next().map(|slot| unsafe { &mut *slot })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.raw.size_hint()
    }

    #[inline]
    fn nth(&mut self, n: usize) -> Option<&'a mut T> {
        // Safety: See `next`.
        self.raw.nth(n).map(|slot| unsafe { &mut *slot })
    }
}

impl<'a, T> DoubleEndedIterator for IterMut<'a, T> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a mut T> {
        // Safety: See `next`.
        self.raw.next_back().map(|slot| unsafe { &mut *slot })
    }

    #[inline]
    fn nth_back(&mut self, n: usize) -> Option<&'a mut T> {
        // Safety: See `next`.
        self.raw.nth_back(n).map(|slot| unsafe { &mut *slot })
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

impl<T> FusedIterator for IterMut<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for IterMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Only shared references are created, and only while `self` is borrowed.
        let remaining = Remaining(Iter::new(self.raw.clone()));
        f.debug_tuple("IterMut").field(&remaining).finish()
    }
}

/// An iterator that moves out of a deque.
///
/// This struct is created by the `into_iter` method on [`Deque`](crate::Deque)
/// (provided by the [`IntoIterator`] trait).
pub struct IntoIter<T, A: Allocator> {
    inner: raw::Deque<T, A>,
}

impl<T, A: Allocator> IntoIter<T, A> {
    pub(crate) fn new(inner: raw::Deque<T, A>) -> Self {
        IntoIter { inner }
    }
}

impl<T, A: Allocator> Iterator for IntoIter<T, A> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        self.inner.pop_front()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.inner.len();
        (len, Some(len))
    }
}

impl<T, A: Allocator> DoubleEndedIterator for IntoIter<T, A> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        self.inner.pop_back()
    }
}

impl<T, A: Allocator> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: Allocator> FusedIterator for IntoIter<T, A> {}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let remaining = Remaining(Iter::new(self.inner.iter()));
        f.debug_tuple("IntoIter").field(&remaining).finish()
    }
}
