//! Physical addressing inside the bucket table.
//!
//! A [`Position`] is a `(bucket, offset)` pair read as a mixed-radix number
//! with radix [`BUCKET_SIZE`]: the offset is the low digit, the bucket index
//! the high one. Every cursor, marker and iterator of the deque is expressed
//! in terms of this one type.

use core::fmt;
use core::ops::{Add, AddAssign, Sub, SubAssign};

use crate::BUCKET_SIZE;

/// A slot in a deque's bucket table.
///
/// Positions are the random-access cursors of [`Deque`](crate::Deque). They are
/// plain values: they borrow nothing, and they are ordered lexicographically by
/// `(bucket, offset)`. A position obtained from one deque is only meaningful for
/// that deque, and only until the bucket table is reallocated by a growing push.
/// Dereferencing goes through the deque ([`Deque::get_at`](crate::Deque::get_at)
/// or indexing), which checks that the slot is occupied.
///
/// # Examples
///
/// ```
/// let deque = bucket_deque::deque![1, 2, 3, 4, 5, 6, 7];
///
/// let begin = deque.begin();
/// let end = deque.end();
/// assert_eq!(end - begin, 7);
///
/// let third = begin + 2;
/// assert_eq!(deque[third], 3);
/// assert_eq!(deque[end - 1], 7);
/// assert!(begin < third && third < end);
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    // Field order matters: the derived ordering is lexicographic.
    bucket: usize,
    offset: usize,
}

impl Position {
    /// Creates a position, carrying an offset of `BUCKET_SIZE` or more into the following buckets.
    ///
    /// # Examples
    ///
    /// ```
    /// use bucket_deque::{Position, BUCKET_SIZE};
    ///
    /// let end = Position::new(2, BUCKET_SIZE);
    /// assert_eq!((end.bucket(), end.offset()), (3, 0));
    /// ```
    #[inline]
    pub const fn new(bucket: usize, offset: usize) -> Position {
        Position {
            bucket: bucket + offset / BUCKET_SIZE,
            offset: offset % BUCKET_SIZE,
        }
    }

    /// The index of the bucket in the table.
    #[inline]
    pub const fn bucket(self) -> usize {
        self.bucket
    }

    /// The slot within the bucket, always less than [`BUCKET_SIZE`].
    #[inline]
    pub const fn offset(self) -> usize {
        self.offset
    }

    /// Moves `n` slots toward the back.
    ///
    /// The remaining room in the current bucket is consumed first, whatever is
    /// left over is split into whole buckets and a final offset.
    #[inline]
    pub const fn forward(self, n: usize) -> Position {
        let room = BUCKET_SIZE - 1 - self.offset;
        if n <= room {
            return Position {
                bucket: self.bucket,
                offset: self.offset + n,
            };
        }

        // Step onto the first slot of the next bucket, then count from there.
        let rest = n - room - 1;
        Position {
            bucket: self.bucket + 1 + rest / BUCKET_SIZE,
            offset: rest % BUCKET_SIZE,
        }
    }

    /// Moves `n` slots toward the front, or returns `None` if that would pass slot `(0, 0)`.
    #[inline]
    pub const fn checked_backward(self, n: usize) -> Option<Position> {
        if n <= self.offset {
            return Some(Position {
                bucket: self.bucket,
                offset: self.offset - n,
            });
        }

        // Step onto the last slot of the previous bucket, then count from there.
        let rest = n - self.offset - 1;
        let crossed = 1 + rest / BUCKET_SIZE;
        if crossed > self.bucket {
            return None;
        }

        Some(Position {
            bucket: self.bucket - crossed,
            offset: BUCKET_SIZE - 1 - rest % BUCKET_SIZE,
        })
    }

    /// Moves `n` slots toward the front.
    ///
    /// # Panics
    ///
    /// Panics if the result would lie before slot `(0, 0)`.
    #[inline]
    pub fn backward(self, n: usize) -> Position {
        match self.checked_backward(n) {
            Some(position) => position,
            None => underflow(self, n),
        }
    }

    /// Moves by a signed number of slots; negative values move toward the front.
    ///
    /// # Panics
    ///
    /// Panics if the result would lie before slot `(0, 0)`.
    #[inline]
    pub fn advance(self, n: isize) -> Position {
        if n < 0 {
            self.backward(n.unsigned_abs())
        } else {
            self.forward(n.unsigned_abs())
        }
    }

    /// The signed number of slots from `origin` to `self`.
    ///
    /// This is the mixed-radix difference of the two `(bucket, offset)` pairs, so for
    /// `a <= b`, `b.distance(a)` is the number of [`increment`](Position::increment)s
    /// that take `a` to `b`.
    #[inline]
    pub const fn distance(self, origin: Position) -> isize {
        let buckets = self.bucket as isize - origin.bucket as isize;
        buckets * BUCKET_SIZE as isize + self.offset as isize - origin.offset as isize
    }

    /// Steps one slot toward the back.
    #[inline]
    pub fn increment(&mut self) {
        if self.offset < BUCKET_SIZE - 1 {
            self.offset += 1;
        } else {
            self.bucket += 1;
            self.offset = 0;
        }
    }

    /// Steps one slot toward the front.
    ///
    /// # Panics
    ///
    /// Panics if `self` is slot `(0, 0)`.
    #[inline]
    pub fn decrement(&mut self) {
        if self.offset > 0 {
            self.offset -= 1;
        } else if self.bucket > 0 {
            self.bucket -= 1;
            self.offset = BUCKET_SIZE - 1;
        } else {
            underflow(*self, 1);
        }
    }

    /// The same slot after `buckets` fresh buckets were placed in front of the table.
    #[inline]
    pub(crate) const fn shifted(self, buckets: usize) -> Position {
        Position {
            bucket: self.bucket + buckets,
            offset: self.offset,
        }
    }
}

#[cold]
#[inline(never)]
fn underflow(position: Position, n: usize) -> ! {
    panic!("cannot move {position:?} back by {n} slots");
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.bucket, self.offset)
    }
}

impl Add<isize> for Position {
    type Output = Position;

    #[inline]
    fn add(self, n: isize) -> Position {
        self.advance(n)
    }
}

impl AddAssign<isize> for Position {
    #[inline]
    fn add_assign(&mut self, n: isize) {
        *self = self.advance(n);
    }
}

impl Sub<isize> for Position {
    type Output = Position;

    #[inline]
    fn sub(self, n: isize) -> Position {
        match n.checked_neg() {
            Some(n) => self.advance(n),
            // `isize::MIN` has no positive counterpart.
            None => self.forward(n.unsigned_abs()),
        }
    }
}

impl SubAssign<isize> for Position {
    #[inline]
    fn sub_assign(&mut self, n: isize) {
        *self = *self - n;
    }
}

impl Sub for Position {
    type Output = isize;

    #[inline]
    fn sub(self, origin: Position) -> isize {
        self.distance(origin)
    }
}
