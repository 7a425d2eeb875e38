#![doc = include_str!("../README.md")]
#![deny(unsafe_op_in_unsafe_fn)]
#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod buckets;

pub mod deque;
pub mod error;
pub mod policy;
pub mod position;

#[doc(inline)]
pub use deque::{Deque, IntoIter, Iter, IterMut};

#[doc(inline)]
pub use error::{Error, Result};

#[doc(inline)]
pub use policy::{AllocPolicy, Propagation, PropagationPolicy};

#[doc(inline)]
pub use position::Position;

/// The number of slots in every bucket.
pub const BUCKET_SIZE: usize = 5;

/// The number of buckets allocated by the first push into a deque without storage.
pub const INITIAL_BUCKETS: usize = 3;
