//! How a deque's allocator travels when the deque is copied or assigned.
//!
//! Raw memory always comes from an [`Allocator`]. What the deque needs on top
//! of that is a rule for which allocator instance the destination of a copy
//! or an assignment ends up with; [`AllocPolicy`] supplies that rule.

use allocator_api2::alloc::{Allocator, Global};

/// What happens to the allocator of the destination during an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Propagation {
    /// The destination keeps its own allocator.
    Retain,
    /// The destination adopts (a copy of) the source's allocator.
    Propagate,
}

/// Propagation rules for copy assignment and move assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropagationPolicy {
    /// Used by [`Clone::clone_from`] and [`Deque::try_clone_from`](crate::Deque::try_clone_from).
    pub copy_assignment: Propagation,
    /// Used by [`Deque::take_from`](crate::Deque::take_from).
    pub move_assignment: Propagation,
}

impl PropagationPolicy {
    /// Retain on copy assignment, propagate on move assignment.
    pub const STANDARD: PropagationPolicy = PropagationPolicy {
        copy_assignment: Propagation::Retain,
        move_assignment: Propagation::Propagate,
    };

    /// Propagate on every assignment.
    pub const ALWAYS: PropagationPolicy = PropagationPolicy {
        copy_assignment: Propagation::Propagate,
        move_assignment: Propagation::Propagate,
    };

    /// Never propagate; the destination always keeps its allocator.
    pub const NEVER: PropagationPolicy = PropagationPolicy {
        copy_assignment: Propagation::Retain,
        move_assignment: Propagation::Retain,
    };
}

impl Default for PropagationPolicy {
    fn default() -> Self {
        PropagationPolicy::STANDARD
    }
}

/// An allocator that a [`Deque`](crate::Deque) can copy and reassign.
///
/// # Examples
///
/// ```
/// use allocator_api2::alloc::{AllocError, Allocator, Global};
/// use bucket_deque::{AllocPolicy, Deque, PropagationPolicy};
/// use core::alloc::Layout;
/// use core::ptr::NonNull;
///
/// #[derive(Clone, Default)]
/// struct Sticky;
///
/// unsafe impl Allocator for Sticky {
///     fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
///         Global.allocate(layout)
///     }
///
///     unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
///         unsafe { Global.deallocate(ptr, layout) }
///     }
/// }
///
/// impl AllocPolicy for Sticky {
///     const PROPAGATION: PropagationPolicy = PropagationPolicy::NEVER;
/// }
///
/// let mut deque = Deque::new_in(Sticky);
/// deque.push_back(1);
/// assert_eq!(deque, [1]);
/// ```
pub trait AllocPolicy: Allocator + Clone {
    /// How this allocator propagates on assignment.
    const PROPAGATION: PropagationPolicy = PropagationPolicy::STANDARD;

    /// Returns the allocator a copy of a deque using `self` should use.
    fn select_on_copy(&self) -> Self {
        self.clone()
    }
}

impl AllocPolicy for Global {}

impl<A: Allocator + ?Sized> AllocPolicy for &A {}

impl Propagation {
    /// Picks the allocator for the destination of an assignment.
    pub(crate) fn resolve<A: Clone>(self, destination: &A, source: &A) -> A {
        match self {
            Propagation::Retain => destination.clone(),
            Propagation::Propagate => source.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AllocPolicy, Propagation, PropagationPolicy};
    use allocator_api2::alloc::Global;

    #[test]
    fn global_is_standard() {
        assert_eq!(<Global as AllocPolicy>::PROPAGATION, PropagationPolicy::STANDARD);
        assert_eq!(PropagationPolicy::default(), PropagationPolicy::STANDARD);
    }

    #[test]
    fn resolve() {
        assert_eq!(Propagation::Retain.resolve(&1, &2), 1);
        assert_eq!(Propagation::Propagate.resolve(&1, &2), 2);
    }
}
