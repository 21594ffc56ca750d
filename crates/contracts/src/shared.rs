//! Guarded - lock wrapper for the engine's shared map and pose state
//!
//! Access is scoped: the lock is taken for the duration of a closure and
//! released on every exit path, including unwinding.

use std::fmt;
use std::sync::{PoisonError, RwLock};

use grid_map::GridMap;

use crate::Pose;

/// Shared raw/global map
pub type SharedMap = Guarded<GridMap>;

/// Shared pose estimate
pub type SharedPose = Guarded<Pose>;

/// Exclusively owned value behind a read/write lock
pub struct Guarded<T> {
    inner: RwLock<T>,
}

impl<T> Guarded<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: RwLock::new(value),
        }
    }

    /// Run `f` with shared access
    ///
    /// A lock poisoned by a panicking writer is recovered, the value is still
    /// handed out.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Run `f` with exclusive access
    pub fn write<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Copy the value out, holding the lock only across the copy
    pub fn snapshot(&self) -> T
    where
        T: Clone,
    {
        self.read(T::clone)
    }

    /// Swap in a new value, returning the old one
    pub fn replace(&self, value: T) -> T {
        self.write(|v| std::mem::replace(v, value))
    }

    pub fn into_inner(self) -> T {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Default> Default for Guarded<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> fmt::Debug for Guarded<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guarded").finish_non_exhaustive()
    }
}
