// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Intrusive reference counting for GPU-side objects.
//!
//! Every resource carries a [`RefCount`]. Ownership itself is handled by
//! [`Ref`], a shared handle built on [`Arc`] that mirrors the number of live
//! holders into the intrusive counter: cloning a [`Ref`] is `add_ref`, dropping
//! it is `release`. The counter therefore always reports how many handles keep
//! the object alive, and the object is destroyed exactly when it reaches zero.

use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

/// A signed, atomic reference counter.
///
/// Increments and decrements are lock-free and may be issued concurrently from
/// any thread. A freshly constructed counter starts at zero; the first holder
/// adds the first reference.
#[derive(Default)]
pub struct RefCount {
    count: AtomicI32,
}

impl RefCount {
    /// Creates a counter with no holders.
    pub const fn new() -> Self {
        Self {
            count: AtomicI32::new(0),
        }
    }

    /// Registers one more holder.
    pub fn add_ref(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Unregisters one holder.
    ///
    /// Returns `true` when this call released the last reference, i.e. the
    /// post-decrement value is zero and the owner must be destroyed.
    ///
    /// Releasing a counter that is already at zero is a contract violation.
    pub fn release(&self) -> bool {
        let previous = self.count.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(
            previous > 0,
            "released a reference counted object whose count was already {previous}"
        );
        previous == 1
    }

    /// Returns the current number of holders, for diagnostics only.
    pub fn get(&self) -> i32 {
        self.count.load(Ordering::Acquire)
    }
}

impl fmt::Debug for RefCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RefCount").field(&self.get()).finish()
    }
}

/// An object whose lifetime is tracked by an intrusive [`RefCount`].
pub trait RefCounted: Send + Sync {
    /// Returns the object's reference counter.
    fn ref_count(&self) -> &RefCount;

    /// Returns the current number of holders, for diagnostics only.
    fn get_ref_count(&self) -> i32 {
        self.ref_count().get()
    }
}

/// A shared handle to a reference-counted object.
///
/// `Ref` is the only way calling code holds GPU-side objects. The object is
/// destroyed when the last `Ref` pointing at it is dropped.
pub struct Ref<T: ?Sized + RefCounted> {
    inner: Arc<T>,
}

impl<T: RefCounted> Ref<T> {
    /// Takes ownership of `value` and registers the first holder.
    pub fn new(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }
}

impl<T: ?Sized + RefCounted> Ref<T> {
    /// Wraps a freshly allocated object and registers the first holder.
    ///
    /// `arc` must not be shared yet; backends allocate the object, unsize it to
    /// the trait object they return, and hand it over here.
    pub fn from_arc(arc: Arc<T>) -> Self {
        debug_assert_eq!(
            Arc::strong_count(&arc),
            1,
            "Ref::from_arc expects an unshared Arc"
        );
        arc.ref_count().add_ref();
        Self { inner: arc }
    }

    /// Wraps an `Arc` whose reference has already been counted.
    pub(crate) fn adopt(arc: Arc<T>) -> Self {
        Self { inner: arc }
    }

    /// Converts the handle into its `Arc`, transferring the counted reference.
    pub(crate) fn into_arc(self) -> Arc<T> {
        let arc = Arc::clone(&self.inner);
        arc.ref_count().add_ref();
        drop(self);
        arc
    }

    /// Returns the current number of holders of the object.
    pub fn ref_count(&self) -> i32 {
        self.inner.ref_count().get()
    }

    /// Returns `true` if both handles point at the same object.
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&this.inner), Arc::as_ptr(&other.inner))
    }

    /// Returns a non-owning pointer to the underlying `Arc`, for backend-side
    /// lookup tables that must not keep the object alive.
    pub fn downgrade(this: &Self) -> std::sync::Weak<T> {
        Arc::downgrade(&this.inner)
    }
}

impl<T: ?Sized + RefCounted> Clone for Ref<T> {
    fn clone(&self) -> Self {
        self.inner.ref_count().add_ref();
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: ?Sized + RefCounted> Drop for Ref<T> {
    fn drop(&mut self) {
        // The `Arc` field is dropped right after this and frees the object when
        // this was the last holder.
        self.inner.ref_count().release();
    }
}

impl<T: ?Sized + RefCounted> Deref for Ref<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: ?Sized + RefCounted> AsRef<T> for Ref<T> {
    fn as_ref(&self) -> &T {
        &self.inner
    }
}

impl<T: ?Sized + RefCounted + fmt::Debug> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner, f)
    }
}
