//! [`Grip`]: the reference-counted interface-pointer handle.
//!
//! A `Grip<T>` owns zero or one count of a counted object viewed through
//! capability set `T`.  Every path that stores a reference either adopts a
//! count the caller already produced (`from_raw`, `attach`, the write slot)
//! or takes a fresh one (`Clone`, `reset`, `upcast`, `try_cast`), and every
//! path that lets go of a reference releases exactly once (`Drop`, `clear`,
//! replacement) or hands the count onward (`detach`).
//!
//! # Ownership discipline
//!
//! The handle has no locking of its own and is `!Send + !Sync`; each grip
//! belongs to one logical owner at a time.  Sharing the *referenced* object
//! across threads is the object's own affair -- its count must already be
//! safe for concurrent increment/decrement.
//!
//! # Replacement ordering
//!
//! `reset` increments the incoming reference *before* releasing the
//! outgoing one, so `g.reset(g.as_raw())` never drives the count through a
//! transient zero.

use std::ffi::c_void;
use std::fmt;
use std::ptr::NonNull;

use log;

use crate::capability::{Interface, Upcast};
use crate::errors::GripError;

// ---------------------------------------------------------------------------
// Grip
// ---------------------------------------------------------------------------

/// Owning handle to at most one count of a counted object satisfying `T`.
pub struct Grip<T: Interface> {
    // Same layout as `*mut T` (guaranteed null-pointer optimisation); the
    // write slot below relies on this.  Never exposed mutably except
    // through the bookkeeping operations.
    ptr: Option<NonNull<T>>,
}

impl<T: Interface> Grip<T> {
    /// An empty handle.  No side effect.
    pub const fn null() -> Self {
        Self { ptr: None }
    }

    /// Adopt a raw reference that already carries exactly one count.
    ///
    /// The handle does not increment; it becomes responsible for the one
    /// release.  A null `raw` yields an empty handle.
    ///
    /// # Safety
    /// `raw` must be null or a valid `T` view whose count the caller
    /// transfers to the handle.
    pub unsafe fn from_raw(raw: *mut T) -> Self {
        Self {
            ptr: NonNull::new(raw),
        }
    }

    /// Store `raw` without incrementing, releasing any previously-held
    /// reference.
    ///
    /// # Safety
    /// Same contract as [`Grip::from_raw`].
    pub unsafe fn attach(&mut self, raw: *mut T) {
        let old = std::mem::replace(&mut self.ptr, NonNull::new(raw));
        if let Some(old) = old {
            old.as_ref().release();
        }
    }

    /// Hand the held raw reference -- and responsibility for its count --
    /// to the caller.  The handle becomes empty; nothing is released.
    /// Returns null if the handle was already empty.
    pub fn detach(&mut self) -> *mut T {
        self.ptr.take().map_or(std::ptr::null_mut(), NonNull::as_ptr)
    }

    /// Replace the held reference with a newly-owned count of `raw`.
    ///
    /// Increments `raw` (if non-null) before releasing the old reference,
    /// so resetting a handle to the object it already holds is a no-op on
    /// the count.
    ///
    /// # Safety
    /// `raw` must be null or a valid `T` view of a live counted object.
    pub unsafe fn reset(&mut self, raw: *mut T) {
        let incoming = NonNull::new(raw);
        if let Some(p) = incoming {
            p.as_ref().add_ref();
        }
        let old = std::mem::replace(&mut self.ptr, incoming);
        if let Some(old) = old {
            old.as_ref().release();
        }
    }

    /// Release the held reference (if any) and leave the handle empty.
    pub fn clear(&mut self) {
        if let Some(old) = self.ptr.take() {
            unsafe { old.as_ref().release() };
        }
    }

    /// Observe the held raw reference; null if empty.  No count traffic.
    pub fn as_raw(&self) -> *mut T {
        self.ptr.map_or(std::ptr::null_mut(), NonNull::as_ptr)
    }

    /// Borrow the held view.
    ///
    /// The lifetime operations on `T` are `unsafe` trait methods, so safe
    /// code cannot disturb the count through this borrow -- only the
    /// object's domain API is reachable.
    pub fn as_ref(&self) -> Option<&T> {
        // Held pointer is valid while the grip owns a count of it.
        self.ptr.map(|p| unsafe { p.as_ref() })
    }

    pub fn is_null(&self) -> bool {
        self.ptr.is_none()
    }

    /// Expose a write slot for an out-parameter producer (a factory or
    /// capability query that deposits a pre-counted reference).
    ///
    /// Only an empty handle may offer its storage: overwriting a held
    /// reference here would silently leak its count.
    ///
    /// # Panics
    /// Panics if the handle is non-empty.  Use [`Grip::reput`] at call
    /// sites that intend to overwrite.
    pub fn put(&mut self) -> Slot<'_, T> {
        assert!(
            self.ptr.is_none(),
            "write slot requested on a non-empty Grip"
        );
        Slot { slot: &mut self.ptr }
    }

    /// Release any held reference, then expose the write slot.
    pub fn reput(&mut self) -> Slot<'_, T> {
        self.clear();
        self.put()
    }

    /// Convert to a capability set `U` that `T` statically satisfies.
    ///
    /// Never queries the object: takes one fresh count and reinterprets
    /// the pointer (sound per the [`Upcast`] contract).  An empty handle
    /// converts to an empty handle.
    pub fn upcast<U: Interface>(&self) -> Grip<U>
    where
        T: Upcast<U>,
    {
        Grip {
            ptr: self.ptr.map(|p| {
                unsafe { p.as_ref().add_ref() };
                p.cast::<U>()
            }),
        }
    }

    /// Convert to a capability set `U` by asking the object.
    ///
    /// Yields an empty handle when the source is empty, when the object
    /// reports the capability unsupported, or when the query fails for any
    /// other reason -- the object model offers callers no finer-grained
    /// signal worth surfacing here, so all three collapse to "unavailable".
    /// The unexpected-failure branch is logged before collapsing.
    pub fn try_cast<U: Interface>(&self) -> Grip<U> {
        let Some(ptr) = self.ptr else {
            return Grip::null();
        };

        let mut result = Grip::<U>::null();
        let status = {
            let mut slot = result.put();
            // On success the object deposits a pre-counted view straight
            // into the slot; on failure it leaves the slot null.
            unsafe { ptr.as_ref().query_capability(&U::ID, slot.as_void_out()) }
        };

        match status {
            Ok(()) => result,
            Err(GripError::UnsupportedCapability(_)) => Grip::null(),
            Err(err) => {
                log::warn!("query for capability {} failed: {err}", U::ID);
                Grip::null()
            }
        }
    }
}

impl<T: Interface> Default for Grip<T> {
    fn default() -> Self {
        Self::null()
    }
}

/// Takes one fresh count of the referenced object (no-op on an empty
/// handle).
impl<T: Interface> Clone for Grip<T> {
    fn clone(&self) -> Self {
        if let Some(p) = self.ptr {
            unsafe { p.as_ref().add_ref() };
        }
        Self { ptr: self.ptr }
    }
}

/// Releases the held count exactly once; no-op on an empty handle.
impl<T: Interface> Drop for Grip<T> {
    fn drop(&mut self) {
        if let Some(p) = self.ptr {
            unsafe { p.as_ref().release() };
        }
    }
}

impl<T: Interface> fmt::Debug for Grip<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grip")
            .field("capability", &format_args!("{}", T::ID))
            .field("ptr", &self.as_raw())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Slot
// ---------------------------------------------------------------------------

/// Transient write slot borrowed from an empty [`Grip`].
///
/// An out-parameter producer writes a pre-counted raw reference through
/// [`Slot::as_out`] (or [`Slot::as_void_out`]); when the slot's borrow
/// ends, the grip owns whatever was deposited, adopt-style.  If the
/// producer writes nothing the grip is simply still empty.
pub struct Slot<'a, T: Interface> {
    slot: &'a mut Option<NonNull<T>>,
}

impl<T: Interface> Slot<'_, T> {
    /// Storage location for the producer to write into.
    ///
    /// `Option<NonNull<T>>` is layout-identical to `*mut T` with null
    /// mapping to `None`, so the deposited pointer lands directly in the
    /// grip's storage.
    pub fn as_out(&mut self) -> *mut *mut T {
        (self.slot as *mut Option<NonNull<T>>).cast()
    }

    /// Untyped form of [`Slot::as_out`], for producers that traffic in
    /// `void` pointers.
    pub fn as_void_out(&mut self) -> *mut *mut c_void {
        self.as_out().cast()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
