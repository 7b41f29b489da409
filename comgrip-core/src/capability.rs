//! Capability identifiers and the counted-object contract.
//!
//! A *counted object* is an externally reference-counted object reached only
//! through typed views.  Each view type implements [`Interface`]: it carries
//! a [`CapabilityId`] naming the capability set it exposes, plus the three
//! lifetime operations (`add_ref` / `release` / `query_capability`) the
//! handle in [`crate::grip`] drives.
//!
//! # Capability-set split
//!
//! The lifetime operations are `unsafe` trait methods, while a view's domain
//! API is its ordinary safe inherent API.  Safe code holding a `&T` obtained
//! from a handle therefore cannot touch the count -- the handle is the only
//! holder of the lifetime-management capability.

use std::ffi::c_void;
use std::fmt;

use crate::errors::GripError;

// ---------------------------------------------------------------------------
// CapabilityId
// ---------------------------------------------------------------------------

/// 128-bit identifier of a capability set, GUID-shaped so that Windows IIDs
/// map onto it losslessly (see `comgrip-win`'s `guid` module).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapabilityId {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

impl CapabilityId {
    /// Build an id from its four GUID fields.
    pub const fn new(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
        Self {
            data1,
            data2,
            data3,
            data4,
        }
    }

    /// Build an id from the `0x11223344_5566_7788_9900_aabbccddeeff` form
    /// used in interface declarations.
    pub const fn from_u128(value: u128) -> Self {
        Self {
            data1: (value >> 96) as u32,
            data2: (value >> 80) as u16,
            data3: (value >> 64) as u16,
            data4: (value as u64).to_be_bytes(),
        }
    }
}

/// Renders the braced uppercase registry form, e.g.
/// `{00000000-0000-0000-C000-000000000046}`.
impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{:08X}-{:04X}-{:04X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}}}",
            self.data1,
            self.data2,
            self.data3,
            self.data4[0],
            self.data4[1],
            self.data4[2],
            self.data4[3],
            self.data4[4],
            self.data4[5],
            self.data4[6],
            self.data4[7],
        )
    }
}

// ---------------------------------------------------------------------------
// Counted-object contract
// ---------------------------------------------------------------------------

/// Contract required of every counted-object view.
///
/// The object's lifetime is governed entirely by a shared count the object
/// itself maintains; views never inspect it, they only drive it through
/// these operations.
///
/// # Safety
///
/// Implementations assert all of the following:
///
/// - `add_ref` increments the shared count and never fails; `release`
///   decrements it, destroying the object when it reaches zero, and never
///   fails.  Both must tolerate being called from any thread the object
///   itself supports -- the handle adds no locking of its own.
/// - `query_capability` follows the out-parameter convention: on `Ok(())`
///   it has deposited into `*out` a non-null pointer to a view of the
///   *same object* that is valid for the requested capability id and
///   carries exactly one fresh count (adopt semantics -- the caller must
///   not increment again).  On `Err` it leaves `*out` null.
/// - A pointer deposited for capability id `U::ID` is valid when
///   reinterpreted as `*mut U`.
pub unsafe trait Interface: 'static {
    /// Capability id of this view type.
    const ID: CapabilityId;

    /// Increment the shared count.
    ///
    /// # Safety
    /// `self` must point into a live counted object.
    unsafe fn add_ref(&self);

    /// Decrement the shared count; the object destroys itself at zero.
    ///
    /// # Safety
    /// `self` must point into a live counted object, and the caller must
    /// own the count being given up.  `self` may dangle once this returns.
    unsafe fn release(&self);

    /// Ask the object for a view of itself exposing capability `id`.
    ///
    /// Distinguishes [`GripError::UnsupportedCapability`] (expected, common)
    /// from [`GripError::QueryFailed`] (a deeper object failure).  The
    /// handle collapses both to an empty result; see
    /// [`Grip::try_cast`](crate::grip::Grip::try_cast).
    ///
    /// # Safety
    /// `self` must point into a live counted object and `out` must be valid
    /// for writing one pointer.
    unsafe fn query_capability(
        &self,
        id: &CapabilityId,
        out: *mut *mut c_void,
    ) -> Result<(), GripError>;
}

/// Type-level statement that every object satisfying `Self` also satisfies
/// `T`, at the same address, without asking the object.
///
/// This is what makes [`Grip::upcast`](crate::grip::Grip::upcast) an
/// infallible increment instead of a runtime query.
///
/// # Safety
///
/// Implementations assert layout compatibility: any valid `*mut Self` is
/// also a valid `*mut T` for the same object, so the handle may reinterpret
/// the pointer freely.
pub unsafe trait Upcast<T: Interface>: Interface {}

// Every capability set trivially satisfies itself.
unsafe impl<T: Interface> Upcast<T> for T {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
