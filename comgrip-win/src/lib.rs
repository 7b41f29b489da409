//! `comgrip_win` -- Windows COM runtime plumbing for `comgrip`.
//!
//! Everything the portable core deliberately leaves to the OS lives here:
//! apartment initialisation, task-memory ownership, and the mapping between
//! [`comgrip_core::capability::CapabilityId`] and the OS `GUID`.
//!
//! The crate compiles to an empty library on non-Windows targets; the
//! `windows` dependency is target-gated accordingly.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`apartment`] | `ApartmentGuard` RAII wrapper for COM apartment init |
//! | [`taskmem`] | `TaskMem<T>` owner of `CoTaskMemAlloc` memory |
//! | [`guid`] | `CapabilityId` ⇄ `GUID` conversion and string form |

#[cfg(windows)]
pub mod apartment;
#[cfg(windows)]
pub mod guid;
#[cfg(windows)]
pub mod taskmem;
