//! Error types for `comgrip_core`.
//!
//! All failures across the workspace are funnelled through [`GripError`],
//! which uses `thiserror` for `Display` and `Error` derives.  The Windows
//! apartment variant lives here too, keeping `comgrip-win` free of its own
//! error plumbing.
//!
//! Note that most handle operations cannot fail at all: a failed capability
//! query is collapsed to an empty handle by [`Grip::try_cast`], and the one
//! true contract violation (a write slot requested on a non-empty handle) is
//! a panic, not an `Err`.
//!
//! [`Grip::try_cast`]: crate::grip::Grip::try_cast

use thiserror::Error;

use crate::capability::CapabilityId;

/// Top-level error type for the `comgrip` workspace.
///
/// Each variant corresponds to a distinct subsystem.
#[derive(Debug, Error)]
pub enum GripError {
    /// The counted object does not expose the requested capability.
    ///
    /// Expected and common; `try_cast` maps it to an empty handle.
    #[error("UnsupportedCapability: {0}")]
    UnsupportedCapability(CapabilityId),

    /// A capability query failed for a reason other than "not supported"
    /// (a deeper object-level failure).  Also mapped to an empty handle,
    /// after a `log::warn!`.
    #[error("QueryFailed: {0}")]
    QueryFailed(String),

    /// COM apartment initialisation failure (`comgrip-win`).
    #[error("ApartmentError: {0}")]
    ApartmentError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_display_includes_capability_id() {
        let err = GripError::UnsupportedCapability(CapabilityId::from_u128(
            0x00000000_0000_0000_C000_000000000046,
        ));
        let msg = err.to_string();
        assert!(msg.starts_with("UnsupportedCapability: "));
        assert!(msg.contains("{00000000-0000-0000-C000-000000000046}"));
    }

    #[test]
    fn test_query_failed_display() {
        let err = GripError::QueryFailed("object is disconnected".into());
        assert_eq!(err.to_string(), "QueryFailed: object is disconnected");
    }
}
