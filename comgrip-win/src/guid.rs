//! `CapabilityId` ⇄ `GUID` interop.
//!
//! The core's [`CapabilityId`] is deliberately GUID-shaped; the free
//! functions here map it losslessly onto `windows::core::GUID` and render
//! the OS string form via `StringFromGUID2`.  (Orphan rules keep these as
//! functions rather than `From` impls: both types are foreign to this
//! crate.)

use comgrip_core::capability::CapabilityId;
use windows::core::GUID;
use windows::Win32::System::Com::StringFromGUID2;

/// Map a capability id onto the identical OS `GUID`.
pub fn to_guid(id: &CapabilityId) -> GUID {
    GUID {
        data1: id.data1,
        data2: id.data2,
        data3: id.data3,
        data4: id.data4,
    }
}

/// Map an OS `GUID` onto the identical capability id.
pub fn from_guid(guid: &GUID) -> CapabilityId {
    CapabilityId::new(guid.data1, guid.data2, guid.data3, guid.data4)
}

/// Render a `GUID` in the braced registry form via `StringFromGUID2`.
///
/// Assumes no non-ASCII character, which holds for every GUID rendering.
pub fn guid_to_string(guid: &GUID) -> String {
    let mut buf = [0u16; 64];
    let wrote = unsafe { StringFromGUID2(guid, &mut buf) };
    if wrote <= 1 {
        return String::new();
    }
    // `wrote` counts the terminating null.
    String::from_utf16_lossy(&buf[..(wrote - 1) as usize])
}
