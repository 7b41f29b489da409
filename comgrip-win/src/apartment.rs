//! COM apartment RAII guard.
//!
//! [`ApartmentGuard`] wraps `CoInitializeEx` / `CoUninitialize` in an RAII
//! pattern so that COM apartments are correctly initialised and cleaned up,
//! even on panic or early return.  This is the initialisation token the
//! counted-object runtime requires: acquire it before creating counted
//! objects on a thread, keep it alive while any handle on that thread may
//! still reference them.
//!
//! The `PhantomData<*const ()>` field enforces `!Send` + `!Sync` at compile
//! time, preventing the guard from being moved across thread boundaries
//! (apartment state is per-thread).

use std::marker::PhantomData;

use log;
use windows::Win32::System::Com::{
    CoInitializeEx, CoUninitialize, COINIT, COINIT_APARTMENTTHREADED, COINIT_DISABLE_OLE1DDE,
    COINIT_MULTITHREADED, COINIT_SPEED_OVER_MEMORY,
};

use comgrip_core::errors::GripError;

/// RAII wrapper that calls `CoUninitialize` on `Drop` when appropriate.
///
/// Instantiate **once per thread** via [`ApartmentGuard::init_sta`] or
/// [`ApartmentGuard::init_mta`].  The guard tracks whether `CoInitializeEx`
/// actually succeeded (vs. `RPC_E_CHANGED_MODE`) and only calls
/// `CoUninitialize` when a balancing call is required per MSDN.
#[must_use = "ApartmentGuard must be kept alive for the duration of COM usage"]
pub struct ApartmentGuard {
    should_uninit: bool,
    _not_send: PhantomData<*const ()>,
}

impl ApartmentGuard {
    /// Initialise (or join) a single-threaded apartment on this thread.
    pub fn init_sta() -> Result<Self, GripError> {
        Self::init(COINIT_APARTMENTTHREADED | COINIT_DISABLE_OLE1DDE | COINIT_SPEED_OVER_MEMORY)
    }

    /// Initialise (or join) the multi-threaded apartment on this thread.
    pub fn init_mta() -> Result<Self, GripError> {
        Self::init(COINIT_MULTITHREADED | COINIT_DISABLE_OLE1DDE | COINIT_SPEED_OVER_MEMORY)
    }

    /// Returns `Ok(ApartmentGuard)` for `S_OK`, `S_FALSE`, and
    /// `RPC_E_CHANGED_MODE` (thread already has an apartment of the other
    /// model; COM is usable but we must NOT call `CoUninitialize` since we
    /// did not successfully initialise).
    fn init(flags: COINIT) -> Result<Self, GripError> {
        let hr = unsafe { CoInitializeEx(None, flags) };

        let hresult_value = hr.0 as u32;
        match hresult_value {
            // S_OK (newly initialised) or S_FALSE (already initialised).
            0x0 | 0x1 => Ok(Self {
                should_uninit: true,
                _not_send: PhantomData,
            }),
            // RPC_E_CHANGED_MODE -- thread already has the other apartment
            // model.  COM is usable; log a warning for diagnostics.
            0x8001_0106 => {
                log::warn!(
                    "CoInitializeEx: RPC_E_CHANGED_MODE -- thread already has an apartment \
                     of the other model, using the existing apartment"
                );
                Ok(Self {
                    should_uninit: false,
                    _not_send: PhantomData,
                })
            }
            _ => Err(GripError::ApartmentError(format!(
                "CoInitializeEx failed: HRESULT 0x{hresult_value:08X}"
            ))),
        }
    }
}

impl Drop for ApartmentGuard {
    fn drop(&mut self) {
        if self.should_uninit {
            unsafe { CoUninitialize() };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mta_guard_initialises() {
        let guard = ApartmentGuard::init_mta();
        assert!(guard.is_ok());
    }

    #[test]
    fn test_guard_balances_on_drop() {
        {
            let _guard = ApartmentGuard::init_mta().unwrap();
        }
        // If we can initialise again, the balancing CoUninitialize ran.
        let guard = ApartmentGuard::init_mta();
        assert!(guard.is_ok());
    }
}
