//! Owner of COM task memory.
//!
//! Many COM calls return buffers allocated with `CoTaskMemAlloc` that the
//! caller must free with `CoTaskMemFree`.  [`TaskMem`] is the move-only
//! owner of one such allocation: free-on-drop, `put()` for the
//! out-parameter convention, `detach()` to hand the allocation onward.
//!
//! Unlike [`comgrip_core::grip::Grip`] there is no count to balance, so
//! copying is simply not offered rather than guarded.

use std::ffi::c_void;

use windows::Win32::System::Com::CoTaskMemFree;

/// Move-only owner of a `CoTaskMemAlloc` allocation, freed on drop.
pub struct TaskMem<T> {
    ptr: *mut T,
}

impl<T> TaskMem<T> {
    /// An empty owner.
    pub const fn null() -> Self {
        Self {
            ptr: std::ptr::null_mut(),
        }
    }

    /// Adopt an allocation produced by the task allocator.
    ///
    /// # Safety
    /// `ptr` must be null or a live `CoTaskMemAlloc` allocation valid as a
    /// `T`, not owned elsewhere.
    pub unsafe fn from_raw(ptr: *mut T) -> Self {
        Self { ptr }
    }

    /// Observe the held allocation; null if empty.
    pub fn as_raw(&self) -> *mut T {
        self.ptr
    }

    pub fn as_ref(&self) -> Option<&T> {
        // Valid while owned, per the from_raw contract.
        unsafe { self.ptr.as_ref() }
    }

    pub fn as_mut(&mut self) -> Option<&mut T> {
        unsafe { self.ptr.as_mut() }
    }

    /// Hand the allocation -- and responsibility for freeing it -- to the
    /// caller.  Returns null if empty.
    pub fn detach(&mut self) -> *mut T {
        std::mem::replace(&mut self.ptr, std::ptr::null_mut())
    }

    /// Free the held allocation (if any) and store `ptr` in its place.
    ///
    /// # Safety
    /// Same contract as [`TaskMem::from_raw`].
    pub unsafe fn reset(&mut self, ptr: *mut T) {
        let old = std::mem::replace(&mut self.ptr, ptr);
        if !old.is_null() {
            CoTaskMemFree(Some(old as *const c_void));
        }
    }

    /// Free any held allocation, then expose the storage for an
    /// out-parameter producer to write a fresh allocation into.
    pub fn put(&mut self) -> *mut *mut T {
        unsafe { self.reset(std::ptr::null_mut()) };
        &mut self.ptr
    }

    /// Untyped form of [`TaskMem::put`].
    pub fn put_void(&mut self) -> *mut *mut c_void {
        self.put().cast()
    }
}

impl<T> Default for TaskMem<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T> Drop for TaskMem<T> {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            unsafe { CoTaskMemFree(Some(self.ptr as *const c_void)) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use windows::Win32::System::Com::CoTaskMemAlloc;

    fn alloc_u32(value: u32) -> *mut u32 {
        let p = unsafe { CoTaskMemAlloc(std::mem::size_of::<u32>()) } as *mut u32;
        assert!(!p.is_null());
        unsafe { p.write(value) };
        p
    }

    #[test]
    fn test_owns_and_reads_allocation() {
        let mem = unsafe { TaskMem::from_raw(alloc_u32(7)) };
        assert_eq!(mem.as_ref().copied(), Some(7));
    }

    #[test]
    fn test_detach_hands_allocation_onward() {
        let mut mem = unsafe { TaskMem::from_raw(alloc_u32(7)) };
        let raw = mem.detach();
        assert!(mem.as_raw().is_null());
        assert!(!raw.is_null());
        unsafe { CoTaskMemFree(Some(raw as *const c_void)) };
    }

    #[test]
    fn test_put_frees_old_and_accepts_new() {
        let mut mem = unsafe { TaskMem::from_raw(alloc_u32(1)) };
        let slot = mem.put();
        unsafe { *slot = alloc_u32(2) };
        assert_eq!(mem.as_ref().copied(), Some(2));
    }

    #[test]
    fn test_null_owner_is_inert() {
        let mem: TaskMem<u32> = TaskMem::null();
        assert!(mem.as_ref().is_none());
        drop(mem); // frees nothing
    }
}
