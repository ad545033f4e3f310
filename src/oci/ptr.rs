//! Cell-like pointers to OCI handles

use std::{ptr, ops::Deref};
use libc::c_void;

use super::{OCIStruct, attr::FromAttr};

/// Copy-able wrapper around a pointer to an OCI handle.
pub(crate) struct Ptr<T: OCIStruct> {
    value: *mut T
}

impl<T: OCIStruct> Ptr<T> {
    pub(crate) fn new(ptr: *mut T) -> Self {
        Self{ value: ptr }
    }

    pub(crate) fn null() -> Self {
        Self{ value: ptr::null_mut() }
    }

    pub(crate) fn is_null(&self) -> bool {
        self.value.is_null()
    }

    pub(crate) fn get(&self) -> *mut T {
        self.value
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut *mut T {
        &mut self.value as *mut *mut T
    }

    pub(crate) fn as_mut_void_ptr(&mut self) -> *mut *mut c_void {
        self.as_mut_ptr() as *mut *mut c_void
    }
}

impl<T: OCIStruct> Deref for Ptr<T> {
    type Target = T;

    fn deref(&self) -> &T {
        // OCI structs are opaque and zero-sized on the Rust side. References to them
        // are only ever turned back into pointers when they are passed to OCI.
        unsafe { &*self.value }
    }
}

impl<T: OCIStruct> AsRef<T> for Ptr<T> {
    fn as_ref(&self) -> &T {
        self.deref()
    }
}

impl<T: OCIStruct> Clone for Ptr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: OCIStruct> Copy for Ptr<T> {}

// Attributes like the server handle of a service context are returned as pointers
impl<T: OCIStruct> FromAttr for Ptr<T> {
    type Raw = *mut T;
    fn from_raw(raw: *mut T, _size: u32) -> Self {
        Ptr::new(raw)
    }
}
