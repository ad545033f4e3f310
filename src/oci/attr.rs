//! Typed access to handle attributes

use std::mem::MaybeUninit;
use libc::c_void;
use crate::{Result, oci};
use super::{OCIStruct, OCIError, OCIAuthInfo};

/// Attribute value that can be read from a handle
pub(crate) trait FromAttr: Sized {
    /// What OCI writes into the attribute buffer
    type Raw;
    fn from_raw(raw: Self::Raw, size: u32) -> Self;
}

/// Attribute value that can be written into a handle
pub(crate) trait ToAttr {
    fn attr_ptr(&self) -> *const c_void;
    /// Size of the value. OCI ignores it for fixed-size values.
    fn attr_len(&self) -> u32 { 0 }
}

/// Reads attribute `attr_type` of the handle `obj` of type `obj_type`.
pub(crate) fn get<V: FromAttr>(obj: &impl OCIStruct, obj_type: u32, attr_type: u32, err: &OCIError) -> Result<V> {
    let mut raw = MaybeUninit::<V::Raw>::uninit();
    let mut size = 0u32;
    oci::attr_get(obj, obj_type, raw.as_mut_ptr() as *mut c_void, &mut size, attr_type, err)?;
    // OCIAttrGet returned success, so the value was written
    let raw = unsafe { raw.assume_init() };
    Ok(V::from_raw(raw, size))
}

/// Writes attribute `attr_type` of the handle `obj` of type `obj_type`.
pub(crate) fn set(obj: &impl OCIStruct, obj_type: u32, attr_type: u32, value: impl ToAttr, err: &OCIError) -> Result<()> {
    oci::attr_set(obj, obj_type, value.attr_ptr(), value.attr_len(), attr_type, err)
}

macro_rules! int_attrs {
    ($($t:ty),+) => {
        $(
            impl FromAttr for $t {
                type Raw = $t;
                fn from_raw(raw: $t, _size: u32) -> Self { raw }
            }
        )+
    };
}

// Statement type is a ub2, counts are ub4
int_attrs!(u16, u32);

impl ToAttr for &str {
    fn attr_ptr(&self) -> *const c_void { self.as_ptr() as *const c_void }
    fn attr_len(&self) -> u32 { self.len() as u32 }
}

// Handle-valued attributes (like the pool's authentication info) are set by passing the
// handle pointer itself.
impl ToAttr for &OCIAuthInfo {
    fn attr_ptr(&self) -> *const c_void { *self as *const OCIAuthInfo as *const c_void }
}
