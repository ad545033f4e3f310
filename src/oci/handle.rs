//! Owned OCI handles

use std::ops::Deref;
use crate::{Error, Result, oci};
use super::{*, attr::{FromAttr, ToAttr}};

/// OCI handle that this crate allocates and frees itself
pub(crate) trait HandleType: OCIStruct {
    const HTYPE: u32;
}

macro_rules! handle_types {
    ($($handle:ty: $htype:expr),+) => {
        $(
            impl HandleType for $handle { const HTYPE: u32 = $htype; }
        )+
    };
}

handle_types!(
    OCIEnv:      OCI_HTYPE_ENV,
    OCIError:    OCI_HTYPE_ERROR,
    OCIAuthInfo: OCI_HTYPE_AUTHINFO,
    OCISPool:    OCI_HTYPE_SPOOL
);

/// Handle that is freed with `OCIHandleFree` when dropped
pub(crate) struct Handle<T: HandleType> {
    ptr: Ptr<T>,
}

// The environment is created in threaded mode, so it and the error handles can be
// shared between threads.
unsafe impl Send for Handle<OCIEnv> {}
unsafe impl Sync for Handle<OCIEnv> {}
unsafe impl Send for Handle<OCIError> {}
unsafe impl Sync for Handle<OCIError> {}

impl<T: HandleType> Drop for Handle<T> {
    fn drop(&mut self) {
        if self.ptr.is_null() {
            return;
        }
        log::trace!("freeing handle type {}", T::HTYPE);
        oci::handle_free(self.ptr.get().cast(), T::HTYPE);
    }
}

impl<T: HandleType> Deref for Handle<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.ptr
    }
}

impl<T: HandleType> AsRef<T> for Handle<T> {
    fn as_ref(&self) -> &T {
        &self.ptr
    }
}

impl<T: HandleType> Handle<T> {
    /// Allocates a new handle in the environment.
    pub(crate) fn new(env: &impl AsRef<OCIEnv>) -> Result<Self> {
        let mut ptr = Ptr::<T>::null();
        oci::handle_alloc(env.as_ref(), ptr.as_mut_void_ptr(), T::HTYPE)?;
        if ptr.is_null() {
            return Err( Error::msg(format!("OCIHandleAlloc returned NULL for handle type {}", T::HTYPE)) );
        }
        log::trace!("allocated handle type {}", T::HTYPE);
        Ok(Self { ptr })
    }

    /// Takes ownership of a handle that was created by a dedicated OCI function
    /// (like `OCIEnvNlsCreate`).
    pub(crate) fn from(ptr: Ptr<T>) -> Self {
        Self { ptr }
    }

    pub(crate) fn get_attr<V: FromAttr>(&self, attr_type: u32, err: &OCIError) -> Result<V> {
        attr::get(self.as_ref(), T::HTYPE, attr_type, err)
    }

    pub(crate) fn set_attr(&self, attr_type: u32, value: impl ToAttr, err: &OCIError) -> Result<()> {
        attr::set(self.as_ref(), T::HTYPE, attr_type, value, err)
    }
}
