//! Bind variables

use std::{cell::Cell, fmt, rc::Rc};

// Same values as OCI NULL indicators
const IND_NOTNULL : i16 = 0;
const IND_NULL    : i16 = -1;

struct VarData {
    value: Cell<i64>,
    ind:   Cell<i16>,
    len:   Cell<u32>,
}

/**
Numeric bind variable. The value is exchanged with the database as a native 64-bit integer.

A `Var` is a handle. Clones refer to the same storage, which stays at the same address
for as long as any handle to it is alive. A statement keeps a handle to every variable
bound to it, so the variable can be released by the caller at any time after the bind.

# Example

```
let var = callproc::Var::new();
assert!(var.is_null());

var.set_i64(347);
assert_eq!(var.get_i64(), Some(347));

let bound = var.clone();
bound.set_null();
assert_eq!(var.get_i64(), None);
```
*/
#[derive(Clone)]
pub struct Var(Rc<VarData>);

impl Var {
    /// Creates a new variable that holds NULL.
    pub fn new() -> Self {
        Self(Rc::new(VarData {
            value: Cell::new(0),
            ind:   Cell::new(IND_NULL),
            len:   Cell::new(0),
        }))
    }

    /// Writes the value into the variable.
    pub fn set_i64(&self, val: i64) {
        self.0.value.set(val);
        self.0.ind.set(IND_NOTNULL);
        self.0.len.set(std::mem::size_of::<i64>() as u32);
    }

    /// Makes the variable NULL.
    pub fn set_null(&self) {
        self.0.ind.set(IND_NULL);
        self.0.len.set(0);
    }

    /// Returns the value of the variable or `None` if it is NULL.
    pub fn get_i64(&self) -> Option<i64> {
        if self.is_null() {
            None
        } else {
            Some(self.0.value.get())
        }
    }

    pub fn is_null(&self) -> bool {
        self.0.ind.get() != IND_NOTNULL
    }

    /// Reports whether both handles refer to the same variable.
    pub fn same_as(&self, other: &Var) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Capacity of the value buffer in bytes
    #[cfg_attr(not(feature="oci"), allow(dead_code))]
    pub(crate) fn buffer_size(&self) -> usize {
        std::mem::size_of::<i64>()
    }

    #[cfg_attr(not(feature="oci"), allow(dead_code))]
    pub(crate) fn value_ptr(&self) -> *mut i64 {
        self.0.value.as_ptr()
    }

    #[cfg_attr(not(feature="oci"), allow(dead_code))]
    pub(crate) fn ind_ptr(&self) -> *mut i16 {
        self.0.ind.as_ptr()
    }

    #[cfg_attr(not(feature="oci"), allow(dead_code))]
    pub(crate) fn len_ptr(&self) -> *mut u32 {
        self.0.len.as_ptr()
    }
}

impl Default for Var {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get_i64() {
            Some(val) => write!(f, "Var({})", val),
            None => f.write_str("Var(NULL)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_as_null() {
        let var = Var::new();
        assert!(var.is_null());
        assert_eq!(var.get_i64(), None);
        assert_eq!(format!("{var:?}"), "Var(NULL)");
    }

    #[test]
    fn clones_share_storage() {
        let var = Var::new();
        let bound = var.clone();
        bound.set_i64(-42);
        assert!(var.same_as(&bound));
        assert_eq!(var.get_i64(), Some(-42));
        assert_eq!(var.value_ptr(), bound.value_ptr());

        assert!(!var.same_as(&Var::new()));
    }

    #[test]
    fn writes_through_raw_pointers_are_visible() {
        let var = Var::new();
        var.set_i64(347);
        // this is what the client does during execution
        unsafe {
            *var.value_ptr() = 694;
            *var.len_ptr() = 8;
            *var.ind_ptr() = IND_NOTNULL;
        }
        assert_eq!(var.get_i64(), Some(694));

        unsafe {
            *var.ind_ptr() = IND_NULL;
        }
        assert_eq!(var.get_i64(), None);
    }

    #[test]
    fn set_null_clears_value() {
        let var = Var::new();
        var.set_i64(i64::MAX);
        assert_eq!(var.get_i64(), Some(i64::MAX));
        var.set_null();
        assert!(var.is_null());
        assert_eq!(unsafe { *var.len_ptr() }, 0);
        assert_eq!(var.buffer_size(), 8);
    }
}
