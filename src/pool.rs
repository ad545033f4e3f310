//! Session pool

use std::{sync::Arc, marker::PhantomData};

use crate::{Error, Result, Environment, Session, oci::{self, *}};

/**
OCI session pool. Sessions taken from it are returned to it when they are dropped.

The pool is homogeneous: every session is authenticated as the user the pool was
created for.
*/
pub struct SessionPool<'a> {
    env:  Arc<Handle<OCIEnv>>,
    err:  Handle<OCIError>,
    spool: Handle<OCISPool>,
    name: String,
    phantom_env: PhantomData<&'a Environment>
}

impl Drop for SessionPool<'_> {
    fn drop(&mut self) {
        log::debug!("destroying session pool {}", self.name);
        oci::session_pool_destroy(&self.spool, &self.err);
    }
}

impl<'a> SessionPool<'a> {
    pub(crate) fn new(env: &'a Environment, dbname: &str, username: &str, password: &str, min: usize, inc: usize, max: usize) -> Result<Self> {
        if max == 0 {
            return Err( Error::new("Session pool maximum size must be at least 1") );
        }
        let err = Handle::<OCIError>::new(env)?;

        let auth = Handle::<OCIAuthInfo>::new(env)?;
        auth.set_attr(OCI_ATTR_DRIVER_NAME, env!("CARGO_PKG_NAME"), &err)?;
        let spool = Handle::<OCISPool>::new(env)?;
        spool.set_attr(OCI_ATTR_SPOOL_AUTH, &*auth, &err)?;

        let mut name_ptr = std::ptr::null::<u8>();
        let mut name_len = 0u32;
        oci::session_pool_create(
            env.as_ref(), &err, &spool, &mut name_ptr, &mut name_len,
            dbname, min as u32, max as u32, inc as u32, username, password,
            OCI_SPC_HOMOGENEOUS | OCI_SPC_STMTCACHE
        )?;
        // OCI owns the name buffer
        let name = if name_ptr.is_null() {
            String::new()
        } else {
            let bytes = unsafe { std::slice::from_raw_parts(name_ptr, name_len as usize) };
            String::from_utf8_lossy(bytes).into_owned()
        };
        log::debug!("created session pool {name} for {dbname} ({min}..{max} sessions)");
        Ok(Self { env: env.get_env(), err, spool, name, phantom_env: PhantomData })
    }

    pub(crate) fn get_env(&self) -> Arc<Handle<OCIEnv>> {
        Arc::clone(&self.env)
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Takes a session from the pool. The session goes back to the pool when it is dropped.
    pub fn get_session(&self) -> Result<Session<'_>> {
        Session::from_session_pool(self)
    }

    /**
    Takes a session from the pool and makes the session the pool's owner. The pool is
    destroyed right after the session is released.

    # Example

    ```no_run
    let oracle = callproc::Environment::new()?;
    let pool = oracle.create_session_pool("PDB1", "HEEJONG", "Welcome1", 1, 0, 1)?;
    let session = pool.into_session()?;
    session.ping()?;
    # Ok::<(),callproc::Error>(())
    ```
    */
    pub fn into_session(self) -> Result<Session<'a>> {
        Session::from_owned_pool(self)
    }

    /// Number of sessions currently taken from the pool
    pub fn busy_count(&self) -> Result<usize> {
        let count : u32 = self.spool.get_attr(OCI_ATTR_SPOOL_BUSY_COUNT, &self.err)?;
        Ok(count as usize)
    }

    /// Number of sessions the pool has open
    pub fn open_count(&self) -> Result<usize> {
        let count : u32 = self.spool.get_attr(OCI_ATTR_SPOOL_OPEN_COUNT, &self.err)?;
        Ok(count as usize)
    }
}
