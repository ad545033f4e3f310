//! OCI environment

use std::sync::Arc;

use crate::{Error, Result, Session, SessionPool, oci::{self, *}};

/**
Root of everything OCI allocates for this process.

Sessions and pools borrow the environment, so it has to be created first (usually in
`main`) and dropped last.
*/
pub struct Environment {
    env: Arc<Handle<OCIEnv>>,
    err: Handle<OCIError>,
}

impl AsRef<OCIEnv> for Environment {
    fn as_ref(&self) -> &OCIEnv {
        &self.env
    }
}

impl AsRef<OCIError> for Environment {
    fn as_ref(&self) -> &OCIError {
        &self.err
    }
}

impl Environment {
    /**
    Creates the OCI environment.

    The environment is threaded and uses AL32UTF8 for both the database and the
    national character set. Failure here means the client library is unusable.

    # Example

    ```no_run
    let oracle = callproc::Environment::new()?;
    # Ok::<(),callproc::Error>(())
    ```
    */
    pub fn new() -> Result<Self> {
        let mut env_ptr = Ptr::<OCIEnv>::null();
        let res = oci::env_nls_create(env_ptr.as_mut_ptr(), OCI_THREADED, AL32UTF8, AL32UTF8);
        if res != OCI_SUCCESS || env_ptr.is_null() {
            return Err( Error::msg(format!("OCIEnvNlsCreate failed with status {}", res)) );
        }
        let env = Handle::from(env_ptr);
        let err = Handle::<OCIError>::new(&env)?;
        log::debug!("created OCI environment");
        Ok(Self { env: Arc::new(env), err })
    }

    pub(crate) fn get_env(&self) -> Arc<Handle<OCIEnv>> {
        Arc::clone(&self.env)
    }

    /**
    Opens a standalone session.

    # Parameters

    * `dbname` - TNS alias, EZConnect string or full connect descriptor
    * `username` - database user
    * `password` - password of `username`

    Empty `username` and `password` request external authentication.

    # Example

    ```no_run
    let oracle = callproc::Environment::new()?;
    let session = oracle.connect("PDB1", "HEEJONG", "Welcome1")?;
    assert!(session.is_connected()?);
    # Ok::<(),callproc::Error>(())
    ```
    */
    pub fn connect(&self, dbname: &str, username: &str, password: &str) -> Result<Session<'_>> {
        Session::new(self, dbname, username, password)
    }

    /**
    Creates a homogeneous session pool. All pooled sessions belong to `username`.

    # Parameters

    * `dbname`, `username`, `password` - same as for [`Environment::connect`]
    * `min` - sessions opened when the pool is created
    * `inc` - sessions opened at once when the pool needs to grow
    * `max` - upper limit of open sessions, at least 1

    # Example

    ```no_run
    let oracle = callproc::Environment::new()?;
    let pool = oracle.create_session_pool("PDB1", "HEEJONG", "Welcome1", 1, 1, 4)?;
    let session = pool.get_session()?;
    session.ping()?;
    # Ok::<(),callproc::Error>(())
    ```
    */
    pub fn create_session_pool(&self, dbname: &str, username: &str, password: &str, min: usize, inc: usize, max: usize) -> Result<SessionPool<'_>> {
        SessionPool::new(self, dbname, username, password, min, inc, max)
    }
}

/**
Returns the version of the Oracle client library as
`(major, minor, update, patch, port update)`.
*/
pub fn client_version() -> (i32, i32, i32, i32, i32) {
    oci::client_version()
}
