//! User Session

use std::{sync::Arc, marker::PhantomData};
use crate::{Result, Environment, SessionPool, Statement, Var, oci::{self, attr, *}};

/// Database session. The session is released (or returned to its pool) when dropped.
pub struct Session<'a> {
    svc: Ptr<OCISvcCtx>,
    err: Handle<OCIError>,
    // OCI keeps a reference to it for the lifetime of the session
    _auth: Handle<OCIAuthInfo>,
    env: Arc<Handle<OCIEnv>>,
    // Only set when the session was the reason the pool was created. Fields drop after
    // `Drop::drop` has released the session.
    _pool: Option<SessionPool<'a>>,
    phantom_env: PhantomData<&'a Environment>
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        log::debug!("releasing session");
        oci::session_release(&self.svc, &self.err);
    }
}

impl AsRef<OCIEnv> for Session<'_> {
    fn as_ref(&self) -> &OCIEnv {
        &*self.env
    }
}

impl AsRef<OCIError> for Session<'_> {
    fn as_ref(&self) -> &OCIError {
        &*self.err
    }
}

impl AsRef<OCISvcCtx> for Session<'_> {
    fn as_ref(&self) -> &OCISvcCtx {
        &*self.svc
    }
}

impl<'a> Session<'a> {
    pub(crate) fn new(env: &'a Environment, dbname: &str, username: &str, password: &str) -> Result<Self> {
        let err = Handle::<OCIError>::new(env)?;
        let auth = Handle::<OCIAuthInfo>::new(env)?;
        auth.set_attr(OCI_ATTR_DRIVER_NAME, env!("CARGO_PKG_NAME"), &err)?;
        let mut mode = OCI_SESSGET_STMTCACHE;
        if username.is_empty() && password.is_empty() {
            mode |= OCI_SESSGET_CREDEXT;
        } else {
            auth.set_attr(OCI_ATTR_USERNAME, username, &err)?;
            auth.set_attr(OCI_ATTR_PASSWORD, password, &err)?;
        }
        let mut svc = Ptr::<OCISvcCtx>::null();
        oci::session_get(env.as_ref(), &err, svc.as_mut_ptr(), &auth, dbname, mode, "connect")?;
        log::debug!("connected to {dbname} as {username}");
        Ok(Self { svc, err, _auth: auth, env: env.get_env(), _pool: None, phantom_env: PhantomData })
    }

    pub(crate) fn from_session_pool(pool: &'a SessionPool) -> Result<Self> {
        Self::acquire(pool.get_env(), pool.name(), None)
    }

    /// Acquires a session from a pool that nobody else uses. The pool is destroyed
    /// after the session is released.
    pub(crate) fn from_owned_pool(pool: SessionPool<'a>) -> Result<Self> {
        let name = pool.name().to_string();
        Self::acquire(pool.get_env(), &name, Some(pool))
    }

    fn acquire(env: Arc<Handle<OCIEnv>>, pool_name: &str, pool: Option<SessionPool<'a>>) -> Result<Self> {
        let err = Handle::<OCIError>::new(env.as_ref())?;
        let auth = Handle::<OCIAuthInfo>::new(env.as_ref())?;
        let mut svc = Ptr::<OCISvcCtx>::null();
        oci::session_get(
            &env, &err, svc.as_mut_ptr(), &auth, pool_name,
            OCI_SESSGET_SPOOL | OCI_SESSGET_SPOOL_MATCHANY | OCI_SESSGET_PURITY_SELF,
            "acquire connection from pool"
        )?;
        log::debug!("acquired session from pool {pool_name}");
        Ok(Self { svc, err, _auth: auth, env, _pool: pool, phantom_env: PhantomData })
    }

    /// Checks the status of the server the session is attached to. Does not make a round trip.
    pub fn is_connected(&self) -> Result<bool> {
        let srv : Ptr<OCIServer> = attr::get(self.svc.as_ref(), OCI_HTYPE_SVCCTX, OCI_ATTR_SERVER, &self.err)?;
        if srv.is_null() {
            return Ok(false);
        }
        let status : u32 = attr::get(srv.as_ref(), OCI_HTYPE_SERVER, OCI_ATTR_SERVER_STATUS, &self.err)?;
        Ok(status == OCI_SERVER_NORMAL)
    }

    /**
    Makes a round trip to the server.

    # Example

    ```no_run
    # let oracle = callproc::Environment::new()?;
    # let session = oracle.connect("PDB1", "HEEJONG", "Welcome1")?;
    session.ping()?;
    # Ok::<(),callproc::Error>(())
    ```
    */
    pub fn ping(&self) -> Result<()> {
        oci::ping(self.as_ref(), self.as_ref())
    }

    /**
    Prepares a SQL statement or a PL/SQL block. The statement is cached by the
    session's statement cache.

    # Example

    ```no_run
    # let oracle = callproc::Environment::new()?;
    # let session = oracle.connect("PDB1", "HEEJONG", "Welcome1")?;
    let mut stmt = session.prepare("begin proc_Test(:1, :2, :3); end;")?;
    # Ok::<(),callproc::Error>(())
    ```
    */
    pub fn prepare(&self, sql: &str) -> Result<Statement<'_>> {
        Statement::new(sql, self)
    }

    /**
    Allocates a new numeric variable that can be bound to a statement
    parameter as an IN/OUT or an OUT argument.

    The variable is exchanged with the database as a 64-bit integer and
    is NULL until a value is written into it.
    */
    pub fn new_var(&self) -> Result<Var> {
        Ok(Var::new())
    }

    pub(crate) fn get_svc(&self) -> Ptr<OCISvcCtx> {
        self.svc
    }
}

impl crate::ClientSession for Session<'_> {
    type Statement<'s> = Statement<'s> where Self: 's;

    fn prepare(&self, sql: &str) -> Result<Self::Statement<'_>> {
        Session::prepare(self, sql)
    }

    fn new_var(&self) -> Result<Var> {
        Session::new_var(self)
    }
}
