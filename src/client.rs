//! Database client call surface used by the call driver

use crate::{Result, Var};

/// Settings used to establish a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectParams {
    pub username: String,
    pub password: String,
    pub connect_string: String,
    /// Acquire the connection from a (private) session pool instead of creating a standalone one
    pub use_pool: bool,
}

/**
Database client that can open connections.

Implemented by `Environment` when the crate is built with the `oci` feature.
*/
pub trait Client {
    type Session<'a>: ClientSession where Self: 'a;

    /// Opens a connection. The connection is closed when the returned session is dropped.
    fn connect(&self, params: &ConnectParams) -> Result<Self::Session<'_>>;
}

/// Open connection to the database
pub trait ClientSession {
    type Statement<'s>: ClientStatement where Self: 's;

    /// Prepares SQL or PL/SQL statement for execution.
    fn prepare(&self, sql: &str) -> Result<Self::Statement<'_>>;

    /// Allocates a numeric variable that holds NULL.
    fn new_var(&self) -> Result<Var>;
}

/// Prepared statement. Parameter positions start at 1.
pub trait ClientStatement {
    /// Binds a copy of `value` to the placeholder at `pos`.
    fn bind_value_by_pos(&mut self, pos: u32, value: &[u8]) -> Result<()>;

    /// Binds the variable to the placeholder at `pos`. The variable receives the
    /// value the callee assigns to the parameter.
    fn bind_by_pos(&mut self, pos: u32, var: &Var) -> Result<()>;

    /// Executes the statement once. Returns the number of query columns.
    fn execute(&mut self) -> Result<u32>;
}

// ODPI-C pool defaults: a single session that is created with the pool
#[cfg(feature="oci")]
const POOL_MIN_SESSIONS : usize = 1;
#[cfg(feature="oci")]
const POOL_SESSION_INCREMENT : usize = 0;
#[cfg(feature="oci")]
const POOL_MAX_SESSIONS : usize = 1;

#[cfg(feature="oci")]
impl Client for crate::Environment {
    type Session<'a> = crate::Session<'a> where Self: 'a;

    fn connect(&self, params: &ConnectParams) -> Result<crate::Session<'_>> {
        if params.use_pool {
            let pool = self.create_session_pool(
                &params.connect_string, &params.username, &params.password,
                POOL_MIN_SESSIONS, POOL_SESSION_INCREMENT, POOL_MAX_SESSIONS
            )?;
            pool.into_session()
        } else {
            crate::Environment::connect(self, &params.connect_string, &params.username, &params.password)
        }
    }
}
