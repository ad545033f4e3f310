#![cfg_attr(not(doctest), doc=include_str!("../README.md"))]

#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature="oci")]
#[cfg_attr(docsrs, doc(cfg(feature="oci")))]
mod oci;
#[cfg(feature="oci")]
mod env;
#[cfg(feature="oci")]
mod session;
#[cfg(feature="oci")]
mod pool;
#[cfg(feature="oci")]
mod stmt;

mod err;
mod var;
mod client;
mod driver;
mod report;
pub mod config;

#[cfg(feature="oci")]
#[cfg_attr(docsrs, doc(cfg(feature="oci")))]
pub use env::{Environment, client_version};
#[cfg(feature="oci")]
#[cfg_attr(docsrs, doc(cfg(feature="oci")))]
pub use session::Session;
#[cfg(feature="oci")]
#[cfg_attr(docsrs, doc(cfg(feature="oci")))]
pub use pool::SessionPool;
#[cfg(feature="oci")]
#[cfg_attr(docsrs, doc(cfg(feature="oci")))]
pub use stmt::Statement;

pub use err::{Error, ErrorInfo};
pub use var::Var;
pub use client::{Client, ClientSession, ClientStatement, ConnectParams};
pub use driver::{call_proc, CallArgs, CallOutcome, CALL_SQL, IN_VALUE, IN_OUT_INITIAL};
pub use report::{report, report_fatal, run, Status};

pub type Result<T> = std::result::Result<T, Error>;

/**
    Returns a new environment handle, which is then used by the OCI functions.

    As nothing can outlive its environment, it is created in `main` and passed
    to whatever needs it:

    ```no_run
    fn main() -> callproc::Result<()> {
        let oracle = callproc::env()?;
        let session = oracle.connect("PDB1", "HEEJONG", "Welcome1")?;
        // ...
        Ok(())
    }
    ```
*/
#[cfg(feature="oci")]
#[cfg_attr(docsrs, doc(cfg(feature="oci")))]
pub fn env() -> Result<Environment> {
    Environment::new()
}
