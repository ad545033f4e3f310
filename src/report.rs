//! What the program prints and how it exits

use std::{io::{self, Write}, process::ExitCode};
use crate::{Error, Result, CallArgs, CallOutcome, Client, ConnectParams, call_proc};

/// Program exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The call succeeded
    Success,
    /// The client library could not be initialized
    Fatal,
    /// Connecting, preparing, binding or executing failed
    Failed,
}

impl Status {
    pub fn code(self) -> u8 {
        match self {
            Status::Success => 0,
            Status::Fatal   => 1,
            Status::Failed  => 255,
        }
    }
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        ExitCode::from(status.code())
    }
}

/**
Writes the outcome of the call: the parameter values and `Done.` to `out` on success,
the `ERROR:` line to `err` on failure.

# Example

```
use callproc::{report, CallOutcome, Status};

let mut out = Vec::new();
let mut err = Vec::new();
let status = report(Ok(CallOutcome { in_out_value: Some(694), out_value: None }), &mut out, &mut err)?;

assert_eq!(status, Status::Success);
assert_eq!(String::from_utf8_lossy(&out), "IN/OUT value (after call) is 694\nOUT value (after call) is NULL\nDone.\n");
assert!(err.is_empty());
# Ok::<(),std::io::Error>(())
```
*/
pub fn report(res: Result<CallOutcome>, out: &mut impl Write, err: &mut impl Write) -> io::Result<Status> {
    match res {
        Ok(outcome) => {
            writeln!(out, "{outcome}")?;
            writeln!(out, "Done.")?;
            Ok(Status::Success)
        }
        Err(cause) => {
            writeln!(err, "ERROR: {cause}")?;
            Ok(Status::Failed)
        }
    }
}

/// Writes the `ERROR:` and `FATAL:` lines for a client that could not be initialized.
pub fn report_fatal(cause: &Error, err: &mut impl Write) -> io::Result<Status> {
    writeln!(err, "ERROR: {cause}")?;
    writeln!(err, "FATAL: Cannot create OCI environment.")?;
    Ok(Status::Fatal)
}

/// Calls the procedure and reports the outcome.
pub fn run<C: Client>(client: &C, params: &ConnectParams, args: &CallArgs, out: &mut impl Write, err: &mut impl Write) -> io::Result<Status> {
    report(call_proc(client, params, args), out, err)
}
