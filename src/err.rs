use std::{cmp, fmt, error, io};

/// Error detail reported by the database client for a failed call
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Oracle error code (the `NNNNN` of `ORA-NNNNN`) or the OCI return code when no record was available
    pub code: i32,
    /// Message text
    pub message: String,
    /// Name of the client function that failed
    pub fn_name: &'static str,
    /// What the failed call was doing
    pub action: &'static str,
}

/// Represents possible errors returned from callproc
#[derive(Debug)]
pub enum Error {
    Interface(String),
    Oracle(ErrorInfo)
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            // Non-positive codes are OCI return codes of calls that left no error record
            Error::Oracle(info) if info.code <= 0 => write!(f, "{} ({}: {})", info.message, info.fn_name, info.action),
            Error::Oracle(info) => write!(f, "ORA-{:05}: {} ({}: {})", info.code, info.message, info.fn_name, info.action),
            Error::Interface(errmsg) => write!(f, "{}", errmsg),
        }
    }
}

impl error::Error for Error {}

impl cmp::PartialEq for Error {
    fn eq(&self, other: &Error) -> bool {
        match (self, other) {
            (Error::Oracle(this),             Error::Oracle(other))             => this.code == other.code,
            (Error::Interface(this_msg),      Error::Interface(other_msg))      => this_msg  == other_msg,
            _ => false,
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        io::Error::new(io::ErrorKind::Other, err)
    }
}

impl Error {
    #[cfg_attr(not(feature="oci"), allow(dead_code))]
    pub(crate) fn new(msg: &str) -> Self {
        Error::Interface( msg.to_owned() )
    }

    #[cfg_attr(not(feature="oci"), allow(dead_code))]
    pub(crate) fn msg(msg: String) -> Self {
        Error::Interface(msg)
    }

    /// Creates an error as if it was reported by the client.
    pub fn oracle(code: i32, message: impl Into<String>, fn_name: &'static str, action: &'static str) -> Self {
        Error::Oracle(ErrorInfo { code, message: message.into(), fn_name, action })
    }

    /// Returns client error details if the error was reported by the client
    pub fn info(&self) -> Option<&ErrorInfo> {
        match self {
            Error::Oracle(info) => Some(info),
            _ => None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oracle_error_display() {
        let err = Error::oracle(6550, "line 1, column 7:\nPLS-00201: identifier 'PROC_TEST' must be declared", "OCIStmtExecute", "execute");
        assert_eq!(
            err.to_string(),
            "ORA-06550: line 1, column 7:\nPLS-00201: identifier 'PROC_TEST' must be declared (OCIStmtExecute: execute)"
        );
        assert_eq!(err.info().map(|info| info.code), Some(6550));
    }

    #[test]
    fn oci_return_code_display() {
        let err = Error::oracle(-2, "Invalid handle", "OCIStmtExecute", "execute");
        assert_eq!(err.to_string(), "Invalid handle (OCIStmtExecute: execute)");

        let err = Error::oracle(-1, "Error -1", "OCISessionGet", "connect");
        assert_eq!(err.to_string(), "Error -1 (OCISessionGet: connect)");
    }

    #[test]
    fn errors_compare_by_code() {
        let one = Error::oracle(1017, "invalid username/password; logon denied", "OCISessionGet", "connect");
        let two = Error::oracle(1017, "other text", "OCISessionPoolCreate", "create pool");
        assert_eq!(one, two);
        assert_ne!(one, Error::new("invalid username/password; logon denied"));
        assert!(Error::new("oops").info().is_none());
    }
}
