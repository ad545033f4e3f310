//! Call driver

use std::fmt;
use crate::{Result, Client, ClientSession, ClientStatement, ConnectParams};

/// PL/SQL block that calls the procedure
pub const CALL_SQL : &str = "begin proc_Test(:1, :2, :3); end;";
/// Default value of the IN parameter
pub const IN_VALUE : &str = "In value for testing";
/// Default initial value of the IN/OUT parameter
pub const IN_OUT_INITIAL : i64 = 347;

/// Arguments of the call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallArgs {
    pub in_value: Vec<u8>,
    pub in_out_value: i64,
}

impl Default for CallArgs {
    fn default() -> Self {
        Self { in_value: IN_VALUE.as_bytes().to_vec(), in_out_value: IN_OUT_INITIAL }
    }
}

/// Values of the IN/OUT and OUT parameters after the call. `None` is NULL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallOutcome {
    pub in_out_value: Option<i64>,
    pub out_value: Option<i64>,
}

struct Value(Option<i64>);

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(val) => write!(f, "{}", val),
            None => f.write_str("NULL"),
        }
    }
}

impl fmt::Display for CallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IN/OUT value (after call) is {}", Value(self.in_out_value))?;
        write!(f, "OUT value (after call) is {}", Value(self.out_value))
    }
}

/**
Calls `proc_Test` once.

Connects, prepares the call, binds `args.in_value` to the first parameter, a variable
initialized with `args.in_out_value` to the second and a NULL variable to the third,
executes the call and returns what the procedure left in the variables.

Every resource acquired here is released before the function returns, whether the
call succeeded or not.

# Example

```no_run
# #[cfg(feature="oci")]
# fn main() -> callproc::Result<()> {
use callproc::{CallArgs, ConnectParams};

let oracle = callproc::Environment::new()?;
let params = ConnectParams {
    username: "HEEJONG".to_string(),
    password: "Welcome1".to_string(),
    connect_string: "PDB1".to_string(),
    use_pool: false,
};
let outcome = callproc::call_proc(&oracle, &params, &CallArgs::default())?;
println!("{outcome}");
# Ok(())
# }
# #[cfg(not(feature="oci"))]
# fn main() {}
```
*/
pub fn call_proc<C: Client>(client: &C, params: &ConnectParams, args: &CallArgs) -> Result<CallOutcome> {
    log::debug!("connecting to {} as {}", params.connect_string, params.username);
    let session = client.connect(params)?;

    log::debug!("preparing {CALL_SQL}");
    let mut stmt = session.prepare(CALL_SQL)?;

    log::debug!("binding IN value ({} bytes)", args.in_value.len());
    stmt.bind_value_by_pos(1, &args.in_value)?;

    let in_out = session.new_var()?;
    in_out.set_i64(args.in_out_value);
    log::debug!("binding IN/OUT variable = {}", args.in_out_value);
    stmt.bind_by_pos(2, &in_out)?;

    let out = session.new_var()?;
    log::debug!("binding OUT variable");
    stmt.bind_by_pos(3, &out)?;

    log::debug!("executing");
    let num_query_columns = stmt.execute()?;
    if num_query_columns != 0 {
        log::warn!("call returned {num_query_columns} query column(s)");
    } else {
        log::debug!("call returned no query columns");
    }

    let outcome = CallOutcome {
        in_out_value: in_out.get_i64(),
        out_value: out.get_i64(),
    };
    log::debug!("{outcome:?}");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_args() {
        let args = CallArgs::default();
        assert_eq!(args.in_value, b"In value for testing");
        assert_eq!(args.in_out_value, 347);
    }

    #[test]
    fn outcome_display() {
        let outcome = CallOutcome { in_out_value: Some(694), out_value: Some(20) };
        assert_eq!(outcome.to_string(), "IN/OUT value (after call) is 694\nOUT value (after call) is 20");

        let outcome = CallOutcome { in_out_value: Some(-1), out_value: None };
        assert_eq!(outcome.to_string(), "IN/OUT value (after call) is -1\nOUT value (after call) is NULL");
    }
}
