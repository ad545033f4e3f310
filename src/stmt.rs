//! SQL or PL/SQL statement

use std::marker::PhantomData;
use once_cell::unsync::OnceCell;
use libc::c_void;
use crate::{Result, Error, Session, Var, oci::{self, attr, *}};

/// Keeps a copy of an IN value and its bind indicators at a stable address
struct InBind {
    data: Vec<u8>,
    ind:  i16,
    len:  u32,
    bind: Ptr<OCIBind>,
}

/// Keeps a bound variable alive for as long as the statement might use it
struct VarBind {
    var:  Var,
    bind: Ptr<OCIBind>,
}

/// Represents a prepared for execution SQL or PL/SQL statement
pub struct Statement<'a> {
    stmt:      Ptr<OCIStmt>,
    svc:       Ptr<OCISvcCtx>,
    err:       Handle<OCIError>,
    values:    Vec<Box<InBind>>,
    vars:      Vec<Box<VarBind>>,
    num_binds: OnceCell<u32>,
    stmt_type: OnceCell<u16>,
    phantom_session: PhantomData<&'a Session<'a>>,
}

impl Drop for Statement<'_> {
    fn drop(&mut self) {
        if !self.stmt.is_null() {
            log::debug!("releasing statement");
            oci::stmt_release(&self.stmt, &self.err);
        }
    }
}

impl AsRef<OCIError> for Statement<'_> {
    fn as_ref(&self) -> &OCIError {
        &*self.err
    }
}

impl<'a> Statement<'a> {
    /// Creates a new statement
    pub(crate) fn new(sql: &str, session: &'a Session) -> Result<Self> {
        let err = Handle::<OCIError>::new(session)?;
        let svc = session.get_svc();
        let mut stmt = Ptr::<OCIStmt>::null();
        oci::stmt_prepare(&svc, stmt.as_mut_ptr(), &err, sql)?;
        log::debug!("prepared {sql}");
        Ok(Self {
            stmt, svc, err,
            values: Vec::new(),
            vars: Vec::new(),
            num_binds: OnceCell::new(),
            stmt_type: OnceCell::new(),
            phantom_session: PhantomData
        })
    }

    fn get_attr<V: attr::FromAttr>(&self, attr_type: u32) -> Result<V> {
        attr::get(self.stmt.as_ref(), OCI_HTYPE_STMT, attr_type, &self.err)
    }

    /// Returns the number of unique parameter placeholders in the statement.
    pub fn bind_count(&self) -> Result<u32> {
        self.num_binds.get_or_try_init(|| self.get_attr(OCI_ATTR_BIND_COUNT)).copied()
    }

    fn stmt_type(&self) -> Result<u16> {
        self.stmt_type.get_or_try_init(|| self.get_attr(OCI_ATTR_STMT_TYPE)).copied()
    }

    fn check_pos(&self, pos: u32) -> Result<()> {
        if pos == 0 {
            return Err( Error::new("Parameter positions start at 1") );
        }
        let num_binds = self.bind_count()?;
        if pos > num_binds {
            Err( Error::msg(format!("Statement does not define parameter placeholder at position {}", pos)) )
        } else {
            Ok(())
        }
    }

    /**
    Binds an IN value to the parameter placeholder at the specified (1-based) position.

    The value is copied into the statement, thus the caller's buffer is free to change
    after the call. An empty value is bound as NULL.
    */
    pub fn bind_value_by_pos(&mut self, pos: u32, value: &[u8]) -> Result<()> {
        self.check_pos(pos)?;
        let mut value = Box::new(InBind {
            data: value.to_vec(),
            ind:  if value.is_empty() { OCI_IND_NULL } else { OCI_IND_NOTNULL },
            len:  value.len() as u32,
            bind: Ptr::null(),
        });
        let InBind { data, ind, len, bind } = value.as_mut();
        oci::bind_by_pos(
            &self.stmt, bind.as_mut_ptr(), &self.err,
            pos, data.as_mut_ptr() as *mut c_void, data.len() as i64, SQLT_CHR,
            ind, len
        )?;
        log::debug!("bound {} byte(s) to position {}", data.len(), pos);
        self.values.push(value);
        Ok(())
    }

    /**
    Binds a variable to the parameter placeholder at the specified (1-based) position.

    The value the variable holds when the statement is executed is sent to the database,
    and whatever the callee assigns to the parameter is written back into the variable.
    */
    pub fn bind_by_pos(&mut self, pos: u32, var: &Var) -> Result<()> {
        self.check_pos(pos)?;
        let mut var_bind = Box::new(VarBind { var: var.clone(), bind: Ptr::null() });
        let VarBind { var, bind } = var_bind.as_mut();
        oci::bind_by_pos(
            &self.stmt, bind.as_mut_ptr(), &self.err,
            pos, var.value_ptr() as *mut c_void, var.buffer_size() as i64, SQLT_INT,
            var.ind_ptr(), var.len_ptr()
        )?;
        log::debug!("bound variable to position {}", pos);
        self.vars.push(var_bind);
        Ok(())
    }

    /**
    Executes the statement. Returns the number of query columns, which is 0 for
    anything but queries.

    # Example

    ```no_run
    # let oracle = callproc::Environment::new()?;
    # let session = oracle.connect("PDB1", "HEEJONG", "Welcome1")?;
    let mut stmt = session.prepare("begin proc_Test(:1, :2, :3); end;")?;
    let in_out = session.new_var()?;
    let out = session.new_var()?;
    in_out.set_i64(347);
    stmt.bind_value_by_pos(1, b"In value for testing")?;
    stmt.bind_by_pos(2, &in_out)?;
    stmt.bind_by_pos(3, &out)?;

    let num_query_columns = stmt.execute()?;

    assert_eq!(num_query_columns, 0);
    println!("IN/OUT={:?} OUT={:?}", in_out.get_i64(), out.get_i64());
    # Ok::<(),callproc::Error>(())
    ```
    */
    pub fn execute(&mut self) -> Result<u32> {
        let iters = if self.stmt_type()? == OCI_STMT_SELECT { 0 } else { 1 };
        let res = oci::stmt_execute(&self.svc, &self.stmt, &self.err, iters)?;
        if res == OCI_SUCCESS_WITH_INFO {
            log::warn!("{}", Error::oci(&self.err, res, "OCIStmtExecute", "execute"));
        }
        self.get_attr(OCI_ATTR_PARAM_COUNT)
    }
}

impl crate::ClientStatement for Statement<'_> {
    fn bind_value_by_pos(&mut self, pos: u32, value: &[u8]) -> Result<()> {
        Statement::bind_value_by_pos(self, pos, value)
    }

    fn bind_by_pos(&mut self, pos: u32, var: &Var) -> Result<()> {
        Statement::bind_by_pos(self, pos, var)
    }

    fn execute(&mut self) -> Result<u32> {
        Statement::execute(self)
    }
}
