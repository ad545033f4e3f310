//! Oracle OCI

use libc::{size_t, c_void};
use crate::{Error, Result};
use std::ffi::CStr;

pub(crate) mod ptr;
pub(crate) mod attr;
pub(crate) mod handle;

pub(crate) use self::ptr::Ptr;
pub(crate) use handle::Handle;

pub(crate) const OCI_DEFAULT                : u32 = 0;

// OCI Error Codes
pub(crate) const OCI_SUCCESS                : i32 = 0;
pub(crate) const OCI_SUCCESS_WITH_INFO      : i32 = 1;
pub(crate) const OCI_NEED_DATA              : i32 = 99;
pub(crate) const OCI_NO_DATA                : i32 = 100;
pub(crate) const OCI_ERROR                  : i32 = -1;
pub(crate) const OCI_INVALID_HANDLE         : i32 = -2;
pub(crate) const OCI_STILL_EXECUTING        : i32 = -3123;

// Attribute Constants
pub(crate) const OCI_ATTR_PARAM_COUNT       : u32 = 18;     // number of columns in the select list
pub(crate) const OCI_ATTR_STMT_TYPE         : u32 = 24;
pub(crate) const OCI_ATTR_BIND_COUNT        : u32 = 190;

// Handle Types
pub(crate) const OCI_HTYPE_ENV              : u32 = 1;
pub(crate) const OCI_HTYPE_ERROR            : u32 = 2;
pub(crate) const OCI_HTYPE_SVCCTX           : u32 = 3;
pub(crate) const OCI_HTYPE_STMT             : u32 = 4;
pub(crate) const OCI_HTYPE_SERVER           : u32 = 8;
pub(crate) const OCI_HTYPE_AUTHINFO         : u32 = 9;
pub(crate) const OCI_HTYPE_SPOOL            : u32 = 27;

// Handle Definitions
#[repr(C)] pub struct OCIEnv                { _private: [u8; 0] }
#[repr(C)] pub struct OCIError              { _private: [u8; 0] }
#[repr(C)] pub struct OCISvcCtx             { _private: [u8; 0] }
#[repr(C)] pub struct OCIStmt               { _private: [u8; 0] }
#[repr(C)] pub struct OCIBind               { _private: [u8; 0] }
#[repr(C)] pub struct OCIServer             { _private: [u8; 0] }
#[repr(C)] pub struct OCIAuthInfo           { _private: [u8; 0] }
#[repr(C)] pub struct OCISPool              { _private: [u8; 0] }

/// Marker trait for OCI handles
pub trait OCIStruct {}

macro_rules! mark_as_oci {
    ($($t:ty),+) => {
        $(
            impl OCIStruct for $t {}
        )+
    };
}

mark_as_oci!(OCIEnv, OCIError, OCISvcCtx, OCIStmt, OCIBind, OCIServer, OCIAuthInfo, OCISPool);

// Data types
pub(crate) const SQLT_CHR               : u16 = 1;   // (ORANET TYPE) character string
pub(crate) const SQLT_INT               : u16 = 3;   // (ORANET TYPE) integer

// Null indicator information
pub(crate) const OCI_IND_NOTNULL        : i16 = 0;
pub(crate) const OCI_IND_NULL           : i16 = -1;

// Character Sets
pub(crate) const AL32UTF8               : u16 = 873;

// Initialization Modes
pub(crate) const OCI_THREADED           : u32 = 1;

// Authentication info and session attributes
pub(crate) const OCI_ATTR_SERVER            : u32 = 6;
pub(crate) const OCI_ATTR_USERNAME          : u32 = 22;
pub(crate) const OCI_ATTR_PASSWORD          : u32 = 23;
pub(crate) const OCI_ATTR_SERVER_STATUS     : u32 = 143;
pub(crate) const OCI_ATTR_DRIVER_NAME       : u32 = 424;

// Server Handle Attribute Values
pub(crate) const OCI_SERVER_NORMAL          : u32 = 1;

// Session pool attributes
pub(crate) const OCI_ATTR_SPOOL_BUSY_COUNT  : u32 = 310;
pub(crate) const OCI_ATTR_SPOOL_OPEN_COUNT  : u32 = 311;
pub(crate) const OCI_ATTR_SPOOL_AUTH        : u32 = 460;

// OCISessionGet modes
pub(crate) const OCI_SESSGET_SPOOL          : u32 = 0x0001;
pub(crate) const OCI_SESSGET_STMTCACHE      : u32 = 0x0004;
pub(crate) const OCI_SESSGET_CREDEXT        : u32 = 0x0010;
pub(crate) const OCI_SESSGET_SPOOL_MATCHANY : u32 = 0x0020;
pub(crate) const OCI_SESSGET_PURITY_SELF    : u32 = 0x0080;

// OCISessionPoolCreate and OCISessionPoolDestroy modes
pub(crate) const OCI_SPC_HOMOGENEOUS        : u32 = 0x0002;
pub(crate) const OCI_SPC_STMTCACHE          : u32 = 0x0004;
pub(crate) const OCI_SPD_FORCE              : u32 = 0x0001;

pub(crate) const OCI_ERROR_MAXMSG_SIZE      : usize = 3072;

// Parsing Syntax Types
pub(crate) const OCI_NTV_SYNTAX             : u32 = 1;

// Statement Types
pub(crate) const OCI_STMT_SELECT            : u16 = 1;

extern "C" {
    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/handle-and-descriptor-functions.html#GUID-C5BF55F7-A110-4CB5-9663-5056590F12B5
    fn OCIHandleAlloc(
        parenth:    *const OCIEnv,
        hndlpp:     *mut *mut  c_void,
        hndl_type:  u32,
        xtramem_sz: size_t,
        usrmempp:   *const c_void
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/handle-and-descriptor-functions.html#GUID-E87E9F91-D3DC-4F35-BE7C-F1EFBFEEBA0A
    fn OCIHandleFree(
        hndlp:      *mut c_void,
        hnd_type:   u32
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/handle-and-descriptor-functions.html#GUID-FA199A99-4D7A-42C2-BB0A-C20047B95DF9
    fn OCIAttrGet(
        trgthndlp:  *const c_void,
        trghndltyp: u32,
        attributep: *mut c_void,
        sizep:      *mut u32,
        attrtype:   u32,
        errhp:      *const OCIError
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/handle-and-descriptor-functions.html#GUID-3741D7BD-7652-4D7A-8813-AC2AEA8D3B03
    fn OCIAttrSet(
        trgthndlp:  *const c_void,
        trghndltyp: u32,
        attributep: *const c_void,
        size:       u32,
        attrtype:   u32,
        errhp:      *const OCIError
    ) -> i32;
}

extern "C" {
    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/miscellaneous-functions.html#GUID-4B99087C-74F6-498A-8310-D6645172390A
    fn OCIErrorGet(
        hndlp:      *const c_void,
        recordno:   u32,
        sqlstate:   *const c_void,
        errcodep:   *mut i32,
        bufp:       *mut u8,
        bufsiz:     u32,
        hnd_type:   u32,
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/miscellaneous-functions.html#GUID-033BF96D-D88D-4F18-909A-3AB7C2F6C70F
    fn OCIPing(
        svchp:      *const OCISvcCtx,
        errhp:      *const OCIError,
        mode:       u32
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/miscellaneous-functions.html
    fn OCIClientVersion(
        major_version:          *mut i32,
        minor_version:          *mut i32,
        update_num:             *mut i32,
        patch_num:              *mut i32,
        port_update_num:        *mut i32,
    );
}

extern "C" {
    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/connect-authorize-and-initialize-functions.html#GUID-0B6911A9-4B46-476C-BC5E-B87581666CD9
    fn OCIEnvNlsCreate(
        envhpp:     *mut *mut  OCIEnv,
        mode:       u32,
        ctxp:       *const c_void,
        malocfp:    *const c_void,
        ralocfp:    *const c_void,
        mfreefp:    *const c_void,
        xtramemsz:  size_t,
        usrmempp:   *const c_void,
        charset:    u16,
        ncharset:   u16
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/connect-authorize-and-initialize-functions.html
    fn OCISessionGet(
        envhp:          *const OCIEnv,
        errhp:          *const OCIError,
        svchp:          *mut *mut OCISvcCtx,
        authinfop:      *const OCIAuthInfo,
        dbname:         *const u8,
        dbname_len:     u32,
        taginfo:        *const u8,
        taginfo_len:    u32,
        rettaginfo:     *mut *const u8,
        rettaginfo_len: *mut u32,
        found:          *mut u8,
        mode:           u32
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/connect-authorize-and-initialize-functions.html
    fn OCISessionRelease(
        svchp:      *const OCISvcCtx,
        errhp:      *const OCIError,
        tag:        *const u8,
        tag_len:    u32,
        mode:       u32
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/connect-authorize-and-initialize-functions.html
    fn OCISessionPoolCreate(
        envhp:          *const OCIEnv,
        errhp:          *const OCIError,
        spoolhp:        *const OCISPool,
        pool_name:      *mut *const u8,
        pool_name_len:  *mut u32,
        conn_str:       *const u8,
        conn_str_len:   u32,
        sess_min:       u32,
        sess_max:       u32,
        sess_incr:      u32,
        userid:         *const u8,
        userid_len:     u32,
        password:       *const u8,
        password_len:   u32,
        mode:           u32
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/connect-authorize-and-initialize-functions.html
    fn OCISessionPoolDestroy(
        spoolhp:    *const OCISPool,
        errhp:      *const OCIError,
        mode:       u32
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/transaction-functions.html#GUID-06EF9A0A-01A3-40CE-A0B7-DF0504A93366
    fn OCITransRollback(
        svchp:      *const OCISvcCtx,
        errhp:      *const OCIError,
        flags:      u32
    ) -> i32;
}

extern "C" {
    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/statement-functions.html#GUID-E6C1DC67-D464-4D2A-9F19-737423D31779
    fn OCIStmtPrepare2(
        svchp:      *const OCISvcCtx,
        stmthp:     *mut *mut OCIStmt,
        errhp:      *const OCIError,
        stmttext:   *const u8,
        stmt_len:   u32,
        key:        *const u8,
        keylen:     u32,
        language:   u32,
        mode:       u32
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/statement-functions.html#GUID-256034CE-2ADB-4BE5-BC8D-748307F2EA8E
    fn OCIStmtRelease(
        stmtp:      *const OCIStmt,
        errhp:      *const OCIError,
        key:        *const u8,
        keylen:     u32,
        mode:       u32
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/bind-define-describe-functions.html#GUID-D28DF5A7-3C75-4E52-82F7-A5D6D5714E69
    fn OCIBindByPos2(
        stmtp:      *const OCIStmt,
        bindpp:     *mut *mut OCIBind,
        errhp:      *const OCIError,
        position:   u32,
        valuep:     *mut c_void,
        value_sz:   i64,
        dty:        u16,
        indp:       *mut c_void,
        alenp:      *mut u32,
        rcodep:     *mut u16,
        maxarr_len: u32,
        curelep:    *mut u32,
        mode:       u32
    ) -> i32;

    // https://docs.oracle.com/en/database/oracle/oracle-database/19/lnoci/statement-functions.html#GUID-98B26708-3E02-45C0-8258-5D5544F32BE9
    fn OCIStmtExecute(
        svchp:      *const OCISvcCtx,
        stmtp:      *const OCIStmt,
        errhp:      *const OCIError,
        iters:      u32,
        rowoff:     u32,
        snap_in:    *const c_void,  // *const OCISnapshot
        snap_out:   *mut c_void,    // *mut OCISnapshot
        mode:       u32
    ) -> i32;
}

fn get_oracle_error(rc: i32, errhp: *const c_void, htype: u32) -> (i32, String) {
    let mut errcode = rc;
    let mut errmsg : Vec<u8> = Vec::with_capacity(OCI_ERROR_MAXMSG_SIZE);
    let errmsg_ptr = errmsg.as_mut_ptr();
    let res = unsafe {
        *errmsg_ptr = 0;
        OCIErrorGet(errhp, 1, std::ptr::null(), &mut errcode, errmsg_ptr, OCI_ERROR_MAXMSG_SIZE as u32, htype)
    };
    if res == OCI_SUCCESS {
        let msg = unsafe { CStr::from_ptr(errmsg_ptr as *const libc::c_char) };
        let msg = msg.to_string_lossy();
        let msg = msg.trim_end();
        // Error displays add their own "ORA-NNNNN: " prefix
        let prefix = format!("ORA-{:05}: ", errcode);
        (errcode, msg.strip_prefix(prefix.as_str()).unwrap_or(msg).to_string())
    } else {
        no_error_record(rc)
    }
}

/// Code and message for a failed call that left no error record. The code is never
/// positive, so it cannot be mistaken for an ORA error number.
fn no_error_record(rc: i32) -> (i32, String) {
    let msg = match rc {
        OCI_NO_DATA   => String::from("No Data"),
        OCI_NEED_DATA => String::from("Need Data"),
        OCI_INVALID_HANDLE => String::from("Invalid handle"),
        _ => format!("OCI status {}", rc),
    };
    (rc.min(0), msg)
}

impl Error {
    pub(crate) fn env(env: &OCIEnv, rc: i32, fn_name: &'static str, action: &'static str) -> Self {
        let (code, msg) = get_oracle_error(rc, env as *const OCIEnv as _, OCI_HTYPE_ENV);
        Error::oracle(code, msg, fn_name, action)
    }

    pub(crate) fn oci(err: &OCIError, rc: i32, fn_name: &'static str, action: &'static str) -> Self {
        let (code, msg) = get_oracle_error(rc, err as *const OCIError as _, OCI_HTYPE_ERROR);
        Error::oracle(code, msg, fn_name, action)
    }
}

fn check(res: i32, err: &OCIError, fn_name: &'static str, action: &'static str) -> Result<()> {
    match res {
        OCI_ERROR | OCI_INVALID_HANDLE => Err( Error::oci(err, res, fn_name, action) ),
        _ => Ok(())
    }
}

// Safe wrappers. Everything below either returns `Result` or is a "best effort" release call.

pub(crate) fn env_nls_create(envhpp: *mut *mut OCIEnv, mode: u32, charset: u16, ncharset: u16) -> i32 {
    unsafe {
        OCIEnvNlsCreate(
            envhpp, mode,
            std::ptr::null(), std::ptr::null(), std::ptr::null(), std::ptr::null(), 0, std::ptr::null(),
            charset, ncharset
        )
    }
}

pub(crate) fn handle_alloc(env: &OCIEnv, hndlpp: *mut *mut c_void, hndl_type: u32) -> Result<()> {
    let res = unsafe { OCIHandleAlloc(env, hndlpp, hndl_type, 0, std::ptr::null()) };
    if res == OCI_SUCCESS {
        Ok(())
    } else {
        Err( Error::env(env, res, "OCIHandleAlloc", "allocate handle") )
    }
}

pub(crate) fn handle_free(hndlp: *mut c_void, hnd_type: u32) {
    unsafe {
        OCIHandleFree(hndlp, hnd_type);
    }
}

pub(crate) fn attr_get<T: OCIStruct>(obj: &T, obj_type: u32, val: *mut c_void, size: &mut u32, attr_type: u32, err: &OCIError) -> Result<()> {
    let res = unsafe { OCIAttrGet(obj as *const T as _, obj_type, val, size, attr_type, err) };
    check(res, err, "OCIAttrGet", "get attribute")
}

pub(crate) fn attr_set<T: OCIStruct>(obj: &T, obj_type: u32, val: *const c_void, size: u32, attr_type: u32, err: &OCIError) -> Result<()> {
    let res = unsafe { OCIAttrSet(obj as *const T as _, obj_type, val, size, attr_type, err) };
    check(res, err, "OCIAttrSet", "set attribute")
}

pub(crate) fn ping(svc: &OCISvcCtx, err: &OCIError) -> Result<()> {
    let res = unsafe { OCIPing(svc, err, OCI_DEFAULT) };
    check(res, err, "OCIPing", "ping")
}

pub(crate) fn client_version() -> (i32, i32, i32, i32, i32) {
    let mut major_version = 0;
    let mut minor_version = 0;
    let mut update_num = 0;
    let mut patch_num = 0;
    let mut port_update_num = 0;
    unsafe {
        OCIClientVersion(&mut major_version, &mut minor_version, &mut update_num, &mut patch_num, &mut port_update_num);
    }
    (major_version, minor_version, update_num, patch_num, port_update_num)
}

pub(crate) fn session_get(
    env: &OCIEnv, err: &OCIError, svc: *mut *mut OCISvcCtx, inf: &OCIAuthInfo,
    dbname: &str, mode: u32, action: &'static str
) -> Result<()> {
    let mut found = 0u8;
    let res = unsafe {
        OCISessionGet(
            env, err, svc, inf, dbname.as_ptr(), dbname.len() as u32,
            std::ptr::null(), 0, std::ptr::null_mut(), std::ptr::null_mut(), &mut found,
            mode
        )
    };
    check(res, err, "OCISessionGet", action)
}

/// Rolls back uncommitted work and releases the session back to OCI (or to its pool).
pub(crate) fn session_release(svc: &OCISvcCtx, err: &OCIError) {
    unsafe {
        OCITransRollback(svc, err, OCI_DEFAULT);
        OCISessionRelease(svc, err, std::ptr::null(), 0, OCI_DEFAULT);
    }
}

pub(crate) fn session_pool_create(
    env: &OCIEnv, err: &OCIError, spool: &OCISPool, pool_name: *mut *const u8, pool_name_len: *mut u32,
    dbname: &str, min: u32, max: u32, inc: u32, username: &str, password: &str, mode: u32
) -> Result<()> {
    let res = unsafe {
        OCISessionPoolCreate(
            env, err, spool, pool_name, pool_name_len,
            dbname.as_ptr(), dbname.len() as u32,
            min, max, inc,
            username.as_ptr(), username.len() as u32,
            password.as_ptr(), password.len() as u32,
            mode
        )
    };
    check(res, err, "OCISessionPoolCreate", "create pool")
}

pub(crate) fn session_pool_destroy(spool: &OCISPool, err: &OCIError) {
    unsafe {
        OCISessionPoolDestroy(spool, err, OCI_SPD_FORCE);
    }
}

pub(crate) fn stmt_prepare(svc: &OCISvcCtx, stmt: *mut *mut OCIStmt, err: &OCIError, sql: &str) -> Result<()> {
    let res = unsafe {
        OCIStmtPrepare2(
            svc, stmt, err,
            sql.as_ptr(), sql.len() as u32,
            std::ptr::null(), 0,
            OCI_NTV_SYNTAX, OCI_DEFAULT
        )
    };
    check(res, err, "OCIStmtPrepare2", "prepare SQL")
}

pub(crate) fn stmt_release(stmt: &OCIStmt, err: &OCIError) {
    let res = unsafe { OCIStmtRelease(stmt, err, std::ptr::null(), 0, OCI_DEFAULT) };
    debug_assert_ne!(res, OCI_STILL_EXECUTING, "OCIStmtRelease is still executing");
}

pub(crate) fn bind_by_pos(
    stmt: &OCIStmt, bind: *mut *mut OCIBind, err: &OCIError,
    pos: u32, data: *mut c_void, buff_size: i64, sql_type: u16,
    ind: *mut i16, data_len: *mut u32
) -> Result<()> {
    let res = unsafe {
        OCIBindByPos2(
            stmt, bind, err,
            pos, data, buff_size, sql_type,
            ind as *mut c_void, data_len,
            std::ptr::null_mut(), 0, std::ptr::null_mut(),
            OCI_DEFAULT
        )
    };
    check(res, err, "OCIBindByPos2", "bind by position")
}

pub(crate) fn stmt_execute(svc: &OCISvcCtx, stmt: &OCIStmt, err: &OCIError, iters: u32) -> Result<i32> {
    let res = unsafe {
        OCIStmtExecute(svc, stmt, err, iters, 0, std::ptr::null(), std::ptr::null_mut(), OCI_DEFAULT)
    };
    check(res, err, "OCIStmtExecute", "execute")?;
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_error_record() {
        let (code, msg) = no_error_record(OCI_INVALID_HANDLE);
        assert_eq!(code, OCI_INVALID_HANDLE);
        let err = Error::oracle(code, msg, "OCIStmtExecute", "execute");
        assert_eq!(err.to_string(), "Invalid handle (OCIStmtExecute: execute)");

        let (code, msg) = no_error_record(OCI_SUCCESS_WITH_INFO);
        assert_eq!(code, 0);
        assert_eq!(msg, "OCI status 1");
    }
}
