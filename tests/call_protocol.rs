use parking_lot::Mutex;
use callproc::{
    call_proc, run, CallArgs, CallOutcome, Client, ClientSession, ClientStatement,
    ConnectParams, Error, Result, Status, Var, CALL_SQL,
};

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Connect(ConnectParams),
    Prepare(String),
    BindValue(u32, Vec<u8>),
    NewVar,
    BindVar(u32, Option<i64>),
    Execute,
    ReleaseStatement,
    ReleaseSession,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    Connect,
    Prepare,
    BindValue,
    NewVar,
    BindVar,
    Execute,
}

/// Client that records every call and runs a `proc_Test` that doubles the IN/OUT
/// value and returns the length of the IN value as the OUT value.
struct RecordingClient {
    events: Mutex<Vec<Event>>,
    fail_at: Option<Step>,
    query_columns: u32,
}

impl RecordingClient {
    fn new() -> Self {
        Self { events: Mutex::new(Vec::new()), fail_at: None, query_columns: 0 }
    }

    fn failing_at(step: Step) -> Self {
        Self { fail_at: Some(step), ..Self::new() }
    }

    fn record(&self, event: Event) {
        self.events.lock().push(event);
    }

    fn check(&self, step: Step, code: i32, fn_name: &'static str, action: &'static str) -> Result<()> {
        if self.fail_at == Some(step) {
            Err( Error::oracle(code, format!("{:?} failed", step), fn_name, action) )
        } else {
            Ok(())
        }
    }

    fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    fn count(&self, event: &Event) -> usize {
        self.events.lock().iter().filter(|e| *e == event).count()
    }
}

struct RecordingSession<'a> {
    client: &'a RecordingClient,
}

impl Drop for RecordingSession<'_> {
    fn drop(&mut self) {
        self.client.record(Event::ReleaseSession);
    }
}

struct RecordingStatement<'a> {
    client: &'a RecordingClient,
    in_value: Option<Vec<u8>>,
    in_out: Option<Var>,
    out: Option<Var>,
}

impl Drop for RecordingStatement<'_> {
    fn drop(&mut self) {
        self.client.record(Event::ReleaseStatement);
    }
}

impl Client for RecordingClient {
    type Session<'a> = RecordingSession<'a> where Self: 'a;

    fn connect(&self, params: &ConnectParams) -> Result<RecordingSession<'_>> {
        self.check(Step::Connect, 12154, "OCISessionGet", "connect")?;
        self.record(Event::Connect(params.clone()));
        Ok(RecordingSession { client: self })
    }
}

impl<'a> ClientSession for RecordingSession<'a> {
    type Statement<'s> = RecordingStatement<'s> where Self: 's;

    fn prepare(&self, sql: &str) -> Result<RecordingStatement<'_>> {
        self.client.check(Step::Prepare, 900, "OCIStmtPrepare2", "prepare SQL")?;
        self.client.record(Event::Prepare(sql.to_string()));
        Ok(RecordingStatement { client: self.client, in_value: None, in_out: None, out: None })
    }

    fn new_var(&self) -> Result<Var> {
        self.client.check(Step::NewVar, 4030, "OCIHandleAlloc", "allocate variable")?;
        self.client.record(Event::NewVar);
        Ok(Var::new())
    }
}

impl ClientStatement for RecordingStatement<'_> {
    fn bind_value_by_pos(&mut self, pos: u32, value: &[u8]) -> Result<()> {
        self.client.check(Step::BindValue, 1036, "OCIBindByPos2", "bind")?;
        if pos != 1 {
            return Err( Error::oracle(1036, "illegal variable name/number", "OCIBindByPos2", "bind") );
        }
        self.client.record(Event::BindValue(pos, value.to_vec()));
        self.in_value = Some(value.to_vec());
        Ok(())
    }

    fn bind_by_pos(&mut self, pos: u32, var: &Var) -> Result<()> {
        self.client.check(Step::BindVar, 1036, "OCIBindByPos2", "bind")?;
        self.client.record(Event::BindVar(pos, var.get_i64()));
        match pos {
            2 => self.in_out = Some(var.clone()),
            3 => self.out = Some(var.clone()),
            _ => return Err( Error::oracle(1036, "illegal variable name/number", "OCIBindByPos2", "bind") ),
        }
        Ok(())
    }

    fn execute(&mut self) -> Result<u32> {
        self.client.check(Step::Execute, 6550, "OCIStmtExecute", "execute")?;
        self.client.record(Event::Execute);
        let (Some(in_value), Some(in_out), Some(out)) = (&self.in_value, &self.in_out, &self.out) else {
            return Err( Error::oracle(1008, "not all variables bound", "OCIStmtExecute", "execute") );
        };
        match in_out.get_i64() {
            Some(val) => in_out.set_i64(val * 2),
            None => in_out.set_null(),
        }
        // Oracle stores empty strings as NULL, and LENGTH(NULL) is NULL
        if in_value.is_empty() {
            out.set_null();
        } else {
            out.set_i64(in_value.len() as i64);
        }
        Ok(self.client.query_columns)
    }
}

fn params() -> ConnectParams {
    ConnectParams {
        username: "HEEJONG".to_string(),
        password: "Welcome1".to_string(),
        connect_string: "PDB1".to_string(),
        use_pool: false,
    }
}

#[test]
fn calls_procedure() -> Result<()> {
    let client = RecordingClient::new();
    let outcome = call_proc(&client, &params(), &CallArgs::default())?;

    assert_eq!(outcome, CallOutcome { in_out_value: Some(694), out_value: Some(20) });
    assert_eq!(client.events(), vec![
        Event::Connect(params()),
        Event::Prepare(CALL_SQL.to_string()),
        Event::BindValue(1, b"In value for testing".to_vec()),
        Event::NewVar,
        Event::BindVar(2, Some(347)),
        Event::NewVar,
        Event::BindVar(3, None),
        Event::Execute,
        Event::ReleaseStatement,
        Event::ReleaseSession,
    ]);
    Ok(())
}

#[test]
fn passes_connection_settings_through() -> Result<()> {
    let client = RecordingClient::new();
    let params = ConnectParams { use_pool: true, ..params() };
    call_proc(&client, &params, &CallArgs::default())?;
    assert_eq!(client.events()[0], Event::Connect(params));
    Ok(())
}

#[test]
fn opens_and_releases_one_connection_and_one_statement() {
    for fail_at in [None, Some(Step::Prepare), Some(Step::BindValue), Some(Step::NewVar), Some(Step::BindVar), Some(Step::Execute)] {
        let client = RecordingClient { fail_at, ..RecordingClient::new() };
        let _ = call_proc(&client, &params(), &CallArgs::default());

        assert_eq!(client.count(&Event::Connect(params())), 1, "connections with failure at {:?}", fail_at);
        assert_eq!(client.count(&Event::ReleaseSession), 1, "releases with failure at {:?}", fail_at);

        let expected_statements = if fail_at == Some(Step::Prepare) { 0 } else { 1 };
        assert_eq!(client.count(&Event::Prepare(CALL_SQL.to_string())), expected_statements, "statements with failure at {:?}", fail_at);
        assert_eq!(client.count(&Event::ReleaseStatement), expected_statements, "statement releases with failure at {:?}", fail_at);

        // the statement is always released before its session
        let events = client.events();
        assert_eq!(events.last(), Some(&Event::ReleaseSession));
    }
}

#[test]
fn stops_at_failed_step() {
    let cases = [
        (Step::Connect,   12154, vec![]),
        (Step::Prepare,     900, vec![Event::Connect(params())]),
        (Step::BindValue,  1036, vec![Event::Connect(params()), Event::Prepare(CALL_SQL.to_string())]),
        (Step::NewVar,     4030, vec![Event::Connect(params()), Event::Prepare(CALL_SQL.to_string()), Event::BindValue(1, b"In value for testing".to_vec())]),
        (Step::BindVar,    1036, vec![Event::Connect(params()), Event::Prepare(CALL_SQL.to_string()), Event::BindValue(1, b"In value for testing".to_vec()), Event::NewVar]),
        (Step::Execute,    6550, vec![Event::Connect(params()), Event::Prepare(CALL_SQL.to_string()), Event::BindValue(1, b"In value for testing".to_vec()), Event::NewVar, Event::BindVar(2, Some(347)), Event::NewVar, Event::BindVar(3, None)]),
    ];
    for (step, code, expected) in cases {
        let client = RecordingClient::failing_at(step);
        let res = call_proc(&client, &params(), &CallArgs::default());

        let err = res.expect_err("call should fail");
        let info = err.info().expect("client error detail");
        assert_eq!(info.code, code);
        assert!(!info.message.is_empty());
        assert!(err.to_string().contains(info.fn_name));

        let events: Vec<Event> = client.events().into_iter()
            .filter(|e| *e != Event::ReleaseStatement && *e != Event::ReleaseSession)
            .collect();
        assert_eq!(events, expected, "events before failure at {:?}", step);
    }
}

#[test]
fn connect_failure_releases_nothing() {
    let client = RecordingClient::failing_at(Step::Connect);
    assert!(call_proc(&client, &params(), &CallArgs::default()).is_err());
    assert!(client.events().is_empty());
}

#[test]
fn empty_in_value_reaches_execute() -> Result<()> {
    let client = RecordingClient::new();
    let args = CallArgs { in_value: Vec::new(), ..CallArgs::default() };
    let outcome = call_proc(&client, &params(), &args)?;

    assert_eq!(client.count(&Event::Execute), 1);
    assert_eq!(client.count(&Event::BindValue(1, Vec::new())), 1);
    assert_eq!(outcome, CallOutcome { in_out_value: Some(694), out_value: None });
    assert_eq!(outcome.to_string(), "IN/OUT value (after call) is 694\nOUT value (after call) is NULL");
    Ok(())
}

#[test]
fn repeated_calls_return_same_values() -> Result<()> {
    let client = RecordingClient::new();
    let args = CallArgs { in_value: b"abc".to_vec(), in_out_value: -5 };
    let first = call_proc(&client, &params(), &args)?;
    let second = call_proc(&client, &params(), &args)?;

    assert_eq!(first, second);
    assert_eq!(first, CallOutcome { in_out_value: Some(-10), out_value: Some(3) });
    assert_eq!(client.count(&Event::ReleaseSession), 2);
    Ok(())
}

#[test]
fn query_columns_do_not_fail_the_call() -> Result<()> {
    let client = RecordingClient { query_columns: 2, ..RecordingClient::new() };
    let outcome = call_proc(&client, &params(), &CallArgs::default())?;
    assert_eq!(outcome.in_out_value, Some(694));
    Ok(())
}

#[test]
fn run_prints_values_and_done() -> std::io::Result<()> {
    let client = RecordingClient::new();
    let mut out = Vec::new();
    let mut err = Vec::new();

    let status = run(&client, &params(), &CallArgs::default(), &mut out, &mut err)?;

    assert_eq!(status, Status::Success);
    assert_eq!(status.code(), 0);
    assert_eq!(String::from_utf8_lossy(&out), "IN/OUT value (after call) is 694\nOUT value (after call) is 20\nDone.\n");
    assert!(err.is_empty());
    Ok(())
}

#[test]
fn run_reports_failed_step() -> std::io::Result<()> {
    for (step, line) in [
        (Step::Connect, "ERROR: ORA-12154: Connect failed (OCISessionGet: connect)\n"),
        (Step::Execute, "ERROR: ORA-06550: Execute failed (OCIStmtExecute: execute)\n"),
    ] {
        let client = RecordingClient::failing_at(step);
        let mut out = Vec::new();
        let mut err = Vec::new();

        let status = run(&client, &params(), &CallArgs::default(), &mut out, &mut err)?;

        assert_eq!(status, Status::Failed);
        assert_eq!(status.code(), 255);
        assert!(out.is_empty(), "nothing is printed to stdout when {:?} fails", step);
        assert_eq!(String::from_utf8_lossy(&err), line);
    }
    Ok(())
}
