//! Program settings

use std::convert::Infallible;
use clap::{Parser, builder::BoolishValueParser};
use crate::{ConnectParams, driver::{CallArgs, IN_VALUE, IN_OUT_INITIAL}};

/**
Settings of the `callproc` program.

Every connection setting can be given either as an option or as an
`ODPIC_SAMPLES_*` environment variable. Options take precedence.
*/
#[derive(Parser)]
#[command(name = "callproc", version, about = "Calls proc_Test with IN, IN/OUT and OUT parameters and prints the results")]
pub struct Config {
    /// Database user. Always converted to upper case
    #[arg(long, env = "ODPIC_SAMPLES_MAIN_USER", default_value = "heejong", value_parser = upper_case)]
    pub user: String,

    /// Password of the database user
    #[arg(long, env = "ODPIC_SAMPLES_MAIN_PASSWORD", default_value = "Welcome1", hide_env_values = true)]
    pub password: String,

    /// TNS alias or connect string of the database
    #[arg(long, env = "ODPIC_SAMPLES_CONNECT_STRING", default_value = "PDB1")]
    pub connect_string: String,

    /// Acquire the connection from a session pool
    #[arg(long, env = "ODPIC_SAMPLES_USE_POOL", value_parser = BoolishValueParser::new())]
    pub pool: bool,

    /// Value for the IN parameter
    #[arg(long, default_value = IN_VALUE)]
    pub in_value: String,

    /// Initial value of the IN/OUT parameter
    #[arg(long, default_value_t = IN_OUT_INITIAL, allow_negative_numbers = true)]
    pub in_out_value: i64,
}

fn upper_case(name: &str) -> Result<String, Infallible> {
    Ok(name.to_uppercase())
}

impl Config {
    pub fn connect_params(&self) -> ConnectParams {
        ConnectParams {
            username: self.user.clone(),
            password: self.password.clone(),
            connect_string: self.connect_string.clone(),
            use_pool: self.pool,
        }
    }

    pub fn call_args(&self) -> CallArgs {
        CallArgs {
            in_value: self.in_value.as_bytes().to_vec(),
            in_out_value: self.in_out_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::{CommandFactory, FromArgMatches};

    /// Parses `args` ignoring the `ODPIC_SAMPLES_*` variables of the environment the tests run in
    fn parse_without_env(args: &[&str]) -> Config {
        let cmd = ["user", "password", "connect_string", "pool"].into_iter()
            .fold(Config::command(), |cmd, id| cmd.mut_arg(id, |arg| arg.env(None::<&'static str>)));
        let matches = cmd.try_get_matches_from(args).expect("settings");
        Config::from_arg_matches(&matches).expect("config")
    }

    #[test]
    fn defaults() {
        let config = parse_without_env(&["callproc"]);
        assert_eq!(config.user, "HEEJONG");
        assert_eq!(config.password, "Welcome1");
        assert_eq!(config.connect_string, "PDB1");
        assert!(!config.pool);
        assert_eq!(config.in_value, "In value for testing");
        assert_eq!(config.in_out_value, 347);

        let args = config.call_args();
        assert_eq!(args.in_value, b"In value for testing");
        assert_eq!(args.in_out_value, 347);
    }

    #[test]
    fn reads_environment_names() {
        let cmd = Config::command();
        let env_of = |id: &str| cmd.get_arguments()
            .find(|arg| arg.get_id() == id)
            .and_then(|arg| arg.get_env())
            .and_then(|name| name.to_str())
            .map(str::to_string);
        assert_eq!(env_of("user").as_deref(), Some("ODPIC_SAMPLES_MAIN_USER"));
        assert_eq!(env_of("password").as_deref(), Some("ODPIC_SAMPLES_MAIN_PASSWORD"));
        assert_eq!(env_of("connect_string").as_deref(), Some("ODPIC_SAMPLES_CONNECT_STRING"));
        assert_eq!(env_of("pool").as_deref(), Some("ODPIC_SAMPLES_USE_POOL"));
        assert_eq!(env_of("in_value"), None);
    }

    #[test]
    fn options_override_defaults() {
        let config = parse_without_env(&[
            "callproc",
            "--user", "scott",
            "--password", "tiger",
            "--connect-string", "localhost/XEPDB1",
            "--pool",
            "--in-value", "",
            "--in-out-value", "-12",
        ]);

        let params = config.connect_params();
        assert_eq!(params, ConnectParams {
            username: "SCOTT".to_string(),
            password: "tiger".to_string(),
            connect_string: "localhost/XEPDB1".to_string(),
            use_pool: true,
        });

        let args = config.call_args();
        assert!(args.in_value.is_empty());
        assert_eq!(args.in_out_value, -12);
    }

    #[test]
    fn rejects_non_numeric_in_out_value() {
        assert!(Config::try_parse_from(["callproc", "--in-out-value", "abc"]).is_err());
    }
}
