use std::{env, io, process::ExitCode};

use clap::Parser;
use log::LevelFilter;
use callproc::{config::Config, Environment, Status};

fn init_logs() {
    let mut logger = env_logger::builder();
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    logger.init();
}

fn main() -> ExitCode {
    init_logs();

    let config = Config::parse();
    let mut out = io::stdout().lock();
    let mut err = io::stderr().lock();

    let status = match Environment::new() {
        Ok(oracle) => callproc::run(&oracle, &config.connect_params(), &config.call_args(), &mut out, &mut err),
        Err(cause) => callproc::report_fatal(&cause, &mut err),
    };
    match status {
        Ok(status) => status.into(),
        Err(io_err) => {
            log::warn!("cannot write the report: {io_err}");
            Status::Failed.into()
        }
    }
}
