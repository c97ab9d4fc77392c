//! Plumbing shared by every check binary

use std::ffi::OsString;
use std::fmt::Display;

use structopt::clap::{self, ErrorKind};
use structopt::StructOpt;

use crate::Status;

/// Send `log` output to stderr, filtered by `RUST_LOG`
///
/// Stdout belongs to the monitoring system, so nothing is logged unless
/// asked for.
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("off");
    let _ = env_logger::Builder::from_env(env)
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .try_init();
}

/// Parse the command line into `T`
///
/// `--help` and `--version` exit with OK. A bad command line is a usage
/// error and exits UNKNOWN, not with clap's own exit code, which monitoring
/// systems would read as WARNING.
pub fn from_args<T: StructOpt>() -> T {
    match from_iter(std::env::args_os()) {
        Ok(args) => args,
        Err(e) => {
            if e.use_stderr() {
                eprintln!("{}", e.message);
            } else {
                println!("{}", e.message);
            }
            parse_error_status(&e).exit()
        }
    }
}

pub fn from_iter<T, I>(iter: I) -> Result<T, clap::Error>
where
    T: StructOpt,
    I: IntoIterator,
    I::Item: Into<OsString> + Clone,
{
    T::from_iter_safe(iter)
}

fn parse_error_status(e: &clap::Error) -> Status {
    match e.kind {
        ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed => Status::Ok,
        _ => Status::Unknown,
    }
}

/// Print an `UNKNOWN:` line and exit
pub fn exit_unknown<D: Display>(msg: D) -> ! {
    println!("{}: {}", Status::Unknown, msg);
    Status::Unknown.exit()
}

#[cfg(test)]
mod unit {
    use structopt::StructOpt;

    use super::*;

    #[derive(Debug, StructOpt)]
    #[structopt(name = "check-test")]
    struct Args {
        #[structopt(short = "w", long = "warning")]
        warning: Option<String>,
    }

    #[test]
    fn parses_good_args() {
        let args: Args = from_iter(&["check-test", "-w", "80"]).unwrap();
        assert_eq!(args.warning.as_ref().map(String::as_str), Some("80"));
    }

    #[test]
    fn help_is_ok() {
        let e = from_iter::<Args, _>(&["check-test", "--help"]).unwrap_err();
        assert_eq!(parse_error_status(&e), Status::Ok);
    }

    #[test]
    fn bad_args_are_unknown() {
        let e = from_iter::<Args, _>(&["check-test", "--bogus"]).unwrap_err();
        assert_eq!(parse_error_status(&e), Status::Unknown);
        let e = from_iter::<Args, _>(&["check-test", "-w"]).unwrap_err();
        assert_eq!(parse_error_status(&e), Status::Unknown);
    }

    #[test]
    fn logging_can_be_initialized_twice() {
        init_logging();
        init_logging();
    }
}
