//! Check memory usage
//!
//! Prints how much of the system memory is in use, along with a perfdata
//! line that breaks memory and paging activity down.

use serde::Deserialize;
use structopt::StructOpt;

use probe_plugins::cli;
use probe_plugins::perfdata::{status_line, Unit};
use probe_plugins::procfs::{MemoryProbe, MemorySnapshot};
use probe_plugins::thresholds::ThresholdSet;
use probe_plugins::Status;

/// Check the memory usage of the system
///
/// Thresholds are ranges over the percent of memory in use, e.g. `-w 80%`
/// alerts once usage is outside of 0-80%. Use `-C` to count buffers and page
/// cache as free memory: the kernel hands those back as soon as programs
/// need them.
#[derive(Deserialize, Debug, StructOpt)]
#[structopt(
    name = "check-memory (part of probe-plugins)",
    setting = structopt::clap::AppSettings::ColoredHelp
)]
struct Args {
    #[structopt(short = "b", long = "byte", help = "Show perfdata in bytes")]
    byte: bool,
    #[structopt(short = "k", long = "kilobyte", help = "Show perfdata in kilobytes (default)")]
    kilobyte: bool,
    #[structopt(short = "m", long = "megabyte", help = "Show perfdata in megabytes")]
    megabyte: bool,
    #[structopt(short = "g", long = "gigabyte", help = "Show perfdata in gigabytes")]
    gigabyte: bool,
    #[structopt(
        short = "C",
        long = "caches",
        help = "Count buffers and cached memory as free memory"
    )]
    caches: bool,
    #[structopt(
        short = "w",
        long = "warning",
        help = "Range of percent used that is OK, anything outside warns"
    )]
    warning: Option<String>,
    #[structopt(
        short = "c",
        long = "critical",
        help = "Range of percent used that is OK, anything outside is critical"
    )]
    critical: Option<String>,
}

impl Args {
    fn unit(&self) -> Unit {
        Unit::from_flags(self.byte, self.kilobyte, self.megabyte, self.gigabyte)
    }
}

fn do_check(snap: &MemorySnapshot, thresholds: &ThresholdSet, unit: Unit) -> (Status, String) {
    let percent = snap.mem_percent_used();
    let status = thresholds.evaluate(percent);
    let output = format!(
        "{} | {}",
        status_line(status, percent, snap.mem_used),
        snap.memory_perfdata(unit)
    );
    (status, output)
}

#[cfg_attr(test, allow(dead_code))]
fn main() {
    cli::init_logging();
    let args: Args = cli::from_args();
    let thresholds = ThresholdSet::parse(args.warning.as_deref(), args.critical.as_deref())
        .unwrap_or_else(|e| cli::exit_unknown(e));
    let snap = MemoryProbe::new()
        .capture(args.caches)
        .unwrap_or_else(|e| cli::exit_unknown(e));

    let (status, output) = do_check(&snap, &thresholds, args.unit());
    println!("{}", output);
    status.exit();
}
