//! Check swap usage

use serde::Deserialize;
use structopt::StructOpt;

use probe_plugins::cli;
use probe_plugins::perfdata::{status_line, Unit};
use probe_plugins::procfs::{MemoryProbe, MemorySnapshot};
use probe_plugins::thresholds::ThresholdSet;
use probe_plugins::Status;

/// Check the swap usage of the system
///
/// Thresholds are ranges over the percent of swap in use. A system without
/// swap always reports 0% used.
#[derive(Deserialize, Debug, StructOpt)]
#[structopt(
    name = "check-swap (part of probe-plugins)",
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

fn do_check(snap: &MemorySnapshot, thresholds: &ThresholdSet, unit: Unit) -> (Status, String) {
    let percent = snap.swap_percent_used();
    let status = thresholds.evaluate(percent);
    let output = format!(
        "{} | {}",
        status_line(status, percent, snap.swap_used),
        snap.swap_perfdata(unit)
    );
    (status, output)
}

#[cfg_attr(test, allow(dead_code))]
fn main() {
    cli::init_logging();
    let args: Args = cli::from_args();
    let thresholds = ThresholdSet::parse(args.warning.as_deref(), args.critical.as_deref())
        .unwrap_or_else(|e| cli::exit_unknown(e));
    let unit = Unit::from_flags(args.byte, args.kilobyte, args.megabyte, args.gigabyte);
    let snap = MemoryProbe::new()
        .capture(false)
        .unwrap_or_else(|e| cli::exit_unknown(e));

    let (status, output) = do_check(&snap, &thresholds, unit);
    println!("{}", output);
    status.exit();
}
