//! Check that filesystems are mounted

use serde::Deserialize;
use structopt::StructOpt;

use probe_plugins::cli;
use probe_plugins::procfs::MountEntry;
use probe_plugins::Status;

/// Check whether the given filesystems are mounted
#[derive(Deserialize, Debug, StructOpt)]
#[structopt(
    name = "check-ifmountfs (part of probe-plugins)",
    setting = structopt::clap::AppSettings::ColoredHelp,
    after_help = "Example:\n    check-ifmountfs /mnt/nfs-data /mnt/cdrom"
)]
struct Args {
    #[structopt(name = "FILESYSTEM", required = true, help = "Mount points that must be mounted")]
    filesystems: Vec<String>,
}

fn do_check(mounts: &[MountEntry], wanted: &[String]) -> (Status, Vec<String>) {
    let missing = wanted
        .iter()
        .filter(|name| !mounts.iter().any(|me| me.mountdir == **name))
        .map(|name| format!("FILESYSTEM CRITICAL: `{}' not mounted", name))
        .collect::<Vec<_>>();
    if missing.is_empty() {
        (Status::Ok, vec!["FILESYSTEMS OK".to_owned()])
    } else {
        (Status::Critical, missing)
    }
}

#[cfg_attr(test, allow(dead_code))]
fn main() {
    cli::init_logging();
    let args: Args = cli::from_args();
    let mounts = MountEntry::load_all().unwrap_or_else(|e| {
        cli::exit_unknown(format!("cannot read table of mounted file systems: {}", e))
    });

    let (status, lines) = do_check(&mounts, &args.filesystems);
    for line in lines {
        println!("{}", line);
    }
    status.exit();
}
