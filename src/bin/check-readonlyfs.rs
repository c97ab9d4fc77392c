//! Check for filesystems that are mounted read-only

use std::fs::{self, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;

use serde::Deserialize;
use structopt::StructOpt;

use probe_plugins::cli;
use probe_plugins::procfs::{MountEntry, MountFilter};
use probe_plugins::Status;

/// Check for readonly filesystems
///
/// With no FILESYSTEM arguments every mounted filesystem that passes the
/// filters is checked, otherwise just the given mount points. Dummy
/// filesystems such as proc and sysfs are left out unless `--all` is given.
#[derive(Deserialize, Debug, StructOpt)]
#[structopt(
    name = "check-readonlyfs (part of probe-plugins)",
    setting = structopt::clap::AppSettings::ColoredHelp,
    after_help = "Examples:\n    check-readonlyfs -l -T ext3 -T ext4\n    check-readonlyfs -l -X vfat"
)]
struct Args {
    #[structopt(short = "a", long = "all", help = "Include dummy file systems")]
    all: bool,
    #[structopt(short = "l", long = "local", help = "Only check local file systems")]
    local: bool,
    #[structopt(
        short = "L",
        long = "list",
        help = "Print the checked file systems instead of a status line"
    )]
    list: bool,
    #[structopt(
        short = "T",
        long = "type",
        number_of_values = 1,
        help = "Only check file systems of this type, may be repeated"
    )]
    types: Vec<String>,
    #[structopt(
        short = "X",
        long = "exclude-type",
        number_of_values = 1,
        help = "Do not check file systems of this type, may be repeated"
    )]
    exclude_types: Vec<String>,
    #[structopt(name = "FILESYSTEM", help = "Mount points to check")]
    filesystems: Vec<String>,
}

impl Args {
    fn filter(&self) -> MountFilter {
        MountFilter {
            all: self.all,
            local: self.local,
            select: self.types.clone(),
            exclude: self.exclude_types.clone(),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Report {
    status: Status,
    lines: Vec<String>,
}

fn list_row(me: &MountEntry) -> String {
    format!(
        "{:<10} {} type {} ({}) {}",
        me.devname,
        me.mountdir,
        me.fstype,
        me.opts,
        if me.readonly { "<< read-only" } else { "" }
    )
}

fn summary(readonly: &[&str]) -> String {
    if readonly.is_empty() {
        "FILESYSTEMS OK".to_owned()
    } else {
        format!("FILESYSTEMS CRITICAL: {} readonly!", readonly.join(","))
    }
}

fn check_all(mounts: &[MountEntry], filter: &MountFilter, list: bool) -> Report {
    let mut lines = Vec::new();
    let mut readonly = Vec::new();
    for me in mounts.iter().filter(|me| !filter.skips(me)) {
        if list {
            lines.push(list_row(me));
        }
        if me.readonly {
            readonly.push(me.mountdir.as_str());
        }
    }
    finish(lines, &readonly, list)
}

/// Is the mount at `name` read-only?
///
/// A skipped mount point counts as fine. If several filesystems are mounted
/// on the same directory, any of them being read-only is enough.
fn check_entry(
    mounts: &[MountEntry],
    filter: &MountFilter,
    name: &str,
    lines: &mut Vec<String>,
    list: bool,
) -> bool {
    for me in mounts.iter().filter(|me| me.mountdir == name) {
        if filter.skips(me) {
            return false;
        }
        if list {
            lines.push(list_row(me));
        }
        if me.readonly {
            return true;
        }
    }
    false
}

fn check_named(
    mounts: &[MountEntry],
    filter: &MountFilter,
    names: &[String],
    list: bool,
) -> Report {
    let mut lines = Vec::new();
    let readonly = names
        .iter()
        .filter(|name| check_entry(mounts, filter, name, &mut lines, list))
        .map(String::as_str)
        .collect::<Vec<_>>();
    finish(lines, &readonly, list)
}

fn finish(mut lines: Vec<String>, readonly: &[&str], list: bool) -> Report {
    if !list {
        lines.push(summary(readonly));
    }
    Report {
        status: if readonly.is_empty() {
            Status::Ok
        } else {
            Status::Critical
        },
        lines,
    }
}

/// Touch `path` so that an automounter mounts it before we read the table
///
/// Opening is preferred, a plain stat covers paths we may not read.
fn trigger_automount(path: &str) -> io::Result<()> {
    let opened = OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_NOCTTY)
        .open(path)
        .and_then(|f| f.metadata());
    if let Err(e) = opened {
        log::debug!("unable to open {}, trying stat: {}", path, e);
        fs::metadata(path)?;
    }
    Ok(())
}

#[cfg_attr(test, allow(dead_code))]
fn main() {
    cli::init_logging();
    let args: Args = cli::from_args();
    let filter = args.filter();
    if let Some(fstype) = filter.conflict() {
        cli::exit_unknown(format!(
            "file system type `{}' both selected and excluded",
            fstype
        ));
    }

    for fs in &args.filesystems {
        if trigger_automount(fs).is_err() {
            cli::exit_unknown(format!("cannot open `{}'", fs));
        }
    }

    let mounts = MountEntry::load_all().unwrap_or_else(|e| {
        cli::exit_unknown(format!("cannot read table of mounted file systems: {}", e))
    });

    let report = if args.filesystems.is_empty() {
        check_all(&mounts, &filter, args.list)
    } else {
        check_named(&mounts, &filter, &args.filesystems, args.list)
    };
    for line in &report.lines {
        println!("{}", line);
    }
    report.status.exit();
}
