//! Regenerate `src/scripts.rs` from the `--help` of every check
//!
//! Build the checks first, then run from the workspace root:
//!
//!     cargo build && cargo run -p make-docs > src/scripts.rs

use std::error::Error;
use std::process::Command;

struct Check {
    name: &'static str,
    about: &'static str,
}

static CHECKS: &[Check] = &[
    Check {
        name: "check-memory",
        about: "Linux-only. Reads /proc/meminfo, /proc/stat and /proc/vmstat.",
    },
    Check {
        name: "check-swap",
        about: "Linux-only. Reads /proc/meminfo, /proc/stat and /proc/vmstat.",
    },
    Check {
        name: "check-readonlyfs",
        about: "Linux-only. Reads the mount table from /proc/self/mounts.",
    },
    Check {
        name: "check-ifmountfs",
        about: "Linux-only. Reads the mount table from /proc/self/mounts.",
    },
];

fn main() -> Result<(), Box<dyn Error>> {
    let preamble = "Documentation about the various scripts contained herein\n";

    let mut out: String = cp(preamble.split('\n'));
    out.push('\n');
    out.push_str(&cp(CHECKS
        .iter()
        .map(|c| format!("- [{0}](#{0})", c.name))));
    out.push('\n');
    for check in CHECKS {
        out.push_str(&format!(
            "\
//!
//! # {0}
//!
//! {1}
//!
//! ```plain
//! $ {0} --help
",
            check.name, check.about
        ));
        let output = Command::new(format!("target/debug/{}", check.name))
            .arg("--help")
            .output()
            .map_err(|e| format!("Couldn't execute {}: {}", check.name, e))?;
        let help = String::from_utf8(output.stdout)
            .map_err(|e| format!("{} --help is not utf8: {}", check.name, e))?;
        out.push_str(&cp(help.trim_end().split('\n')));
        out.push_str("\n//! ```\n");
    }
    print!("{}", out);
    Ok(())
}

/// Comment each line in the iterator
fn cp<S: AsRef<str>, I: Iterator<Item = S>>(s: I) -> String {
    s.map(|s| format!("//! {}", s.as_ref()))
        .map(|s| s.trim_end().to_owned())
        .collect::<Vec<String>>()
        .join("\n")
}
