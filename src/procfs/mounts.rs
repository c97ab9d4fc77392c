//! The table of mounted filesystems

use std::str::Split;

use crate::procfs::{ProcFsError, ProcSource, Result};

/// Filesystem types that never hold user data
static DUMMY_TYPES: &[&str] = &[
    "autofs",
    "proc",
    "cgroup",
    "debugfs",
    "devpts",
    "fusectl",
    "hugetlbfs",
    "mqueue",
    "pstore",
    "rpc_pipefs",
    "securityfs",
    "sysfs",
    "devfs",
    "binfmt_misc",
    "none",
];

/// One line of /proc/self/mounts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    pub devname: String,
    pub mountdir: String,
    pub fstype: String,
    /// The raw, comma separated option string
    pub opts: String,
    /// Pseudo filesystem like `proc` or `sysfs`
    pub dummy: bool,
    /// Network filesystem: NFS style `host:/path` or SMB `//host/share`
    pub remote: bool,
    pub readonly: bool,
}

fn next(parts: &mut Split<char>, what: &str) -> Result<String> {
    match parts.next() {
        Some(part) if !part.is_empty() => Ok(unescape(part)),
        _ => Err(ProcFsError::InsufficientData(format!(
            "Missing {} from mount",
            what
        ))),
    }
}

/// Decode the `\ooo` escapes the kernel uses for whitespace and backslashes
fn unescape(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() {
            let digits = &bytes[i + 1..i + 4];
            if digits.iter().all(|b| (b'0'..=b'7').contains(b)) {
                let value = digits
                    .iter()
                    .fold(0u32, |acc, b| acc * 8 + u32::from(b - b'0'));
                if value <= 0xff {
                    out.push(value as u8);
                    i += 4;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn mount_from_line(line: &str) -> Result<MountEntry> {
    let mut parts = line.split(' ');
    let devname = next(&mut parts, "device")?;
    let mountdir = next(&mut parts, "mount point")?;
    let fstype = next(&mut parts, "type")?;
    let opts = next(&mut parts, "mount options")?;
    Ok(MountEntry::new(devname, mountdir, fstype, opts))
}

impl MountEntry {
    /// Build an entry, working out its flags from the other fields
    pub fn new(devname: String, mountdir: String, fstype: String, opts: String) -> MountEntry {
        let dummy = DUMMY_TYPES.contains(&fstype.as_str());
        let remote = devname.contains(':')
            || (devname.starts_with("//") && (fstype == "smbfs" || fstype == "cifs"));
        let readonly = opts.split(',').any(|opt| opt == "ro");
        MountEntry {
            devname,
            mountdir,
            fstype,
            opts,
            dummy,
            remote,
            readonly,
        }
    }

    /// Parse a whole mount table, in order
    ///
    /// Blank lines are skipped, any other malformed line is an error.
    pub fn parse_str(mounts: &str) -> Result<Vec<MountEntry>> {
        mounts
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(mount_from_line)
            .collect::<Result<Vec<_>>>()
    }

    /// Read the mount table of the current process
    pub fn load_all() -> Result<Vec<MountEntry>> {
        MountEntry::load_from(&mut ProcSource::new("/proc/self/mounts"))
    }

    /// Read a mount table from `source`, which must list at least one mount
    pub fn load_from(source: &mut ProcSource) -> Result<Vec<MountEntry>> {
        let mounts = MountEntry::parse_str(&source.read()?)?;
        if mounts.is_empty() {
            return Err(ProcFsError::InsufficientData(format!(
                "no mounted file systems listed in {}",
                source.path().display()
            )));
        }
        Ok(mounts)
    }
}

/// Which mounts a filesystem check looks at
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountFilter {
    /// Include dummy filesystems
    pub all: bool,
    /// Leave out remote filesystems
    pub local: bool,
    /// If not empty, only these types are checked
    pub select: Vec<String>,
    pub exclude: Vec<String>,
}

impl MountFilter {
    /// The first type that is both selected and excluded, if any
    pub fn conflict(&self) -> Option<&str> {
        self.select
            .iter()
            .find(|t| self.exclude.contains(*t))
            .map(String::as_str)
    }

    pub fn skips(&self, entry: &MountEntry) -> bool {
        let reason = if entry.remote && self.local {
            "remote"
        } else if entry.dummy && !self.all {
            "dummy"
        } else if !self.select.is_empty() && !self.select.contains(&entry.fstype) {
            "type not selected"
        } else if self.exclude.contains(&entry.fstype) {
            "type excluded"
        } else {
            return false;
        };
        log::debug!("skipping {} ({}): {}", entry.mountdir, entry.fstype, reason);
        true
    }
}

#[cfg(test)]
mod unit {
    use std::fs;

    use super::*;

    static MOUNTS: &str = "\
sysfs /sys sysfs rw,nosuid,nodev,noexec,relatime 0 0
proc /proc proc rw,nosuid,nodev,noexec,relatime 0 0
/dev/sda1 / ext4 rw,relatime,errors=remount-ro 0 0
/dev/sdb1 /mnt/backup xfs ro,relatime 0 0
nas:/export/home /home nfs4 rw,relatime,vers=4.2 0 0
//fileserver/share /mnt/share cifs ro,relatime 0 0
/dev/sdc1 /media/My\\040Disk vfat ro 0 0
";

    fn mounts() -> Vec<MountEntry> {
        MountEntry::parse_str(MOUNTS).unwrap()
    }

    fn s(st: &str) -> String {
        st.to_owned()
    }

    #[test]
    fn mount_from_line_works() {
        let mount = mount_from_line("/dev/sdb1 /mnt/backup xfs ro,relatime 0 0").unwrap();
        assert_eq!(
            mount,
            MountEntry {
                devname: s("/dev/sdb1"),
                mountdir: s("/mnt/backup"),
                fstype: s("xfs"),
                opts: s("ro,relatime"),
                dummy: false,
                remote: false,
                readonly: true,
            }
        );
    }

    #[test]
    fn short_lines_are_rejected() {
        assert!(mount_from_line("/dev/sda1 / ext4").is_err());
        assert!(mount_from_line("").is_err());
    }

    #[test]
    fn all_lines_in_order() {
        let dirs = mounts().into_iter().map(|m| m.mountdir).collect::<Vec<_>>();
        assert_eq!(
            dirs,
            vec![
                "/sys",
                "/proc",
                "/",
                "/mnt/backup",
                "/home",
                "/mnt/share",
                "/media/My Disk",
            ]
        );
    }

    #[test]
    fn flags() {
        let m = mounts();
        assert!(m[0].dummy && m[1].dummy);
        assert!(!m[2].dummy && !m[2].remote && !m[2].readonly);
        assert!(m[3].readonly);
        assert!(m[4].remote && !m[4].readonly);
        assert!(m[5].remote && m[5].readonly);
        assert!(m[6].readonly);
    }

    #[test]
    fn ro_must_be_a_whole_option() {
        let m = MountEntry::new(s("/dev/sda1"), s("/"), s("ext4"), s("rw,errors=remount-ro"));
        assert!(!m.readonly);
        let m = MountEntry::new(s("/dev/sda1"), s("/"), s("ext4"), s("rw,root"));
        assert!(!m.readonly);
    }

    #[test]
    fn double_slash_is_only_remote_for_smb() {
        let m = MountEntry::new(s("//weird"), s("/x"), s("ext4"), s("rw"));
        assert!(!m.remote);
        let m = MountEntry::new(s("//srv/a"), s("/x"), s("smbfs"), s("rw"));
        assert!(m.remote);
    }

    #[test]
    fn unescapes_octal() {
        assert_eq!(unescape("a\\040b"), "a b");
        assert_eq!(unescape("tab\\011nl\\012bs\\134"), "tab\tnl\nbs\\");
        assert_eq!(unescape("trailing\\04"), "trailing\\04");
        assert_eq!(unescape("not\\999octal"), "not\\999octal");
    }

    #[test]
    fn default_filter_skips_only_dummies() {
        let filter = MountFilter::default();
        let kept = mounts()
            .into_iter()
            .filter(|m| !filter.skips(m))
            .map(|m| m.mountdir)
            .collect::<Vec<_>>();
        assert_eq!(
            kept,
            vec!["/", "/mnt/backup", "/home", "/mnt/share", "/media/My Disk"]
        );
    }

    #[test]
    fn local_and_all() {
        let filter = MountFilter {
            all: true,
            local: true,
            ..MountFilter::default()
        };
        let kept = mounts()
            .into_iter()
            .filter(|m| !filter.skips(m))
            .map(|m| m.mountdir)
            .collect::<Vec<_>>();
        assert_eq!(
            kept,
            vec!["/sys", "/proc", "/", "/mnt/backup", "/media/My Disk"]
        );
    }

    #[test]
    fn type_selection() {
        let filter = MountFilter {
            select: vec![s("ext4"), s("xfs")],
            exclude: vec![s("xfs")],
            ..MountFilter::default()
        };
        assert_eq!(filter.conflict(), Some("xfs"));

        let filter = MountFilter {
            exclude: vec![s("vfat"), s("cifs")],
            ..MountFilter::default()
        };
        assert_eq!(filter.conflict(), None);
        let kept = mounts()
            .into_iter()
            .filter(|m| !filter.skips(m))
            .map(|m| m.fstype)
            .collect::<Vec<_>>();
        assert_eq!(kept, vec!["ext4", "xfs", "nfs4"]);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mounts");
        fs::write(&path, MOUNTS).unwrap();
        let loaded = MountEntry::load_from(&mut ProcSource::new(&path)).unwrap();
        assert_eq!(loaded, mounts());

        fs::write(&path, "\n").unwrap();
        assert!(MountEntry::load_from(&mut ProcSource::new(&path)).is_err());
    }

    #[test]
    fn can_load_live_mounts() {
        if std::path::Path::new("/proc/self/mounts").exists() {
            MountEntry::load_all().unwrap();
        }
    }
}
