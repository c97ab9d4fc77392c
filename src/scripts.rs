//! Documentation about the various scripts contained herein
//!
//! - [check-memory](#check-memory)
//! - [check-swap](#check-swap)
//! - [check-readonlyfs](#check-readonlyfs)
//! - [check-ifmountfs](#check-ifmountfs)
//!
//! # check-memory
//!
//! Linux-only. Reads /proc/meminfo, /proc/stat and /proc/vmstat.
//!
//! ```plain
//! $ check-memory --help
//! check-memory (part of probe-plugins) 0.4.0
//! Check the memory usage of the system
//!
//! Thresholds are ranges over the percent of memory in use, e.g. `-w 80%` alerts once usage is outside of 0-80%. Use
//! `-C` to count buffers and page cache as free memory: the kernel hands those back as soon as programs need them.
//!
//! USAGE:
//!     check-memory [FLAGS] [OPTIONS]
//!
//! FLAGS:
//!     -b, --byte
//!             Show perfdata in bytes
//!
//!     -C, --caches
//!             Count buffers and cached memory as free memory
//!
//!     -g, --gigabyte
//!             Show perfdata in gigabytes
//!
//!     -h, --help
//!             Prints help information
//!
//!     -k, --kilobyte
//!             Show perfdata in kilobytes (default)
//!
//!     -m, --megabyte
//!             Show perfdata in megabytes
//!
//!     -V, --version
//!             Prints version information
//!
//!
//! OPTIONS:
//!     -c, --critical <critical>
//!             Range of percent used that is OK, anything outside is critical
//!
//!     -w, --warning <warning>
//!             Range of percent used that is OK, anything outside warns
//! ```
//!
//! # check-swap
//!
//! Linux-only. Reads /proc/meminfo, /proc/stat and /proc/vmstat.
//!
//! ```plain
//! $ check-swap --help
//! check-swap (part of probe-plugins) 0.4.0
//! Check the swap usage of the system
//!
//! Thresholds are ranges over the percent of swap in use. A system without swap always reports 0% used.
//!
//! USAGE:
//!     check-swap [FLAGS] [OPTIONS]
//!
//! FLAGS:
//!     -b, --byte
//!             Show perfdata in bytes
//!
//!     -g, --gigabyte
//!             Show perfdata in gigabytes
//!
//!     -h, --help
//!             Prints help information
//!
//!     -k, --kilobyte
//!             Show perfdata in kilobytes (default)
//!
//!     -m, --megabyte
//!             Show perfdata in megabytes
//!
//!     -V, --version
//!             Prints version information
//!
//!
//! OPTIONS:
//!     -c, --critical <critical>
//!             Range of percent used that is OK, anything outside is critical
//!
//!     -w, --warning <warning>
//!             Range of percent used that is OK, anything outside warns
//! ```
//!
//! # check-readonlyfs
//!
//! Linux-only. Reads the mount table from /proc/self/mounts.
//!
//! ```plain
//! $ check-readonlyfs --help
//! check-readonlyfs (part of probe-plugins) 0.4.0
//! Check for readonly filesystems
//!
//! With no FILESYSTEM arguments every mounted filesystem that passes the filters is checked, otherwise just the given
//! mount points. Dummy filesystems such as proc and sysfs are left out unless `--all` is given.
//!
//! USAGE:
//!     check-readonlyfs [FLAGS] [OPTIONS] [FILESYSTEM]...
//!
//! FLAGS:
//!     -a, --all
//!             Include dummy file systems
//!
//!     -h, --help
//!             Prints help information
//!
//!     -L, --list
//!             Print the checked file systems instead of a status line
//!
//!     -l, --local
//!             Only check local file systems
//!
//!     -V, --version
//!             Prints version information
//!
//!
//! OPTIONS:
//!     -X, --exclude-type <exclude-types>...
//!             Do not check file systems of this type, may be repeated
//!
//!     -T, --type <types>...
//!             Only check file systems of this type, may be repeated
//!
//!
//! ARGS:
//!     <FILESYSTEM>...
//!             Mount points to check
//!
//! Examples:
//!     check-readonlyfs -l -T ext3 -T ext4
//!     check-readonlyfs -l -X vfat
//! ```
//!
//! # check-ifmountfs
//!
//! Linux-only. Reads the mount table from /proc/self/mounts.
//!
//! ```plain
//! $ check-ifmountfs --help
//! check-ifmountfs (part of probe-plugins) 0.4.0
//! Check whether the given filesystems are mounted
//!
//! USAGE:
//!     check-ifmountfs <FILESYSTEM>...
//!
//! FLAGS:
//!     -h, --help       Prints help information
//!     -V, --version    Prints version information
//!
//! ARGS:
//!     <FILESYSTEM>...    Mount points that must be mounted
//!
//! Example:
//!     check-ifmountfs /mnt/nfs-data /mnt/cdrom
//! ```
