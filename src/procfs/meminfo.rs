//! Memory and swap usage, from /proc/meminfo, /proc/stat and /proc/vmstat

use lazy_static::lazy_static;

use crate::perfdata::{Perfdata, Unit};
use crate::procfs::table::{parse_leading_u64, to_counter, Counter, FieldTable, Separator, Slot};
use crate::procfs::{ProcSource, Result};

/// Room for any meminfo row name we care about
const MEMINFO_NAME_BUF: usize = 16;
/// vmstat has grown per-zone names like `pgscan_kswapd_normal`
const VMSTAT_NAME_BUF: usize = 32;

/// Build a field table for `$ty`, one accessor fn per `"Name" => field` pair
macro_rules! fields {
    ($ty:ty { $($name:expr => $field:ident,)* }) => {
        vec![$(
            ($name, {
                fn slot(v: &mut $ty) -> &mut Counter {
                    &mut v.$field
                }
                slot as Slot<$ty>
            }),
        )*]
    };
}

lazy_static! {
    static ref MEMINFO_FIELDS: FieldTable<MemInfo> = FieldTable::new(
        Separator::Colon,
        MEMINFO_NAME_BUF,
        fields!(MemInfo {
            "Active" => active,
            "AnonPages" => anon_pages,
            "Bounce" => bounce,
            "Buffers" => buffers,
            "Cached" => cached,
            "CommitLimit" => commit_limit,
            "Committed_AS" => committed_as,
            "Dirty" => dirty,
            "HighFree" => high_free,
            "HighTotal" => high_total,
            "Inact_clean" => inact_clean,
            "Inact_dirty" => inact_dirty,
            "Inact_laundry" => inact_laundry,
            "Inact_target" => inact_target,
            "Inactive" => inactive,
            "LowFree" => low_free,
            "LowTotal" => low_total,
            "Mapped" => mapped,
            "MemFree" => mem_free,
            "MemShared" => mem_shared,
            "MemTotal" => mem_total,
            "NFS_Unstable" => nfs_unstable,
            "PageTables" => page_tables,
            "ReverseMaps" => reverse_maps,
            "SReclaimable" => slab_reclaimable,
            "SUnreclaim" => slab_unreclaimable,
            "Slab" => slab,
            "SwapCached" => swap_cached,
            "SwapFree" => swap_free,
            "SwapTotal" => swap_total,
            "VmallocChunk" => vmalloc_chunk,
            "VmallocTotal" => vmalloc_total,
            "VmallocUsed" => vmalloc_used,
            "Writeback" => writeback,
        })
    );
    static ref VMSTAT_FIELDS: FieldTable<VmStat> = FieldTable::new(
        Separator::Whitespace,
        VMSTAT_NAME_BUF,
        fields!(VmStat {
            "allocstall" => allocstall,
            "kswapd_inodesteal" => kswapd_inodesteal,
            "kswapd_steal" => kswapd_steal,
            "nr_dirty" => nr_dirty,
            "nr_mapped" => nr_mapped,
            "nr_page_table_pages" => nr_page_table_pages,
            "nr_pagecache" => nr_pagecache,
            "nr_reverse_maps" => nr_reverse_maps,
            "nr_slab" => nr_slab,
            "nr_unstable" => nr_unstable,
            "nr_writeback" => nr_writeback,
            "pageoutrun" => pageoutrun,
            "pgactivate" => pgactivate,
            "pgalloc" => pgalloc,
            "pgalloc_dma" => pgalloc_dma,
            "pgalloc_high" => pgalloc_high,
            "pgalloc_normal" => pgalloc_normal,
            "pgdeactivate" => pgdeactivate,
            "pgfault" => pgfault,
            "pgfree" => pgfree,
            "pginodesteal" => pginodesteal,
            "pgmajfault" => pgmajfault,
            "pgpgin" => pgpgin,
            "pgpgout" => pgpgout,
            "pgrefill" => pgrefill,
            "pgrefill_dma" => pgrefill_dma,
            "pgrefill_high" => pgrefill_high,
            "pgrefill_normal" => pgrefill_normal,
            "pgrotated" => pgrotated,
            "pgscan" => pgscan,
            "pgscan_direct_dma" => pgscan_direct_dma,
            "pgscan_direct_high" => pgscan_direct_high,
            "pgscan_direct_normal" => pgscan_direct_normal,
            "pgscan_kswapd_dma" => pgscan_kswapd_dma,
            "pgscan_kswapd_high" => pgscan_kswapd_high,
            "pgscan_kswapd_normal" => pgscan_kswapd_normal,
            "pgsteal" => pgsteal,
            "pgsteal_dma" => pgsteal_dma,
            "pgsteal_high" => pgsteal_high,
            "pgsteal_normal" => pgsteal_normal,
            "pswpin" => pswpin,
            "pswpout" => pswpout,
            "slabs_scanned" => slabs_scanned,
        })
    );
}

// ////////////////////////////////////////////////////////////////////////////
// /proc/meminfo

/// Everything we read out of /proc/meminfo
///
/// All values are in kB, except `reverse_maps` which is a count. Fields the
/// running kernel doesn't report stay at 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemInfo {
    pub mem_total: Counter,
    pub mem_free: Counter,
    /// Always 0 on anything newer than 2.4
    pub mem_shared: Counter,
    pub buffers: Counter,
    pub cached: Counter,
    pub swap_total: Counter,
    pub swap_free: Counter,
    pub swap_cached: Counter,
    pub high_total: Counter,
    pub high_free: Counter,
    /// Equal to the totals on machines without a high memory zone
    pub low_total: Counter,
    pub low_free: Counter,
    pub active: Counter,
    /// Reported directly since 2.5.41, otherwise the sum of the `inact_*`
    /// buckets
    pub inactive: Counter,
    pub inact_dirty: Counter,
    pub inact_clean: Counter,
    pub inact_laundry: Counter,
    pub inact_target: Counter,
    pub dirty: Counter,
    pub writeback: Counter,
    pub mapped: Counter,
    pub slab: Counter,
    pub slab_reclaimable: Counter,
    pub slab_unreclaimable: Counter,
    pub page_tables: Counter,
    pub reverse_maps: Counter,
    pub committed_as: Counter,
    pub commit_limit: Counter,
    pub anon_pages: Counter,
    pub bounce: Counter,
    pub nfs_unstable: Counter,
    pub vmalloc_total: Counter,
    pub vmalloc_used: Counter,
    pub vmalloc_chunk: Counter,
}

impl MemInfo {
    /// Convert the contents of a string like /proc/meminfo into a `MemInfo`
    ///
    /// Fields that older kernels spell differently are filled in afterwards.
    pub fn parse(contents: &str) -> MemInfo {
        let mut info = MemInfo {
            inactive: Counter::MAX,
            ..MemInfo::default()
        };
        MEMINFO_FIELDS.scan(contents, &mut info);

        if info.low_total == 0 {
            info.low_total = info.mem_total;
            info.low_free = info.mem_free;
        }
        if info.inactive == Counter::MAX {
            info.inactive = info
                .inact_dirty
                .wrapping_add(info.inact_clean)
                .wrapping_add(info.inact_laundry);
        }
        info
    }
}

// ////////////////////////////////////////////////////////////////////////////
// /proc/vmstat

/// Virtual memory statistics from /proc/vmstat
///
/// Counters are pages or events since boot. `pgpgin`/`pgpgout` are in kB.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VmStat {
    pub nr_dirty: Counter,
    pub nr_writeback: Counter,
    /// Gone in 2.5.66
    pub nr_pagecache: Counter,
    pub nr_page_table_pages: Counter,
    pub nr_reverse_maps: Counter,
    pub nr_mapped: Counter,
    pub nr_slab: Counter,
    pub nr_unstable: Counter,
    pub pgpgin: Counter,
    pub pgpgout: Counter,
    pub pswpin: Counter,
    pub pswpout: Counter,
    /// Split into `pgalloc_{dma,high,normal}` by 2.6.8
    pub pgalloc: Counter,
    pub pgalloc_dma: Counter,
    pub pgalloc_high: Counter,
    pub pgalloc_normal: Counter,
    pub pgfree: Counter,
    pub pgactivate: Counter,
    pub pgdeactivate: Counter,
    pub pgfault: Counter,
    pub pgmajfault: Counter,
    pub pgscan: Counter,
    pub pgscan_direct_dma: Counter,
    pub pgscan_direct_high: Counter,
    pub pgscan_direct_normal: Counter,
    pub pgscan_kswapd_dma: Counter,
    pub pgscan_kswapd_high: Counter,
    pub pgscan_kswapd_normal: Counter,
    pub pgrefill: Counter,
    pub pgrefill_dma: Counter,
    pub pgrefill_high: Counter,
    pub pgrefill_normal: Counter,
    pub pgsteal: Counter,
    pub pgsteal_dma: Counter,
    pub pgsteal_high: Counter,
    pub pgsteal_normal: Counter,
    pub kswapd_steal: Counter,
    pub kswapd_inodesteal: Counter,
    pub pginodesteal: Counter,
    pub slabs_scanned: Counter,
    pub pageoutrun: Counter,
    pub allocstall: Counter,
    pub pgrotated: Counter,
}

fn sum(counters: &[Counter]) -> Counter {
    counters.iter().fold(0, |acc, c| acc.wrapping_add(*c))
}

impl VmStat {
    /// Convert the contents of a string like /proc/vmstat into a `VmStat`
    ///
    /// The legacy aggregate counters are rebuilt from their per-zone
    /// replacements when the kernel doesn't report them. A legacy counter
    /// that really is 0 looks exactly like a missing one, and gets the sum
    /// too.
    pub fn parse(contents: &str) -> VmStat {
        let mut vm = VmStat::default();
        VMSTAT_FIELDS.scan(contents, &mut vm);

        if vm.pgalloc == 0 {
            vm.pgalloc = sum(&[vm.pgalloc_dma, vm.pgalloc_high, vm.pgalloc_normal]);
        }
        if vm.pgrefill == 0 {
            vm.pgrefill = sum(&[vm.pgrefill_dma, vm.pgrefill_high, vm.pgrefill_normal]);
        }
        if vm.pgscan == 0 {
            vm.pgscan = sum(&[
                vm.pgscan_direct_dma,
                vm.pgscan_direct_high,
                vm.pgscan_direct_normal,
                vm.pgscan_kswapd_dma,
                vm.pgscan_kswapd_high,
                vm.pgscan_kswapd_normal,
            ]);
        }
        if vm.pgsteal == 0 {
            vm.pgsteal = sum(&[vm.pgsteal_dma, vm.pgsteal_high, vm.pgsteal_normal]);
        }
        vm
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Paging activity

/// Page and swap traffic since boot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PagingCounters {
    pub mem_pageins: Counter,
    pub mem_pageouts: Counter,
    pub swap_pageins: Counter,
    pub swap_pageouts: Counter,
}

impl PagingCounters {
    /// Read the `page` and `swap` lines of a /proc/stat-style summary
    ///
    /// Returns `None` unless both lines are present. Kernels from 2.5.40 on
    /// moved these counters to /proc/vmstat.
    pub fn from_stat(contents: &str) -> Option<PagingCounters> {
        let (mem_pageins, mem_pageouts) = counter_pair(contents, "page ")?;
        let (swap_pageins, swap_pageouts) = counter_pair(contents, "swap ")?;
        Some(PagingCounters {
            mem_pageins,
            mem_pageouts,
            swap_pageins,
            swap_pageouts,
        })
    }

    pub fn from_vmstat(vm: &VmStat) -> PagingCounters {
        PagingCounters {
            mem_pageins: vm.pgpgin,
            mem_pageouts: vm.pgpgout,
            swap_pageins: vm.pswpin,
            swap_pageouts: vm.pswpout,
        }
    }
}

/// The two numbers following the first occurrence of `prefix`
fn counter_pair(contents: &str, prefix: &str) -> Option<(Counter, Counter)> {
    let start = contents.find(prefix)? + prefix.len();
    let mut words = contents[start..].split_ascii_whitespace();
    let mut next = || {
        words
            .next()
            .map_or(0, |w| to_counter(parse_leading_u64(w.as_bytes())))
    };
    Some((next(), next()))
}

// ////////////////////////////////////////////////////////////////////////////
// Snapshot

/// Memory and swap usage at one point in time, in kB
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySnapshot {
    pub mem_total: Counter,
    pub mem_used: Counter,
    pub mem_free: Counter,
    pub mem_shared: Counter,
    pub mem_buffers: Counter,
    pub mem_cached: Counter,
    pub swap_total: Counter,
    pub swap_used: Counter,
    pub swap_free: Counter,
    pub swap_cached: Counter,
    pub paging: PagingCounters,
    /// The raw meminfo data the snapshot was built from
    pub meminfo: MemInfo,
    /// Only present if /proc/stat lacked paging counters
    pub vmstat: Option<VmStat>,
}

impl MemorySnapshot {
    /// Build a snapshot from the text of the three sources
    ///
    /// `load_vmstat` is only called when `stat` is missing its `page` or
    /// `swap` line. The two sources are never mixed: when vmstat is used it
    /// provides all four paging counters.
    ///
    /// With `cache_is_free`, buffers and page cache are counted as free
    /// rather than used memory.
    pub fn assemble<F>(
        meminfo: &str,
        stat: &str,
        cache_is_free: bool,
        load_vmstat: F,
    ) -> Result<MemorySnapshot>
    where
        F: FnOnce() -> Result<String>,
    {
        let info = MemInfo::parse(meminfo);

        let mut mem_used = info.mem_total.wrapping_sub(info.mem_free);
        let mut mem_free = info.mem_free;
        if cache_is_free {
            let reclaimable = info.cached.wrapping_add(info.buffers);
            mem_used = mem_used.wrapping_sub(reclaimable);
            mem_free = mem_free.wrapping_add(reclaimable);
        }

        let (paging, vmstat) = match PagingCounters::from_stat(stat) {
            Some(paging) => (paging, None),
            None => {
                log::debug!("no page/swap lines in the activity summary, reading vmstat");
                let vm = VmStat::parse(&load_vmstat()?);
                (PagingCounters::from_vmstat(&vm), Some(vm))
            }
        };

        Ok(MemorySnapshot {
            mem_total: info.mem_total,
            mem_used,
            mem_free,
            mem_shared: info.mem_shared,
            mem_buffers: info.buffers,
            mem_cached: info.cached,
            swap_total: info.swap_total,
            swap_used: info.swap_total.wrapping_sub(info.swap_free),
            swap_free: info.swap_free,
            swap_cached: info.swap_cached,
            paging,
            meminfo: info,
            vmstat,
        })
    }

    /// Percent of memory in use, 0 if the total is unknown
    pub fn mem_percent_used(&self) -> f64 {
        percent(self.mem_used, self.mem_total)
    }

    /// Percent of swap in use, 0 without swap
    pub fn swap_percent_used(&self) -> f64 {
        percent(self.swap_used, self.swap_total)
    }

    pub fn memory_perfdata(&self, unit: Unit) -> Perfdata {
        Perfdata::new(unit)
            .kb("mem_total", self.mem_total)
            .kb("mem_used", self.mem_used)
            .kb("mem_free", self.mem_free)
            .kb("mem_shared", self.mem_shared)
            .kb("mem_buffers", self.mem_buffers)
            .kb("mem_cached", self.mem_cached)
            .kb("mem_pageins", self.paging.mem_pageins)
            .kb("mem_pageouts", self.paging.mem_pageouts)
    }

    pub fn swap_perfdata(&self, unit: Unit) -> Perfdata {
        Perfdata::new(unit)
            .kb("swap_total", self.swap_total)
            .kb("swap_used", self.swap_used)
            .kb("swap_free", self.swap_free)
            .kb("swap_cached", self.swap_cached)
            .kb("swap_pageins", self.paging.swap_pageins)
            .kb("swap_pageouts", self.paging.swap_pageouts)
    }
}

fn percent(used: Counter, total: Counter) -> f64 {
    if total == 0 {
        0.0
    } else {
        used as f64 * 100.0 / total as f64
    }
}

/// Owns the proc sources a memory check reads
///
/// Each probe keeps its own file handles, so independent probes can be used
/// from different threads. Handles are opened on first use and closed when
/// the probe is dropped.
#[derive(Debug)]
pub struct MemoryProbe {
    meminfo: ProcSource,
    stat: ProcSource,
    vmstat: ProcSource,
}

impl Default for MemoryProbe {
    fn default() -> MemoryProbe {
        MemoryProbe::new()
    }
}

impl MemoryProbe {
    pub fn new() -> MemoryProbe {
        MemoryProbe::with_paths("/proc/meminfo", "/proc/stat", "/proc/vmstat")
    }

    pub fn with_paths<P, Q, R>(meminfo: P, stat: Q, vmstat: R) -> MemoryProbe
    where
        P: Into<std::path::PathBuf>,
        Q: Into<std::path::PathBuf>,
        R: Into<std::path::PathBuf>,
    {
        MemoryProbe {
            meminfo: ProcSource::new(meminfo),
            stat: ProcSource::new(stat),
            vmstat: ProcSource::new(vmstat),
        }
    }

    /// Read current values from all sources
    pub fn capture(&mut self, cache_is_free: bool) -> Result<MemorySnapshot> {
        let meminfo = self.meminfo.read()?;
        let stat = self.stat.read()?;
        let vmstat = &mut self.vmstat;
        MemorySnapshot::assemble(&meminfo, &stat, cache_is_free, || vmstat.read())
    }
}
